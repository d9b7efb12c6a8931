//! API query, error, and response types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{AggregationError, DataError};

/// Optional district filter for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// District name; absent or unknown returns every district.
    pub district: Option<String>,
}

/// Date selector for the details endpoint.
#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    /// Date as `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// A failed request: status code plus message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        error!(error = %err, "historical data unavailable");
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: err.to_string(),
        }
    }
}

impl From<AggregationError> for ApiError {
    fn from(err: AggregationError) -> Self {
        error!(error = %err, "forecast failed");
        Self::internal(err.to_string())
    }
}
