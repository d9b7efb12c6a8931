//! REST API over the forecasting core.
//!
//! Provides three GET endpoints:
//! - `/forecast/next-day`: overall and per-district next-day forecast
//! - `/forecast/history`: historical records for charting, optionally one district
//! - `/forecast/details`: every district's record for one date

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::config::ForecastConfig;
use crate::data::HistorySource;

pub use types::{ApiError, ErrorResponse};

/// Application state shared across all request handlers.
///
/// Holds no data snapshot: every request reads a fresh one from `source`
/// so appended or regenerated history is always visible.
pub struct AppState {
    /// Materials, model, and server settings.
    pub config: ForecastConfig,
    /// Where snapshots come from.
    pub source: Box<dyn HistorySource>,
}

impl AppState {
    /// State reading the CSV file named in `config`.
    pub fn from_config(config: ForecastConfig) -> Self {
        let source = Box::new(config.source());
        Self { config, source }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forecast/next-day", get(handlers::get_next_day))
        .route("/forecast/history", get(handlers::get_history))
        .route("/forecast/details", get(handlers::get_details))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
