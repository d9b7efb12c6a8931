//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use tracing::info;

use super::AppState;
use super::types::{ApiError, DetailsQuery, HistoryQuery};
use crate::city::{OverallForecast, forecast_city};
use crate::data::source::parse_date;
use crate::data::{DateBreakdown, HistoricalRecord, Snapshot};

/// Message returned when a date has no rows.
pub const NO_DATA_FOR_DATE: &str = "No data for this date";

/// Reads a fresh snapshot off the async runtime.
async fn load_snapshot(state: &Arc<AppState>) -> Result<Snapshot, ApiError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || state.source.load_snapshot())
        .await
        .map_err(|e| ApiError::internal(format!("snapshot task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Forecasts tomorrow for every district and the city as a whole.
///
/// `GET /forecast/next-day` → 200 + `OverallForecast` JSON
/// → 503 when the history cannot be read, 500 when a district fit fails
pub async fn get_next_day(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverallForecast>, ApiError> {
    info!("next-day forecast requested");
    let snapshot = load_snapshot(&state).await?;
    let forecaster = state.config.forecaster();

    let forecast = tokio::task::spawn_blocking(move || forecast_city(&snapshot, forecaster.as_ref()))
        .await
        .map_err(|e| ApiError::internal(format!("forecast task failed: {e}")))??;

    Ok(Json(forecast))
}

/// Returns historical records for charting.
///
/// `GET /forecast/history` → every record
/// `GET /forecast/history?district=NAME` → that district, chronological;
/// an unknown district returns every record
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoricalRecord>>, ApiError> {
    let snapshot = load_snapshot(&state).await?;
    let records = snapshot
        .history(query.district.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(records))
}

/// Returns every district's record for one date.
///
/// `GET /forecast/details?date=YYYY-MM-DD` → 200 + records
/// → 404 `{"error": "No data for this date"}` when nothing matches
/// → 400 when `date` is missing or unparseable
pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<Vec<HistoricalRecord>>, ApiError> {
    let raw = query
        .date
        .ok_or_else(|| ApiError::bad_request("missing query parameter `date`"))?;
    let date = parse_date(&raw).ok_or_else(|| {
        ApiError::bad_request(format!("`date` must be YYYY-MM-DD, got \"{raw}\""))
    })?;

    let snapshot = load_snapshot(&state).await?;
    match snapshot.breakdown_for_date(date) {
        DateBreakdown::Found(rows) => Ok(Json(rows.into_iter().cloned().collect())),
        DateBreakdown::NoDataForDate => Err(ApiError::not_found(NO_DATA_FOR_DATE)),
    }
}
