//! City-wide aggregation of district forecasts.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

use crate::composition::MaterialBreakdown;
use crate::data::{Quantity, Snapshot};
use crate::district::{ForecastResult, forecast_district};
use crate::error::{AggregationError, DistrictForecastError, FitError};
use crate::fanout::{self, TaskOutcome};
use crate::forecast::Forecaster;

/// A district's forecast tagged with its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictForecast {
    pub district: String,
    #[serde(flatten)]
    pub forecast: ForecastResult,
}

/// Next-day forecast for the whole city.
///
/// `composition_percent` is recomputed from the summed tonnes rather than
/// averaged from the districts' percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallForecast {
    /// Exact sum of the district totals.
    pub total_waste_tonnes: f64,
    pub composition_tonnes: MaterialBreakdown,
    /// Shares of the summed `composition_tonnes`, NOT of
    /// `total_waste_tonnes`. Totals are forecast independently of the
    /// materials, so dividing by the total would not sum to 100.
    pub composition_percent: MaterialBreakdown,
    /// Per-district results in district-listing order.
    pub districts: Vec<DistrictForecast>,
}

impl OverallForecast {
    /// Combines already computed district forecasts.
    pub fn from_districts(materials: &[String], districts: Vec<DistrictForecast>) -> Self {
        let mut total_waste_tonnes = 0.0;
        let mut composition_tonnes = MaterialBreakdown::zeros(materials);
        for d in &districts {
            total_waste_tonnes += d.forecast.total_waste_tonnes;
            composition_tonnes.accumulate(&d.forecast.composition_tonnes);
        }
        let composition_percent = composition_tonnes.percentages();

        Self {
            total_waste_tonnes,
            composition_tonnes,
            composition_percent,
            districts,
        }
    }
}

impl fmt::Display for OverallForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Next-day Waste Forecast ---")?;
        writeln!(f, "Total waste:           {:.2} t", self.total_waste_tonnes)?;
        for (m, tonnes) in self.composition_tonnes.iter() {
            let pct = self.composition_percent.get(m).unwrap_or(0.0);
            writeln!(f, "  {m:<20} {tonnes:>8.2} t  {pct:>5.1}%")?;
        }
        for d in &self.districts {
            writeln!(f)?;
            writeln!(f, "[{}] {}", d.district, d.forecast.date)?;
            write!(f, "{}", d.forecast)?;
        }
        Ok(())
    }
}

/// Forecasts every district in the snapshot and aggregates the results.
///
/// Districts are fit concurrently; any district failure aborts the whole
/// forecast.
///
/// # Errors
///
/// Returns an `AggregationError` wrapping the first failing district in
/// listing order.
pub fn forecast_city(
    snapshot: &Snapshot,
    forecaster: &dyn Forecaster,
) -> Result<OverallForecast, AggregationError> {
    let districts = snapshot.list_districts();
    info!(districts = districts.len(), "forecasting city");

    let outcomes = fanout::run_all(&districts, |d| forecast_district(snapshot, d, forecaster));

    let mut results = Vec::with_capacity(districts.len());
    for (district, outcome) in districts.iter().zip(outcomes) {
        let err = match outcome {
            TaskOutcome::Done(forecast) => {
                results.push(DistrictForecast {
                    district: district.clone(),
                    forecast,
                });
                continue;
            }
            TaskOutcome::Skipped => continue,
            TaskOutcome::Failed(e) => e,
            TaskOutcome::Panicked(msg) => district_panicked(district, &msg),
        };
        error!(error = %err, "city forecast aborted");
        return Err(AggregationError(err));
    }

    Ok(OverallForecast::from_districts(snapshot.materials(), results))
}

/// Error for a district whose task panicked outside every series fit.
///
/// Panics inside a fit are already reported against their own quantity by
/// [`forecast_district`], so this one is charged to the district's first
/// quantity (the total) and says so in the message.
fn district_panicked(district: &str, msg: &str) -> DistrictForecastError {
    DistrictForecastError {
        district: district.to_string(),
        quantity: Quantity::Total,
        source: FitError::Degenerate(format!(
            "district task panicked outside any series fit: {msg}"
        )),
    }
}
