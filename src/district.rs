//! Per-district forecast: total tonnage plus material composition.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::composition::MaterialBreakdown;
use crate::data::{Quantity, Snapshot};
use crate::error::{DistrictForecastError, FitError};
use crate::fanout::{self, TaskOutcome};
use crate::forecast::{Forecaster, SeriesForecast};

/// Next-day forecast for one district.
///
/// `total_waste_tonnes` is forecast independently of the materials, so it
/// generally differs from the sum of `composition_tonnes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Day being forecast (day after the last observed total).
    pub date: NaiveDate,
    pub total_waste_tonnes: f64,
    pub composition_tonnes: MaterialBreakdown,
    pub composition_percent: MaterialBreakdown,
}

impl ForecastResult {
    /// Builds a result from raw model estimates.
    ///
    /// Negative estimates are clamped to zero; percentages are shares of the
    /// clamped material total, rounded to one decimal, or all zero when
    /// that total is not positive.
    pub fn from_estimates(
        date: NaiveDate,
        total_estimate: f64,
        mut material_estimates: MaterialBreakdown,
    ) -> Self {
        material_estimates.clamp_negative();
        let composition_percent = material_estimates.percentages();
        Self {
            date,
            total_waste_tonnes: total_estimate.max(0.0),
            composition_tonnes: material_estimates,
            composition_percent,
        }
    }

    /// Sum of the material tonnes.
    pub fn composition_total(&self) -> f64 {
        self.composition_tonnes.total()
    }
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total waste:           {:.2} t", self.total_waste_tonnes)?;
        for (m, tonnes) in self.composition_tonnes.iter() {
            let pct = self.composition_percent.get(m).unwrap_or(0.0);
            writeln!(f, "  {m:<20} {tonnes:>8.2} t  {pct:>5.1}%")?;
        }
        Ok(())
    }
}

/// Forecasts every quantity of `district` and assembles the result.
///
/// The total and each material are fit on separate threads. If any fit
/// fails the whole district fails; the error names the first failing
/// quantity in order (total first, then materials in configuration order).
///
/// # Errors
///
/// Returns a `DistrictForecastError` naming the district and quantity.
pub fn forecast_district(
    snapshot: &Snapshot,
    district: &str,
    forecaster: &dyn Forecaster,
) -> Result<ForecastResult, DistrictForecastError> {
    info!(district, model = forecaster.name(), "forecasting district");

    let mut quantities = vec![Quantity::Total];
    quantities.extend(snapshot.materials().iter().cloned().map(Quantity::Material));

    let outcomes = fanout::run_all(&quantities, |q| {
        forecaster.forecast_next(&snapshot.series(district, q))
    });

    let mut estimates: Vec<SeriesForecast> = Vec::with_capacity(quantities.len());
    let mut failure = None;
    for (quantity, outcome) in quantities.iter().zip(outcomes) {
        let source = match outcome {
            TaskOutcome::Done(fc) => {
                estimates.push(fc);
                continue;
            }
            TaskOutcome::Skipped => continue,
            TaskOutcome::Failed(e) => e,
            TaskOutcome::Panicked(msg) => FitError::Degenerate(format!("model panicked: {msg}")),
        };
        failure = Some(DistrictForecastError {
            district: district.to_string(),
            quantity: quantity.clone(),
            source,
        });
        break;
    }
    if let Some(err) = failure {
        warn!(district, error = %err, "district forecast failed");
        return Err(err);
    }

    let total = estimates[0];
    let materials: MaterialBreakdown = snapshot
        .materials()
        .iter()
        .cloned()
        .zip(estimates[1..].iter().map(|fc| fc.yhat))
        .collect();

    for (m, v) in materials.iter().filter(|(_, v)| *v < 0.0) {
        warn!(district, material = m, estimate = v, "clamping negative estimate to zero");
    }

    Ok(ForecastResult::from_estimates(total.date, total.yhat, materials))
}
