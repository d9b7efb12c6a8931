//! One-step-ahead forecasting of a single daily series.

pub mod holt_winters;
pub mod naive;
mod optimizer;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ModelConfig;
use crate::error::FitError;

pub use holt_winters::HoltWinters;
pub use naive::SeasonalNaive;

/// One daily observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Point estimate for the day after the last observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesForecast {
    pub date: NaiveDate,
    pub yhat: f64,
}

/// A univariate model producing a one-step-ahead estimate.
///
/// Implementations must be pure functions of their input so that fits can
/// run on worker threads and repeat bit-for-bit.
pub trait Forecaster: Send + Sync {
    /// Short model identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fewest observations the model can fit.
    fn min_points(&self) -> usize;

    /// Fits `values` (oldest first) and returns the next value.
    ///
    /// # Errors
    ///
    /// Returns a `FitError` when the model cannot produce an estimate.
    fn fit_predict(&self, values: &[f64]) -> Result<f64, FitError>;

    /// Validates a dated series and forecasts the following day.
    ///
    /// # Errors
    ///
    /// Returns a `FitError` if the series is too short, its dates are not
    /// strictly increasing, a value is negative or non-finite, or the model
    /// yields a non-finite estimate.
    fn forecast_next(&self, series: &[SeriesPoint]) -> Result<SeriesForecast, FitError> {
        validate_series(series, self.min_points())?;

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let yhat = self.fit_predict(&values)?;
        if !yhat.is_finite() {
            return Err(FitError::Degenerate(format!(
                "{} produced a non-finite estimate",
                self.name()
            )));
        }

        let last = series[series.len() - 1].date;
        let date = last
            .succ_opt()
            .ok_or_else(|| FitError::Degenerate(format!("no calendar day after {last}")))?;
        Ok(SeriesForecast { date, yhat })
    }
}

/// Checks length, ordering, and values of a series.
///
/// # Errors
///
/// Returns the first `FitError` found.
pub fn validate_series(series: &[SeriesPoint], min_points: usize) -> Result<(), FitError> {
    if series.len() < min_points.max(1) {
        return Err(FitError::InsufficientData {
            required: min_points.max(1),
            actual: series.len(),
        });
    }

    for pair in series.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(FitError::UnorderedDates {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
    }

    if let Some(bad) = series
        .iter()
        .find(|p| !p.value.is_finite() || p.value < 0.0)
    {
        return Err(FitError::InvalidValue {
            date: bad.date,
            value: bad.value,
        });
    }

    Ok(())
}

/// Builds the forecaster selected by `model.kind`.
///
/// Unknown kinds are rejected by [`crate::config::ForecastConfig::validate`];
/// anything other than `"seasonal_naive"` gets Holt-Winters.
pub fn from_config(model: &ModelConfig) -> Box<dyn Forecaster> {
    match model.kind.as_str() {
        "seasonal_naive" => Box::new(SeasonalNaive::new(model.season_length, model.min_points)),
        _ => Box::new(
            HoltWinters::new(model.season_length, model.min_points)
                .with_optimizer(model.max_iterations, model.tolerance),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                date: start + chrono::Days::new(i as u64),
                value,
            })
            .collect()
    }

    #[test]
    fn forecast_is_dated_day_after_last_observation() {
        let s = series(&[1.0, 2.0, 3.0]);
        let fc = SeasonalNaive::new(0, 1).forecast_next(&s).unwrap();
        assert_eq!(fc.date, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
        assert_eq!(fc.yhat, 3.0);
    }

    #[test]
    fn rejects_unordered_dates() {
        let mut s = series(&[1.0, 2.0, 3.0]);
        s.swap(1, 2);
        let err = SeasonalNaive::new(0, 1).forecast_next(&s).unwrap_err();
        assert!(matches!(err, FitError::UnorderedDates { .. }));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let mut s = series(&[1.0, 2.0, 3.0]);
        s[2].date = s[1].date;
        assert!(matches!(
            validate_series(&s, 1),
            Err(FitError::UnorderedDates { .. })
        ));
    }

    #[test]
    fn rejects_negative_and_nan_values() {
        let s = series(&[1.0, -0.5, 3.0]);
        assert!(matches!(
            validate_series(&s, 1),
            Err(FitError::InvalidValue { value, .. }) if value == -0.5
        ));
        let s = series(&[1.0, f64::NAN, 3.0]);
        assert!(matches!(
            validate_series(&s, 1),
            Err(FitError::InvalidValue { .. })
        ));
    }

    #[test]
    fn two_points_below_default_minimum() {
        let model = from_config(&ModelConfig::default());
        let err = model.forecast_next(&series(&[5.0, 6.0])).unwrap_err();
        assert!(matches!(err, FitError::InsufficientData { actual: 2, .. }));
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = HoltWinters::new(7, 14).forecast_next(&[]).unwrap_err();
        assert!(matches!(err, FitError::InsufficientData { actual: 0, .. }));
    }

    #[test]
    fn from_config_selects_model() {
        let mut cfg = ModelConfig::default();
        assert_eq!(from_config(&cfg).name(), "holt_winters");
        cfg.kind = "seasonal_naive".to_string();
        assert_eq!(from_config(&cfg).name(), "seasonal_naive");
    }
}
