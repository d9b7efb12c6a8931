//! Seasonal-naive forecaster: "tomorrow looks like the same weekday last week".

use super::Forecaster;
use crate::error::FitError;

/// Repeats the observation one season back.
///
/// With a `season_length` of 0 this is the plain "tomorrow is today"
/// forecast.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeasonalNaive {
    season_length: usize,
    min_points: usize,
}

impl SeasonalNaive {
    pub fn new(season_length: usize, min_points: usize) -> Self {
        Self {
            season_length,
            min_points,
        }
    }
}

impl Forecaster for SeasonalNaive {
    fn name(&self) -> &'static str {
        "seasonal_naive"
    }

    fn min_points(&self) -> usize {
        self.min_points.max(self.season_length).max(1)
    }

    fn fit_predict(&self, values: &[f64]) -> Result<f64, FitError> {
        let required = self.min_points();
        if values.len() < required {
            return Err(FitError::InsufficientData {
                required,
                actual: values.len(),
            });
        }
        let lag = self.season_length.max(1);
        Ok(values[values.len() - lag])
    }
}
