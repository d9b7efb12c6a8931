//! Additive Holt-Winters exponential smoothing for daily series.
//!
//! Level, additive trend, and an additive seasonal cycle (weekly for daily
//! waste data). Smoothing parameters are chosen by minimizing the in-sample
//! one-step squared error with a bounded Nelder-Mead search, so the fit is
//! fully deterministic.

use tracing::debug;

use super::Forecaster;
use super::optimizer::{self, Bounds};
use crate::error::FitError;

/// Smoothing weights: level (`alpha`), trend (`beta`), seasonal (`gamma`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// State after running the recursions over the whole series.
#[derive(Debug, Clone)]
struct Fitted {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    sse: f64,
}

impl Fitted {
    /// Point forecast for the step right after the last observation.
    fn next(&self, n: usize) -> f64 {
        let s = if self.seasonal.is_empty() {
            0.0
        } else {
            self.seasonal[n % self.seasonal.len()]
        };
        self.level + self.trend + s
    }
}

/// Holt-Winters forecaster.
///
/// A `season_length` of 0 disables the seasonal component (Holt's linear
/// trend method).
#[derive(Debug, Clone)]
pub struct HoltWinters {
    season_length: usize,
    min_points: usize,
    max_iterations: usize,
    tolerance: f64,
}

impl HoltWinters {
    /// # Arguments
    ///
    /// * `season_length` - Cycle length in observations (7 for weekly)
    /// * `min_points` - Requested minimum series length; raised to two
    ///   full seasons (or 3 without seasonality) when lower
    pub fn new(season_length: usize, min_points: usize) -> Self {
        Self {
            season_length,
            min_points,
            max_iterations: 200,
            tolerance: 1e-6,
        }
    }

    /// Overrides the parameter search budget.
    pub fn with_optimizer(mut self, max_iterations: usize, tolerance: f64) -> Self {
        self.max_iterations = max_iterations.max(1);
        self.tolerance = tolerance;
        self
    }

    /// Chooses smoothing parameters for `values`.
    fn optimize(&self, values: &[f64]) -> SmoothingParams {
        let seasonal = self.season_length > 0;
        let mut initial = vec![0.3, 0.05];
        let mut lower = vec![0.001, 0.001];
        let mut upper = vec![0.999, 0.5];
        if seasonal {
            initial.push(0.1);
            lower.push(0.001);
            upper.push(0.999);
        }

        let unpack = |raw: &[f64]| SmoothingParams {
            alpha: raw[0],
            beta: raw[1],
            gamma: if seasonal { raw[2] } else { 0.0 },
        };

        let best = optimizer::minimize(
            |raw| {
                let sse = fit(values, self.season_length, unpack(raw)).sse;
                if sse.is_finite() { sse } else { f64::MAX }
            },
            &initial,
            &Bounds { lower, upper },
            self.max_iterations,
            self.tolerance,
        );
        unpack(&best)
    }
}

impl Forecaster for HoltWinters {
    fn name(&self) -> &'static str {
        "holt_winters"
    }

    fn min_points(&self) -> usize {
        let structural = if self.season_length > 0 {
            2 * self.season_length
        } else {
            3
        };
        self.min_points.max(structural)
    }

    fn fit_predict(&self, values: &[f64]) -> Result<f64, FitError> {
        let required = self.min_points();
        if values.len() < required {
            return Err(FitError::InsufficientData {
                required,
                actual: values.len(),
            });
        }

        let params = self.optimize(values);
        let fitted = fit(values, self.season_length, params);
        if !fitted.sse.is_finite() {
            return Err(FitError::Degenerate(format!(
                "non-finite in-sample error ({})",
                fitted.sse
            )));
        }

        let yhat = fitted.next(values.len());
        debug!(
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            sse = fitted.sse,
            yhat,
            "fitted holt-winters"
        );
        Ok(yhat)
    }
}

/// Initial level, trend, and seasonal indices.
///
/// The level is placed at the last observation of the first season; the
/// seasonal indices are first-season deviations with the trend removed, so
/// they sum to zero.
fn initialize(values: &[f64], m: usize) -> (f64, f64, Vec<f64>) {
    if m == 0 {
        return (values[0], values[1] - values[0], Vec::new());
    }

    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let mean1 = mean(&values[..m]);
    let mean2 = mean(&values[m..2 * m]);
    let trend = (mean2 - mean1) / m as f64;
    let center = (m as f64 - 1.0) / 2.0;

    let seasonal = values[..m]
        .iter()
        .enumerate()
        .map(|(i, &v)| v - (mean1 + (i as f64 - center) * trend))
        .collect();
    let level = mean1 + center * trend;

    (level, trend, seasonal)
}

/// Runs the additive recursions over `values`.
fn fit(values: &[f64], m: usize, params: SmoothingParams) -> Fitted {
    let SmoothingParams { alpha, beta, gamma } = params;
    let (mut level, mut trend, mut seasonal) = initialize(values, m);
    let start = if m == 0 { 1 } else { m };
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate().skip(start) {
        let s_prev = if m == 0 { 0.0 } else { seasonal[t % m] };
        let err = y - (level + trend + s_prev);
        sse += err * err;

        let prev_level = level;
        level = alpha * (y - s_prev) + (1.0 - alpha) * (prev_level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        if m > 0 {
            seasonal[t % m] = gamma * (y - level) + (1.0 - gamma) * s_prev;
        }
    }

    Fitted {
        level,
        trend,
        seasonal,
        sse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn trend_seasonal(n: usize, m: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 2.0 * i as f64 + 10.0 * (2.0 * PI * i as f64 / m as f64).sin())
            .collect()
    }

    #[test]
    fn initialize_detrends_first_season() {
        let values: Vec<f64> = (0..14).map(|i| 10.0 + 2.0 * i as f64).collect();
        let (level, trend, seasonal) = initialize(&values, 7);
        assert!((trend - 2.0).abs() < 1e-12);
        // level sits on the last point of the first season
        assert!((level - values[6]).abs() < 1e-12);
        assert!(seasonal.iter().all(|s| s.abs() < 1e-12));
    }

    #[test]
    fn seasonal_indices_sum_to_zero() {
        let values = trend_seasonal(21, 7);
        let (_, _, seasonal) = initialize(&values, 7);
        assert!(seasonal.iter().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn recovers_exact_trend_and_weekly_cycle() {
        let values = trend_seasonal(63, 7);
        let model = HoltWinters::new(7, 14);
        let yhat = model.fit_predict(&values).unwrap();
        let expected = trend_seasonal(64, 7)[63];
        assert!(
            (yhat - expected).abs() < 1e-6,
            "yhat = {yhat}, expected = {expected}"
        );
    }

    #[test]
    fn linear_trend_without_seasonality() {
        let values: Vec<f64> = (0..20).map(|i| 5.0 + 0.5 * i as f64).collect();
        let model = HoltWinters::new(0, 3);
        let yhat = model.fit_predict(&values).unwrap();
        assert!((yhat - 15.0).abs() < 1e-9, "yhat = {yhat}");
    }

    #[test]
    fn constant_series_forecasts_the_constant() {
        let values = vec![4.2; 30];
        let yhat = HoltWinters::new(7, 14).fit_predict(&values).unwrap();
        assert!((yhat - 4.2).abs() < 1e-9);
    }

    #[test]
    fn two_points_is_insufficient() {
        let err = HoltWinters::new(7, 14).fit_predict(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                required: 14,
                actual: 2
            }
        );
    }

    #[test]
    fn minimum_covers_two_seasons() {
        assert_eq!(HoltWinters::new(7, 3).min_points(), 14);
        assert_eq!(HoltWinters::new(7, 30).min_points(), 30);
        assert_eq!(HoltWinters::new(0, 1).min_points(), 3);
    }

    #[test]
    fn repeated_fits_are_bit_identical() {
        let values: Vec<f64> = (0..60)
            .map(|i| 20.0 + ((i * 37) % 11) as f64 * 0.7 - (i % 7) as f64)
            .collect();
        let model = HoltWinters::new(7, 14);
        let a = model.fit_predict(&values).unwrap();
        let b = model.fit_predict(&values).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn overflowing_series_is_degenerate() {
        let mut values = vec![1.0e300; 20];
        values[10] = -1.0e300;
        let err = HoltWinters::new(7, 14).fit_predict(&values).unwrap_err();
        assert!(matches!(err, FitError::Degenerate(_)));
    }
}
