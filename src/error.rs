//! Typed failures for data loading, model fitting, and aggregation.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::Quantity;

/// The historical source is missing, unreadable, or fails schema validation.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read historical data \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed historical data: {0}")]
    Csv(#[from] csv::Error),

    #[error("historical data is missing required column \"{0}\"")]
    MissingColumn(String),

    #[error("row {row}: cannot parse column \"{column}\" value \"{value}\"")]
    InvalidField {
        /// 1-based data row (header excluded).
        row: usize,
        column: String,
        value: String,
    },
}

/// A per-series model fit could not produce an estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("dates must be strictly increasing ({previous} followed by {next})")]
    UnorderedDates {
        previous: NaiveDate,
        next: NaiveDate,
    },

    #[error("invalid value {value} on {date}")]
    InvalidValue { date: NaiveDate, value: f64 },

    #[error("degenerate series: {0}")]
    Degenerate(String),
}

/// One district's forecast could not be completed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("forecast for district \"{district}\" failed on {quantity}: {source}")]
pub struct DistrictForecastError {
    pub district: String,
    pub quantity: Quantity,
    #[source]
    pub source: FitError,
}

/// The overall forecast failed because one of its districts did.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("overall forecast aborted: {0}")]
pub struct AggregationError(#[from] pub DistrictForecastError);
