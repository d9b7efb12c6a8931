//! Next-day municipal waste forecasting per district and city-wide.

#[cfg(feature = "api")]
pub mod api;
/// City-wide aggregation over district forecasts.
pub mod city;
pub mod composition;
pub mod config;
pub mod data;
pub mod district;
pub mod error;
pub mod fanout;
pub mod forecast;
pub mod generator;
pub mod io;
