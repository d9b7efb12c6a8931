//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use waste_forecast::config::ForecastConfig;
use waste_forecast::data::Snapshot;
use waste_forecast::generator::Generator;

/// First day of every generated fixture history.
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Two-district Accra configuration with default model settings.
pub fn default_config() -> ForecastConfig {
    ForecastConfig::accra()
}

/// Seeded synthetic snapshot of `days` days for every configured district.
pub fn generated_snapshot(config: &ForecastConfig, days: usize, seed: u64) -> Snapshot {
    let records = Generator::from_config(config, seed).run(start_date(), days);
    Snapshot::new(config.materials.clone(), records)
}

/// Ninety days of history for the two Accra districts (seed 42).
pub fn ninety_day_snapshot() -> Snapshot {
    generated_snapshot(&default_config(), 90, 42)
}

/// Unique temp file path for a test, removed first if it already exists.
pub fn temp_csv(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "waste-forecast-{name}-{}.csv",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}
