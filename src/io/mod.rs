//! File output for historical records.

pub mod export;
