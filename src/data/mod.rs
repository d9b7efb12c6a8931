//! Historical data access: records, snapshots, and their sources.

pub mod record;
pub mod snapshot;
pub mod source;

pub use record::{HistoricalRecord, MaterialReading};
pub use snapshot::{DateBreakdown, Quantity, Snapshot};
pub use source::{CsvSource, HistorySource};
