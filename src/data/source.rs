//! Loading snapshots from the tabular history file.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use super::record::{HistoricalRecord, MaterialReading};
use super::snapshot::Snapshot;
use crate::error::DataError;

/// Date format used by the history file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything that can hand out a consistent snapshot of the history.
///
/// Implementations are re-read on every call so an appended or regenerated
/// file is picked up by the next request.
pub trait HistorySource: Send + Sync {
    /// Reads the full historical dataset.
    ///
    /// # Errors
    ///
    /// Returns a `DataError` if the source is missing or malformed.
    fn load_snapshot(&self) -> Result<Snapshot, DataError>;
}

/// CSV file with one row per (date, district).
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    materials: Vec<String>,
}

impl CsvSource {
    /// # Arguments
    ///
    /// * `path` - Location of the history file
    /// * `materials` - Material names whose columns are required
    pub fn new(path: impl Into<PathBuf>, materials: Vec<String>) -> Self {
        Self {
            path: path.into(),
            materials,
        }
    }
}

impl HistorySource for CsvSource {
    fn load_snapshot(&self) -> Result<Snapshot, DataError> {
        let file = File::open(&self.path).map_err(|source| DataError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = read_snapshot(file, &self.materials)?;
        debug!(
            path = %self.path.display(),
            rows = snapshot.records().len(),
            "loaded history snapshot"
        );
        Ok(snapshot)
    }
}

/// In-memory source, mainly for injecting fixtures.
impl HistorySource for Snapshot {
    fn load_snapshot(&self) -> Result<Snapshot, DataError> {
        Ok(self.clone())
    }
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    district: usize,
    dumping_site: usize,
    total: usize,
    /// `(tonnes, percent)` per material, in material order.
    materials: Vec<(usize, usize)>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, materials: &[String]) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        let mut material_cols = Vec::with_capacity(materials.len());
        for m in materials {
            material_cols.push((find(&format!("{m}_tonnes"))?, find(&format!("{m}_percent"))?));
        }

        Ok(Self {
            date: find("date")?,
            district: find("district")?,
            dumping_site: find("dumping_site")?,
            total: find("total_waste_tonnes")?,
            materials: material_cols,
        })
    }
}

/// Parses a history file from any reader.
///
/// # Arguments
///
/// * `reader` - CSV source with a header row
/// * `materials` - Material names whose columns are required
///
/// # Errors
///
/// Returns a `DataError` for a missing column, a malformed row, an
/// unparseable date, or an unparseable number.
pub fn read_snapshot(reader: impl Read, materials: &[String]) -> Result<Snapshot, DataError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers, materials)?;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let row_no = i + 1;

        let text = |idx: usize, column: &str| -> Result<String, DataError> {
            match row.get(idx).map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                other => Err(DataError::InvalidField {
                    row: row_no,
                    column: column.to_string(),
                    value: other.unwrap_or_default().to_string(),
                }),
            }
        };
        let number = |idx: usize, column: &str| -> Result<f64, DataError> {
            let raw = text(idx, column)?;
            raw.parse::<f64>().map_err(|_| DataError::InvalidField {
                row: row_no,
                column: column.to_string(),
                value: raw,
            })
        };

        let raw_date = text(cols.date, "date")?;
        let date = parse_date(&raw_date).ok_or_else(|| DataError::InvalidField {
            row: row_no,
            column: "date".to_string(),
            value: raw_date.clone(),
        })?;

        let mut readings = Vec::with_capacity(materials.len());
        for (m, &(t_idx, p_idx)) in materials.iter().zip(&cols.materials) {
            readings.push(MaterialReading {
                material: m.clone(),
                tonnes: number(t_idx, &format!("{m}_tonnes"))?,
                percent: number(p_idx, &format!("{m}_percent"))?,
            });
        }

        records.push(HistoricalRecord {
            date,
            district: text(cols.district, "district")?,
            dumping_site: text(cols.dumping_site, "dumping_site")?,
            total_waste_tonnes: number(cols.total, "total_waste_tonnes")?,
            materials: readings,
        });
    }

    Ok(Snapshot::new(materials.to_vec(), records))
}

/// Parses a `YYYY-MM-DD` date, also accepting a trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}
