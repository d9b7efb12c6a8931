//! CSV export for historical records.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::data::HistoricalRecord;

/// Column header for a given material list.
///
/// `date, district, dumping_site, total_waste_tonnes`, then a
/// `<material>_tonnes` / `<material>_percent` pair per material.
pub fn header(materials: &[String]) -> Vec<String> {
    let mut cols: Vec<String> = ["date", "district", "dumping_site", "total_waste_tonnes"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    for m in materials {
        cols.push(format!("{m}_tonnes"));
        cols.push(format!("{m}_percent"));
    }
    cols
}

/// Writes records to a new file at `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[HistoricalRecord], materials: &[String], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(records, materials, io::BufWriter::new(file), true)
}

/// Appends records to `path`, writing the header only if the file is new
/// or empty.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be opened or written.
pub fn append_csv(records: &[HistoricalRecord], materials: &[String], path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;
    write_csv(records, materials, io::BufWriter::new(file), needs_header)
}

/// Writes records as CSV to any writer.
///
/// Tonnes are written with two decimals and percents with one. Materials
/// missing from a record are written as `0`.
///
/// # Arguments
///
/// * `records` - Rows to write, in order
/// * `materials` - Material column order
/// * `writer` - Destination implementing `Write`
/// * `with_header` - Whether to emit the header row first
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(
    records: &[HistoricalRecord],
    materials: &[String],
    writer: impl Write,
    with_header: bool,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    if with_header {
        wtr.write_record(header(materials))?;
    }

    for r in records {
        let mut row = vec![
            r.date.format("%Y-%m-%d").to_string(),
            r.district.clone(),
            r.dumping_site.clone(),
            format!("{:.2}", r.total_waste_tonnes),
        ];
        for m in materials {
            let (tonnes, percent) = r
                .material(m)
                .map_or((0.0, 0.0), |reading| (reading.tonnes, reading.percent));
            row.push(format!("{tonnes:.2}"));
            row.push(format!("{percent:.1}"));
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
