//! Immutable view of the historical dataset for one request.

use std::fmt;

use chrono::NaiveDate;

use super::record::HistoricalRecord;
use crate::forecast::SeriesPoint;

/// A measured quantity that can be forecast for a district.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// `total_waste_tonnes`.
    Total,
    /// `<material>_tonnes` for the named material.
    Material(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "total_waste_tonnes"),
            Self::Material(name) => write!(f, "{name}_tonnes"),
        }
    }
}

/// Result of a per-date lookup.
#[derive(Debug, PartialEq)]
pub enum DateBreakdown<'a> {
    /// Every district's record for the requested date.
    Found(Vec<&'a HistoricalRecord>),
    /// No row matches the date. A valid, empty answer.
    NoDataForDate,
}

/// Snapshot of all historical records, in source order.
///
/// The source is append-only by date, so per-district views are
/// chronological.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    materials: Vec<String>,
    records: Vec<HistoricalRecord>,
}

impl Snapshot {
    /// Wraps already-parsed records.
    ///
    /// # Arguments
    ///
    /// * `materials` - Material names in configuration order
    /// * `records` - Rows in source order
    pub fn new(materials: Vec<String>, records: Vec<HistoricalRecord>) -> Self {
        Self { materials, records }
    }

    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    /// Rows for `district`, preserving source order.
    pub fn filter_by_district(&self, district: &str) -> Vec<&HistoricalRecord> {
        self.records
            .iter()
            .filter(|r| r.district == district)
            .collect()
    }

    /// Rows of every district recorded on `date`. Empty when none match.
    pub fn filter_by_date(&self, date: NaiveDate) -> Vec<&HistoricalRecord> {
        self.records.iter().filter(|r| r.date == date).collect()
    }

    /// Per-date breakdown, distinguishing "no rows" from a failure.
    pub fn breakdown_for_date(&self, date: NaiveDate) -> DateBreakdown<'_> {
        let rows = self.filter_by_date(date);
        if rows.is_empty() {
            DateBreakdown::NoDataForDate
        } else {
            DateBreakdown::Found(rows)
        }
    }

    /// Distinct districts in first-occurrence order.
    pub fn list_districts(&self) -> Vec<String> {
        let mut districts: Vec<String> = Vec::new();
        for r in &self.records {
            if !districts.iter().any(|d| *d == r.district) {
                districts.push(r.district.clone());
            }
        }
        districts
    }

    /// Rows for `district` when it is present, otherwise every row.
    ///
    /// This is the charting view: an absent or unknown district falls back
    /// to the full history.
    pub fn history(&self, district: Option<&str>) -> Vec<&HistoricalRecord> {
        match district {
            Some(d) if self.records.iter().any(|r| r.district == d) => self.filter_by_district(d),
            _ => self.records.iter().collect(),
        }
    }

    /// Chronological `(date, value)` series of `quantity` for `district`.
    ///
    /// Rows without a reading for the requested material are skipped.
    pub fn series(&self, district: &str, quantity: &Quantity) -> Vec<SeriesPoint> {
        self.records
            .iter()
            .filter(|r| r.district == district)
            .filter_map(|r| {
                let value = match quantity {
                    Quantity::Total => Some(r.total_waste_tonnes),
                    Quantity::Material(name) => r.material_tonnes(name),
                };
                value.map(|value| SeriesPoint {
                    date: r.date,
                    value,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::MaterialReading;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn make_record(d: u32, district: &str, total: f64) -> HistoricalRecord {
        HistoricalRecord {
            date: day(d),
            district: district.to_string(),
            dumping_site: format!("{district} Site"),
            total_waste_tonnes: total,
            materials: vec![MaterialReading {
                material: "paper".to_string(),
                tonnes: total / 2.0,
                percent: 50.0,
            }],
        }
    }

    fn make_snapshot() -> Snapshot {
        Snapshot::new(
            vec!["paper".to_string()],
            vec![
                make_record(1, "B", 10.0),
                make_record(1, "A", 20.0),
                make_record(2, "B", 11.0),
                make_record(2, "A", 21.0),
                make_record(3, "B", 12.0),
            ],
        )
    }

    #[test]
    fn districts_in_first_occurrence_order() {
        assert_eq!(make_snapshot().list_districts(), vec!["B", "A"]);
    }

    #[test]
    fn filter_by_district_keeps_order() {
        let snap = make_snapshot();
        let rows = snap.filter_by_district("B");
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn filter_by_date_spans_districts() {
        let snap = make_snapshot();
        assert_eq!(snap.filter_by_date(day(2)).len(), 2);
        assert!(snap.filter_by_date(day(9)).is_empty());
    }

    #[test]
    fn missing_date_is_no_data_not_error() {
        let snap = make_snapshot();
        assert_eq!(snap.breakdown_for_date(day(9)), DateBreakdown::NoDataForDate);
        match snap.breakdown_for_date(day(3)) {
            DateBreakdown::Found(rows) => assert_eq!(rows.len(), 1),
            DateBreakdown::NoDataForDate => panic!("day 3 has a row"),
        }
    }

    #[test]
    fn history_falls_back_to_all_rows_for_unknown_district() {
        let snap = make_snapshot();
        assert_eq!(snap.history(Some("A")).len(), 2);
        assert_eq!(snap.history(Some("Z")).len(), 5);
        assert_eq!(snap.history(None).len(), 5);
    }

    #[test]
    fn series_extracts_total_and_material() {
        let snap = make_snapshot();
        let total: Vec<f64> = snap
            .series("A", &Quantity::Total)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(total, vec![20.0, 21.0]);

        let paper = snap.series("B", &Quantity::Material("paper".to_string()));
        assert_eq!(paper.len(), 3);
        assert_eq!(paper[2].value, 6.0);

        assert!(
            snap.series("B", &Quantity::Material("metal".to_string()))
                .is_empty()
        );
    }

    #[test]
    fn quantity_display_matches_column_names() {
        assert_eq!(Quantity::Total.to_string(), "total_waste_tonnes");
        assert_eq!(
            Quantity::Material("organic".to_string()).to_string(),
            "organic_tonnes"
        );
    }
}
