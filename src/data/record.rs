//! One historical row per (date, district).

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tonnage and share of a single material on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialReading {
    /// Material name as configured (e.g. `"plastic"`).
    pub material: String,
    /// Collected tonnes of this material.
    pub tonnes: f64,
    /// Share of the day's total, 0-100.
    pub percent: f64,
}

/// Daily waste record for one district.
///
/// Materials appear in configuration order. Serializes to the flat
/// column layout of the CSV file (`<material>_tonnes`, `<material>_percent`)
/// with the date rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub district: String,
    pub dumping_site: String,
    pub total_waste_tonnes: f64,
    pub materials: Vec<MaterialReading>,
}

impl HistoricalRecord {
    /// Looks up the reading for `material`.
    pub fn material(&self, material: &str) -> Option<&MaterialReading> {
        self.materials.iter().find(|m| m.material == material)
    }

    /// Tonnes recorded for `material`, if the record carries it.
    pub fn material_tonnes(&self, material: &str) -> Option<f64> {
        self.material(material).map(|m| m.tonnes)
    }
}

impl Serialize for HistoricalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + 2 * self.materials.len()))?;
        map.serialize_entry("date", &self.date.format("%Y-%m-%d").to_string())?;
        map.serialize_entry("district", &self.district)?;
        map.serialize_entry("dumping_site", &self.dumping_site)?;
        map.serialize_entry("total_waste_tonnes", &self.total_waste_tonnes)?;
        for m in &self.materials {
            map.serialize_entry(&format!("{}_tonnes", m.material), &m.tonnes)?;
            map.serialize_entry(&format!("{}_percent", m.material), &m.percent)?;
        }
        map.end()
    }
}
