//! Material composition: ordered per-material figures and normalization.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ordered material → value mapping.
///
/// Keeps configuration order (serialized as a JSON object in that order),
/// which a `HashMap` would lose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialBreakdown {
    entries: Vec<(String, f64)>,
}

impl MaterialBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every material set to zero.
    pub fn zeros(materials: &[String]) -> Self {
        materials.iter().map(|m| (m.clone(), 0.0)).collect()
    }

    /// Sets `material`, replacing an existing value.
    pub fn insert(&mut self, material: impl Into<String>, value: f64) {
        let material = material.into();
        match self.entries.iter_mut().find(|(m, _)| *m == material) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((material, value)),
        }
    }

    pub fn get(&self, material: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(m, _)| m == material)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(m, v)| (m.as_str(), *v))
    }

    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(m, _)| m.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Replaces negative values with zero.
    ///
    /// # Returns
    ///
    /// The materials that were clamped, with their original values.
    pub fn clamp_negative(&mut self) -> Vec<(String, f64)> {
        let mut clamped = Vec::new();
        for (m, v) in &mut self.entries {
            if *v < 0.0 {
                clamped.push((m.clone(), *v));
                *v = 0.0;
            }
        }
        clamped
    }

    /// Adds `other` element-wise; materials only in `other` are appended.
    pub fn accumulate(&mut self, other: &MaterialBreakdown) {
        for (m, v) in other.iter() {
            let current = self.get(m).unwrap_or(0.0);
            self.insert(m, current + v);
        }
    }

    /// Percentage share of each material, rounded to one decimal.
    ///
    /// All zeros when the total is not positive.
    pub fn percentages(&self) -> MaterialBreakdown {
        let total = self.total();
        self.entries
            .iter()
            .map(|(m, v)| {
                let pct = if total > 0.0 {
                    round1(100.0 * v / total)
                } else {
                    0.0
                };
                (m.clone(), pct)
            })
            .collect()
    }
}

impl FromIterator<(String, f64)> for MaterialBreakdown {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (m, v) in iter {
            out.insert(m, v);
        }
        out
    }
}

impl Serialize for MaterialBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (m, v) in &self.entries {
            map.serialize_entry(m, v)?;
        }
        map.end()
    }
}
