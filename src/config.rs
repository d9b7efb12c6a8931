//! TOML-based forecasting configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::CsvSource;
use crate::forecast::{self, Forecaster};

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the `accra` preset. Load from TOML
/// with [`ForecastConfig::from_toml_file`] or use
/// [`ForecastConfig::accra`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Material categories, in reporting order.
    #[serde(default = "default_materials")]
    pub materials: Vec<String>,
    /// History file location.
    #[serde(default)]
    pub data: DataConfig,
    /// Known districts and their generator parameters.
    #[serde(default = "default_districts")]
    pub districts: Vec<DistrictConfig>,
    /// Per-series model selection and tuning.
    #[serde(default)]
    pub model: ModelConfig,
    /// Synthetic data generation.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// HTTP boundary settings.
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_materials() -> Vec<String> {
    ["plastic", "metal", "organic", "paper", "glass"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_districts() -> Vec<DistrictConfig> {
    vec![
        DistrictConfig {
            name: "Ablekuma North".to_string(),
            dumping_site: "North Dumping Site".to_string(),
            mean_tonnes: 25.0,
            std_tonnes: 3.0,
        },
        DistrictConfig {
            name: "Ayawaso West".to_string(),
            dumping_site: "West Dumping Site".to_string(),
            mean_tonnes: 20.0,
            std_tonnes: 3.0,
        },
    ]
}

/// History file location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Path to the CSV history file.
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("synthetic_waste_data.csv"),
        }
    }
}

/// One district and its dumping site.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistrictConfig {
    /// District identifier as it appears in the history file.
    pub name: String,
    /// Dumping site serving this district.
    pub dumping_site: String,
    /// Mean daily tonnage used by the generator.
    #[serde(default = "default_mean_tonnes")]
    pub mean_tonnes: f64,
    /// Daily tonnage standard deviation used by the generator.
    #[serde(default = "default_std_tonnes")]
    pub std_tonnes: f64,
}

fn default_mean_tonnes() -> f64 {
    20.0
}

fn default_std_tonnes() -> f64 {
    3.0
}

/// Per-series model selection and tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Model type: `"holt_winters"` or `"seasonal_naive"`.
    pub kind: String,
    /// Seasonal cycle in days; 0 disables seasonality.
    pub season_length: usize,
    /// Fewest observations a series needs before it is fit.
    pub min_points: usize,
    /// Parameter search iteration budget (Holt-Winters).
    pub max_iterations: usize,
    /// Parameter search convergence tolerance (Holt-Winters).
    pub tolerance: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: "holt_winters".to_string(),
            season_length: 7,
            min_points: 14,
            max_iterations: 200,
            tolerance: 1e-6,
        }
    }
}

/// Synthetic data generation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of days to generate.
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { days: 91, seed: 42 }
    }
}

/// HTTP boundary settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Port the API listens on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"model.min_points"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ForecastConfig {
    /// Two districts of Accra with the default five materials.
    pub fn accra() -> Self {
        Self {
            materials: default_materials(),
            data: DataConfig::default(),
            districts: default_districts(),
            model: ModelConfig::default(),
            generator: GeneratorConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// A single district, useful for quick local runs.
    pub fn single_district() -> Self {
        Self {
            districts: default_districts().into_iter().take(1).collect(),
            generator: GeneratorConfig {
                days: 60,
                ..GeneratorConfig::default()
            },
            ..Self::accra()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["accra", "single_district"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "accra" => Ok(Self::accra()),
            "single_district" => Ok(Self::single_district()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// History source described by `data.path` and `materials`.
    pub fn source(&self) -> CsvSource {
        CsvSource::new(self.data.path.clone(), self.materials.clone())
    }

    /// Forecaster described by the `model` section.
    pub fn forecaster(&self) -> Box<dyn Forecaster> {
        forecast::from_config(&self.model)
    }

    /// Looks up a configured district by name.
    pub fn district(&self, name: &str) -> Option<&DistrictConfig> {
        self.districts.iter().find(|d| d.name == name)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.materials.is_empty() {
            errors.push(ConfigError {
                field: "materials".into(),
                message: "must list at least one material".into(),
            });
        }
        for (i, m) in self.materials.iter().enumerate() {
            if m.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("materials[{i}]"),
                    message: "must not be empty".into(),
                });
            } else if self.materials[..i].contains(m) {
                errors.push(ConfigError {
                    field: format!("materials[{i}]"),
                    message: format!("duplicate material \"{m}\""),
                });
            }
        }

        if self.districts.is_empty() {
            errors.push(ConfigError {
                field: "districts".into(),
                message: "must list at least one district".into(),
            });
        }
        for (i, d) in self.districts.iter().enumerate() {
            if d.name.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("districts[{i}].name"),
                    message: "must not be empty".into(),
                });
            } else if self.districts[..i].iter().any(|o| o.name == d.name) {
                errors.push(ConfigError {
                    field: format!("districts[{i}].name"),
                    message: format!("duplicate district \"{}\"", d.name),
                });
            }
            if d.mean_tonnes <= 0.0 {
                errors.push(ConfigError {
                    field: format!("districts[{i}].mean_tonnes"),
                    message: "must be > 0".into(),
                });
            }
            if d.std_tonnes < 0.0 {
                errors.push(ConfigError {
                    field: format!("districts[{i}].std_tonnes"),
                    message: "must be >= 0".into(),
                });
            }
        }

        let m = &self.model;
        if m.kind != "holt_winters" && m.kind != "seasonal_naive" {
            errors.push(ConfigError {
                field: "model.kind".into(),
                message: format!(
                    "must be \"holt_winters\" or \"seasonal_naive\", got \"{}\"",
                    m.kind
                ),
            });
        }
        if m.min_points < 3 {
            errors.push(ConfigError {
                field: "model.min_points".into(),
                message: "must be >= 3".into(),
            });
        }
        if m.min_points < 2 * m.season_length {
            errors.push(ConfigError {
                field: "model.min_points".into(),
                message: "must cover two full seasons (>= 2 * model.season_length)".into(),
            });
        }
        if m.max_iterations == 0 {
            errors.push(ConfigError {
                field: "model.max_iterations".into(),
                message: "must be > 0".into(),
            });
        }
        if m.tolerance <= 0.0 {
            errors.push(ConfigError {
                field: "model.tolerance".into(),
                message: "must be > 0".into(),
            });
        }

        if self.generator.days == 0 {
            errors.push(ConfigError {
                field: "generator.days".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accra_preset_valid() {
        let cfg = ForecastConfig::accra();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "accra should be valid: {errors:?}");
        assert_eq!(cfg.materials.len(), 5);
        assert_eq!(cfg.districts.len(), 2);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ForecastConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ForecastConfig::PRESETS {
            let cfg = ForecastConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
materials = ["plastic", "paper", "textile"]

[data]
path = "/var/lib/waste/history.csv"

[[districts]]
name = "Osu"
dumping_site = "Osu Transfer Station"
mean_tonnes = 12.5

[model]
kind = "seasonal_naive"
season_length = 7
min_points = 21

[generator]
days = 30
seed = 7

[server]
port = 9090
"#;
        let cfg = ForecastConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.materials.len()), Some(3));
        assert_eq!(cfg.as_ref().map(|c| c.districts.len()), Some(1));
        assert_eq!(
            cfg.as_ref().map(|c| c.districts[0].std_tonnes),
            Some(3.0)
        );
        assert_eq!(cfg.as_ref().map(|c| &*c.model.kind), Some("seasonal_naive"));
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(9090));
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[model]
min_points = 28
"#;
        let cfg = ForecastConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.model.min_points), Some(28));
        assert_eq!(cfg.as_ref().map(|c| c.model.season_length), Some(7));
        assert_eq!(cfg.as_ref().map(|c| c.materials.len()), Some(5));
        assert_eq!(cfg.as_ref().map(|c| c.districts.len()), Some(2));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[model]
kind = "holt_winters"
bogus_field = true
"#;
        assert!(ForecastConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_model_kind() {
        let mut cfg = ForecastConfig::accra();
        cfg.model.kind = "prophet".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "model.kind"));
    }

    #[test]
    fn validation_requires_two_seasons() {
        let mut cfg = ForecastConfig::accra();
        cfg.model.min_points = 10;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "model.min_points"));
    }

    #[test]
    fn validation_catches_duplicates() {
        let mut cfg = ForecastConfig::accra();
        cfg.materials.push("glass".to_string());
        cfg.districts.push(cfg.districts[0].clone());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "materials[5]"));
        assert!(errors.iter().any(|e| e.field == "districts[2].name"));
    }

    #[test]
    fn validation_catches_empty_materials() {
        let mut cfg = ForecastConfig::accra();
        cfg.materials.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "materials"));
    }

    #[test]
    fn district_lookup() {
        let cfg = ForecastConfig::accra();
        assert_eq!(
            cfg.district("Ayawaso West").map(|d| d.dumping_site.as_str()),
            Some("West Dumping Site")
        );
        assert!(cfg.district("Tema").is_none());
    }
}
