//! Meter configuration.
//!
//! A meter is described by its ordered factor identifiers, per-factor
//! setting overrides and the two aggregation parameters. Configuration can
//! be loaded from TOML or from `NAME=VALUE` pairs.
//!
//! ```
//! use pwd_meter::MeterConfig;
//!
//! let config = MeterConfig::from_toml_str(r#"
//!     factors = ["length", "notword"]
//!     threshold = 0.8
//!
//!     [overrides.length]
//!     target = 12
//! "#).unwrap();
//!
//! assert_eq!(config.factors, ["length", "notword"]);
//! assert_eq!(config.threshold, 0.8);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

pub const DEFAULT_FACTORS: &[&str] = &["length", "charmix", "variety", "casemix", "notword", "phrase"];
pub const DEFAULT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_PESSIMISM: f64 = 1.0 / 10.0;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid settings for factor `{factor}`: {source}")]
    Settings {
        factor: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown factor: {0}")]
    UnknownFactor(String),

    #[error("Overrides given for factor `{0}`, which is not configured")]
    UnusedOverride(String),

    #[error("Duplicate factor category: {0}")]
    DuplicateCategory(String),

    #[error("No factors configured")]
    NoFactors,

    #[error("Malformed setting `{0}`, expected NAME=VALUE")]
    MalformedSetting(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main meter configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeterConfig {
    /// Factor identifiers, evaluated in this order.
    pub factors: Vec<String>,

    /// Adjusted score below which a factor's message is reported.
    pub threshold: f64,

    /// How sharply low factor scores dominate the aggregate.
    pub pessimism: f64,

    /// Per-factor settings, keyed by factor identifier.
    pub overrides: BTreeMap<String, Table>,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            factors: DEFAULT_FACTORS.iter().map(|id| id.to_string()).collect(),
            threshold: DEFAULT_THRESHOLD,
            pessimism: DEFAULT_PESSIMISM,
            overrides: BTreeMap::new(),
        }
    }
}

impl MeterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Builds configuration from `NAME=VALUE` pairs, starting from defaults.
    ///
    /// Recognized names are `factors` (comma separated), `threshold`,
    /// `pessimism` and `<factor>.<key>` for factor overrides. Override values
    /// are read as integer, float or boolean when they parse as one, and as
    /// a string otherwise.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, raw) = pair
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedSetting(pair.to_string()))?;
            let (name, raw) = (name.trim(), raw.trim());
            match name {
                "factors" => {
                    config.factors = raw
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "threshold" => config.threshold = parse_number(name, raw)?,
                "pessimism" => config.pessimism = parse_number(name, raw)?,
                _ => {
                    let (factor, key) = name
                        .split_once('.')
                        .filter(|(factor, key)| !factor.is_empty() && !key.is_empty())
                        .ok_or_else(|| ConfigError::Invalid(format!("unknown setting `{name}`")))?;
                    config
                        .overrides
                        .entry(factor.to_string())
                        .or_default()
                        .insert(key.to_string(), parse_value(raw));
                }
            }
        }
        Ok(config)
    }

    /// Replaces the factor list.
    pub fn with_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factors = factors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_pessimism(mut self, pessimism: f64) -> Self {
        self.pessimism = pessimism;
        self
    }

    /// Sets one override key for `factor`.
    pub fn with_override(
        mut self,
        factor: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.overrides
            .entry(factor.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Checks the aggregation parameters and that every override targets a
    /// configured factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.threshold)?;
        validate_pessimism(self.pessimism)?;
        if self.factors.is_empty() {
            return Err(ConfigError::NoFactors);
        }
        if let Some(unused) = self.overrides.keys().find(|id| !self.factors.contains(*id)) {
            return Err(ConfigError::UnusedOverride(unused.clone()));
        }
        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Invalid(format!(
            "threshold must lie in [0, 1], got {threshold}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_pessimism(pessimism: f64) -> Result<(), ConfigError> {
    if !pessimism.is_finite() || pessimism < f64::EPSILON {
        return Err(ConfigError::Invalid(format!(
            "pessimism must be a number of at least {}, got {pessimism}",
            f64::EPSILON
        )));
    }
    Ok(())
}

fn parse_number(name: &str, raw: &str) -> Result<f64, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a number, got `{raw}`")))
}

fn parse_value(raw: &str) -> Value {
    if let Ok(integer) = raw.parse::<i64>() {
        Value::Integer(integer)
    } else if let Ok(float) = raw.parse::<f64>() {
        Value::Float(float)
    } else if let Ok(boolean) = raw.parse::<bool>() {
        Value::Boolean(boolean)
    } else {
        Value::String(raw.to_string())
    }
}
