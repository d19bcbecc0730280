//! Password strength factors
//!
//! Each factor judges one property of the password. The meter combines
//! their judgments into a single score.

use std::any::Any;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use toml::Table;

use crate::config::ConfigError;

mod length;
mod mix;
mod notword;
mod phrase;
mod variety;

pub use length::LengthFactor;
pub use mix::{MixFactor, MixKind};
pub use notword::NotWordFactor;
pub use phrase::PhraseFactor;
pub use variety::VarietyFactor;

pub const DEFAULT_WEIGHT: f64 = 1.0;
pub const DEFAULT_CLIP_MIN: f64 = 0.0;
pub const DEFAULT_CLIP_MAX: f64 = 1.3;
pub const DEFAULT_SKEW: f64 = 0.0;
pub const DEFAULT_SPREAD: f64 = 1.0;

/// Settings keys understood by every built-in factor.
pub const COMMON_KEYS: &[&str] = &[
    "category", "message", "weight", "clip_min", "clip_max", "skew", "spread",
];

/// Raw outcome of a single factor test.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    /// Unadjusted score, usually in `[0, 1]`.
    pub score: f64,
    /// Suggestion on how the password could do better on this factor.
    pub message: Option<String>,
}

impl Judgment {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Linear transform, clipping and static weight applied to a raw score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub weight: f64,
    pub clip_min: f64,
    pub clip_max: f64,
    pub skew: f64,
    pub spread: f64,
}

impl Default for Adjustment {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            clip_min: DEFAULT_CLIP_MIN,
            clip_max: DEFAULT_CLIP_MAX,
            skew: DEFAULT_SKEW,
            spread: DEFAULT_SPREAD,
        }
    }
}

impl Adjustment {
    /// Checks the numeric bounds of this adjustment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a value is not finite, the weight is
    /// not positive, or `clip_min > clip_max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("weight", self.weight),
            ("clip_min", self.clip_min),
            ("clip_max", self.clip_max),
            ("skew", self.skew),
            ("spread", self.spread),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }
        if self.weight <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "weight must be positive, got {}",
                self.weight
            )));
        }
        if self.clip_min > self.clip_max {
            return Err(ConfigError::Invalid(format!(
                "clip_min ({}) exceeds clip_max ({})",
                self.clip_min, self.clip_max
            )));
        }
        Ok(())
    }

    /// Returns `clip(skew + spread * raw, clip_min, clip_max)`.
    ///
    /// A NaN result lands on `clip_min`.
    pub fn apply(&self, raw: f64) -> f64 {
        let value = self.skew + self.spread * raw;
        if value.is_nan() {
            return self.clip_min;
        }
        value.clamp(self.clip_min, self.clip_max)
    }
}

/// A pluggable password strength factor.
///
/// Implementations must be immutable once constructed: the meter may call
/// `test` from several threads at once.
pub trait Factor: Send + Sync {
    /// Key under which this factor's improvement message is reported.
    fn category(&self) -> &str;

    /// Judges `password`. `context` is whatever the caller handed to the
    /// meter, passed through untouched.
    fn test(&self, password: &str, context: Option<&dyn Any>) -> Judgment;

    fn adjustment(&self) -> Adjustment {
        Adjustment::default()
    }
}

/// Settings shared by all built-in factors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommonSettings {
    pub category: Option<String>,
    pub message: Option<String>,
    pub weight: f64,
    pub clip_min: f64,
    pub clip_max: f64,
    pub skew: f64,
    pub spread: f64,
}

impl Default for CommonSettings {
    fn default() -> Self {
        let adjustment = Adjustment::default();
        Self {
            category: None,
            message: None,
            weight: adjustment.weight,
            clip_min: adjustment.clip_min,
            clip_max: adjustment.clip_max,
            skew: adjustment.skew,
            spread: adjustment.spread,
        }
    }
}

impl CommonSettings {
    /// Reads the common keys out of `settings`, ignoring every other key.
    ///
    /// Intended for external factors, which must tolerate keys they do not
    /// know about.
    pub fn lenient(factor: &str, settings: &Table) -> Result<Self, ConfigError> {
        let (common, _) = partition(settings);
        from_table(factor, common)
    }

    /// Validated adjustment described by these settings.
    pub fn adjustment(&self) -> Result<Adjustment, ConfigError> {
        let adjustment = Adjustment {
            weight: self.weight,
            clip_min: self.clip_min,
            clip_max: self.clip_max,
            skew: self.skew,
            spread: self.spread,
        };
        adjustment.validate()?;
        Ok(adjustment)
    }
}

/// Settings of a factor that has no parameters of its own.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NoSettings {}

/// Identity, message and adjustment carried by every built-in factor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FactorBase {
    pub(crate) category: String,
    pub(crate) message: String,
    pub(crate) adjustment: Adjustment,
}

impl FactorBase {
    pub(crate) fn new(category: &str, message: &str) -> Self {
        Self {
            category: category.to_string(),
            message: message.to_string(),
            adjustment: Adjustment::default(),
        }
    }

    pub(crate) fn from_common(
        common: CommonSettings,
        category: &str,
        message: &str,
    ) -> Result<Self, ConfigError> {
        let adjustment = common.adjustment().map_err(|e| match e {
            ConfigError::Invalid(reason) => ConfigError::Invalid(format!("{category}: {reason}")),
            other => other,
        })?;
        Ok(Self {
            category: common.category.unwrap_or_else(|| category.to_string()),
            message: common.message.unwrap_or_else(|| message.to_string()),
            adjustment,
        })
    }
}

/// Splits `settings` into the common keys and the factor-specific ones, and
/// deserializes both strictly.
pub(crate) fn parse_settings<P: DeserializeOwned>(
    factor: &str,
    settings: &Table,
) -> Result<(CommonSettings, P), ConfigError> {
    let (common, specific) = partition(settings);
    Ok((from_table(factor, common)?, from_table(factor, specific)?))
}

pub(crate) fn ensure_positive(factor: &str, name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{factor}: {name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

fn partition(settings: &Table) -> (Table, Table) {
    let mut common = Table::new();
    let mut specific = Table::new();
    for (key, value) in settings {
        if COMMON_KEYS.contains(&key.as_str()) {
            common.insert(key.clone(), value.clone());
        } else {
            specific.insert(key.clone(), value.clone());
        }
    }
    (common, specific)
}

fn from_table<T: DeserializeOwned>(factor: &str, table: Table) -> Result<T, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|source| ConfigError::Settings {
            factor: factor.to_string(),
            source,
        })
}
