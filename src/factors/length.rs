//! Length factor - rewards passwords at or beyond a target length.

use std::any::Any;

use serde::Deserialize;
use toml::Table;

use super::{Adjustment, Factor, FactorBase, Judgment, ensure_positive, parse_settings};
use crate::config::ConfigError;
use crate::shape::{DEFAULT_SWITCH, asym};

pub const CATEGORY: &str = "length";
pub const DEFAULT_TARGET: f64 = 8.0;
const MESSAGE: &str = "Increase the length of the password";

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LengthSettings {
    target: f64,
}

impl Default for LengthSettings {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
        }
    }
}

/// Scores `asym(length, target)`, counting characters rather than bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthFactor {
    base: FactorBase,
    target: f64,
}

impl Default for LengthFactor {
    fn default() -> Self {
        Self {
            base: FactorBase::new(CATEGORY, MESSAGE),
            target: DEFAULT_TARGET,
        }
    }
}

impl LengthFactor {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `target` is not a positive number.
    pub fn new(target: f64) -> Result<Self, ConfigError> {
        ensure_positive(CATEGORY, "target", target)?;
        Ok(Self {
            target,
            ..Self::default()
        })
    }

    pub fn from_settings(settings: &Table) -> Result<Self, ConfigError> {
        let (common, specific) = parse_settings::<LengthSettings>(CATEGORY, settings)?;
        ensure_positive(CATEGORY, "target", specific.target)?;
        Ok(Self {
            base: FactorBase::from_common(common, CATEGORY, MESSAGE)?,
            target: specific.target,
        })
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Factor for LengthFactor {
    fn category(&self) -> &str {
        &self.base.category
    }

    fn test(&self, password: &str, _context: Option<&dyn Any>) -> Judgment {
        let length = password.chars().count() as f64;
        Judgment::new(asym(length, self.target, DEFAULT_SWITCH)).with_message(self.base.message.as_str())
    }

    fn adjustment(&self) -> Adjustment {
        self.base.adjustment
    }
}
