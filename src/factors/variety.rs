//! Variety factor - penalizes duplicated and repeated characters.

use std::any::Any;
use std::collections::HashSet;

use toml::Table;

use super::{Adjustment, Factor, FactorBase, Judgment, NoSettings, parse_settings};
use crate::config::ConfigError;
use crate::shape::curve_average;

pub const CATEGORY: &str = "variety";
const MESSAGE: &str = "Minimize character duplicates and repetitions";

/// Combines the share of distinct characters with how often adjacent
/// characters repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct VarietyFactor {
    base: FactorBase,
}

impl Default for VarietyFactor {
    fn default() -> Self {
        Self {
            base: FactorBase::new(CATEGORY, MESSAGE),
        }
    }
}

impl VarietyFactor {
    pub fn from_settings(settings: &Table) -> Result<Self, ConfigError> {
        let (common, _) = parse_settings::<NoSettings>(CATEGORY, settings)?;
        Ok(Self {
            base: FactorBase::from_common(common, CATEGORY, MESSAGE)?,
        })
    }
}

fn variety_score(password: &str) -> f64 {
    let chars: Vec<char> = password.chars().collect();
    let distinct: HashSet<char> = chars.iter().copied().collect();

    // diff is seeded with one so a single character counts as varied
    let (diff, same) = chars.windows(2).fold((1.0_f64, 0.0_f64), |(diff, same), pair| {
        if pair[0] == pair[1] {
            (diff, same + 1.0)
        } else {
            (diff + 1.0, same)
        }
    });

    let uniqueness = distinct.len() as f64 / chars.len().max(1) as f64;
    let repetition = diff / (diff + same.powf(1.5));
    curve_average(&[uniqueness, repetition])
}

impl Factor for VarietyFactor {
    fn category(&self) -> &str {
        &self.base.category
    }

    fn test(&self, password: &str, _context: Option<&dyn Any>) -> Judgment {
        Judgment::new(variety_score(password)).with_message(self.base.message.as_str())
    }

    fn adjustment(&self) -> Adjustment {
        self.base.adjustment
    }
}
