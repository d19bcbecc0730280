//! Phrase factor - bonus for multi-word passphrases.

use std::any::Any;

use serde::Deserialize;
use toml::Table;

use super::{Adjustment, Factor, FactorBase, Judgment, ensure_positive, parse_settings};
use crate::config::ConfigError;
use crate::shape::asym;

pub const CATEGORY: &str = "phrase";
pub const DEFAULT_BASE: f64 = 0.65;
pub const DEFAULT_WORD_TARGET: f64 = 4.0;
pub const DEFAULT_SPREAD_TARGET: f64 = 4.0;
const MESSAGE: &str = "Passphrases (e.g. an obfuscated sentence) are better than passwords";

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PhraseSettings {
    base: f64,
    word_target: f64,
    spread_target: f64,
}

impl Default for PhraseSettings {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            word_target: DEFAULT_WORD_TARGET,
            spread_target: DEFAULT_SPREAD_TARGET,
        }
    }
}

/// Rewards several whitespace-separated words of differing lengths.
///
/// A single word, or words all of one length, score `base`. Otherwise the
/// word count and the spread between the longest and shortest word lift the
/// score towards `2 * base`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseFactor {
    base: FactorBase,
    confidence: f64,
    word_target: f64,
    spread_target: f64,
}

impl Default for PhraseFactor {
    fn default() -> Self {
        Self {
            base: FactorBase::new(CATEGORY, MESSAGE),
            confidence: DEFAULT_BASE,
            word_target: DEFAULT_WORD_TARGET,
            spread_target: DEFAULT_SPREAD_TARGET,
        }
    }
}

impl PhraseFactor {
    pub fn from_settings(settings: &Table) -> Result<Self, ConfigError> {
        let (common, specific) = parse_settings::<PhraseSettings>(CATEGORY, settings)?;
        if !(specific.base > 0.0 && specific.base < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "{CATEGORY}: base must lie in (0, 1), got {}",
                specific.base
            )));
        }
        ensure_positive(CATEGORY, "word_target", specific.word_target)?;
        ensure_positive(CATEGORY, "spread_target", specific.spread_target)?;
        Ok(Self {
            base: FactorBase::from_common(common, CATEGORY, MESSAGE)?,
            confidence: specific.base,
            word_target: specific.word_target,
            spread_target: specific.spread_target,
        })
    }

    fn score(&self, password: &str) -> f64 {
        let lengths: Vec<usize> = password
            .split_whitespace()
            .map(|word| word.chars().count())
            .collect();
        let (Some(&longest), Some(&shortest)) = (lengths.iter().max(), lengths.iter().min()) else {
            return 0.0;
        };

        let spread = longest - shortest;
        if spread == 0 {
            return self.confidence;
        }
        let words = asym(lengths.len() as f64, self.word_target, self.confidence);
        let variation = asym(spread as f64, self.spread_target, self.confidence);
        self.confidence * (1.0 + words * variation)
    }
}

impl Factor for PhraseFactor {
    fn category(&self) -> &str {
        &self.base.category
    }

    fn test(&self, password: &str, _context: Option<&dyn Any>) -> Judgment {
        Judgment::new(self.score(password)).with_message(self.base.message.as_str())
    }

    fn adjustment(&self) -> Adjustment {
        self.base.adjustment
    }
}
