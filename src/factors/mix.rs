//! Character mixture factors - balance between character classes.

use std::any::Any;

use toml::Table;

use super::{Adjustment, Factor, FactorBase, Judgment, NoSettings, parse_settings};
use crate::config::ConfigError;
use crate::shape::{DEFAULT_SWITCH, asym, curve_average};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Letter,
    Digit,
    Symbol,
    Lower,
    Upper,
}

impl CharClass {
    fn matches(self, c: char) -> bool {
        match self {
            CharClass::Letter => c.is_ascii_alphabetic(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Symbol => !c.is_ascii_alphanumeric(),
            CharClass::Lower => c.is_ascii_lowercase(),
            CharClass::Upper => c.is_ascii_uppercase(),
        }
    }
}

/// Which set of character classes a [`MixFactor`] balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixKind {
    /// Letters, digits and symbols.
    Charmix,
    /// Lower and upper case letters.
    Casemix,
}

impl MixKind {
    pub fn category(self) -> &'static str {
        match self {
            MixKind::Charmix => "charmix",
            MixKind::Casemix => "casemix",
        }
    }

    fn message(self) -> &'static str {
        match self {
            MixKind::Charmix => "Use a good mix of numbers, letters, and symbols",
            MixKind::Casemix => "Use a good mix of UPPER case and lower case letters",
        }
    }

    fn classes(self) -> &'static [CharClass] {
        match self {
            MixKind::Charmix => &[CharClass::Letter, CharClass::Digit, CharClass::Symbol],
            MixKind::Casemix => &[CharClass::Lower, CharClass::Upper],
        }
    }
}

/// Rewards passwords whose characters are spread across several classes.
///
/// Each class is scored against a quarter of the mean class count (at least
/// one), and the per-class scores are combined pessimistically.
#[derive(Debug, Clone, PartialEq)]
pub struct MixFactor {
    base: FactorBase,
    kind: MixKind,
}

impl MixFactor {
    pub fn new(kind: MixKind) -> Self {
        Self {
            base: FactorBase::new(kind.category(), kind.message()),
            kind,
        }
    }

    pub fn from_settings(kind: MixKind, settings: &Table) -> Result<Self, ConfigError> {
        let (common, _) = parse_settings::<NoSettings>(kind.category(), settings)?;
        Ok(Self {
            base: FactorBase::from_common(common, kind.category(), kind.message())?,
            kind,
        })
    }

    pub fn kind(&self) -> MixKind {
        self.kind
    }
}

fn mix_score(password: &str, classes: &[CharClass]) -> f64 {
    let counts: Vec<f64> = classes
        .iter()
        .map(|class| password.chars().filter(|&c| class.matches(c)).count() as f64)
        .collect();
    let mean = counts.iter().sum::<f64>() / counts.len().max(1) as f64;
    let target = (0.25 * mean).max(1.0);
    let scores: Vec<f64> = counts
        .iter()
        .map(|&count| asym(count, target, DEFAULT_SWITCH) / DEFAULT_SWITCH)
        .collect();
    curve_average(&scores)
}

impl Factor for MixFactor {
    fn category(&self) -> &str {
        &self.base.category
    }

    fn test(&self, password: &str, _context: Option<&dyn Any>) -> Judgment {
        Judgment::new(mix_score(password, self.kind.classes()))
            .with_message(self.base.message.as_str())
    }

    fn adjustment(&self) -> Adjustment {
        self.base.adjustment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charmix_single_class_is_poor() {
        let factor = MixFactor::new(MixKind::Charmix);
        let judgment = factor.test("password", None);
        assert!(judgment.score < 0.1, "got {}", judgment.score);
        assert!(judgment.message.unwrap().contains("numbers"));
    }

    #[test]
    fn test_charmix_all_classes_is_good() {
        let factor = MixFactor::new(MixKind::Charmix);
        let judgment = factor.test("p$$4wr0d!", None);
        assert!(judgment.score > 1.0, "got {}", judgment.score);
    }

    #[test]
    fn test_charmix_empty_password() {
        let judgment = MixFactor::new(MixKind::Charmix).test("", None);
        assert_eq!(judgment.score, 0.0);
    }

    #[test]
    fn test_charmix_non_ascii_counts_as_symbol() {
        let factor = MixFactor::new(MixKind::Charmix);
        assert!(factor.test("abc1é", None).score > factor.test("abc1", None).score);
    }

    #[test]
    fn test_casemix_rewards_both_cases() {
        let factor = MixFactor::new(MixKind::Casemix);
        let lower = factor.test("p$$4wr0d!", None).score;
        let mixed = factor.test("p$$4WR0d!", None).score;
        assert!(lower < 0.1);
        assert!(mixed > 1.0);
        assert_eq!(factor.category(), "casemix");
    }

    #[test]
    fn test_mix_from_settings_rejects_unknown_key() {
        let settings: Table = toml::from_str("target = 3").unwrap();
        assert!(matches!(
            MixFactor::from_settings(MixKind::Casemix, &settings),
            Err(ConfigError::Settings { .. })
        ));
    }
}
