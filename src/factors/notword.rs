//! Common password factor - checks membership in the blacklist.

use std::any::Any;
use std::sync::Arc;

use toml::Table;

use super::{Adjustment, Factor, FactorBase, Judgment, NoSettings, parse_settings};
use crate::blacklist::Blacklist;
use crate::config::ConfigError;

pub const CATEGORY: &str = "notword";
const MESSAGE: &str = "Avoid using one of the ten thousand most common passwords";

/// Scores `0` for an exact blacklist hit and `1` otherwise.
#[derive(Debug, Clone)]
pub struct NotWordFactor {
    base: FactorBase,
    blacklist: Arc<Blacklist>,
}

impl NotWordFactor {
    pub fn new(blacklist: Arc<Blacklist>) -> Self {
        Self {
            base: FactorBase::new(CATEGORY, MESSAGE),
            blacklist,
        }
    }

    pub fn from_settings(blacklist: Arc<Blacklist>, settings: &Table) -> Result<Self, ConfigError> {
        let (common, _) = parse_settings::<NoSettings>(CATEGORY, settings)?;
        Ok(Self {
            base: FactorBase::from_common(common, CATEGORY, MESSAGE)?,
            blacklist,
        })
    }
}

impl Factor for NotWordFactor {
    fn category(&self) -> &str {
        &self.base.category
    }

    fn test(&self, password: &str, _context: Option<&dyn Any>) -> Judgment {
        if self.blacklist.contains(password) {
            return Judgment::new(0.0).with_message(self.base.message.as_str());
        }
        Judgment::new(1.0)
    }

    fn adjustment(&self) -> Adjustment {
        self.base.adjustment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor() -> NotWordFactor {
        NotWordFactor::new(Arc::new(Blacklist::from_words(["password", "123456", "qwerty"])))
    }

    #[test]
    fn test_notword_common_password() {
        let judgment = factor().test("password", None);
        assert_eq!(judgment.score, 0.0);
        assert!(judgment.message.unwrap().contains("common"));
    }

    #[test]
    fn test_notword_uncommon_password() {
        let judgment = factor().test("not0klsd@#$", None);
        assert_eq!(judgment, Judgment::new(1.0));
    }

    #[test]
    fn test_notword_is_case_sensitive() {
        assert_eq!(factor().test("PASSWORD", None).score, 1.0);
    }

    #[test]
    fn test_notword_empty_password() {
        assert_eq!(factor().test("", None).score, 1.0);
    }
}
