//! Evaluation result and its human readable rating.

use std::collections::BTreeMap;
use std::fmt;

use pwd_types::{PasswordEvaluation, PasswordScore};

/// Default minimum score for a password to be accepted.
pub const DEFAULT_MINIMUM: f64 = 0.75;

/// Outcome of [`Meter::evaluate`](crate::Meter::evaluate).
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Strength in `[0, 1]`, from very weak to very strong.
    pub score: f64,
    /// Improvement messages keyed by factor category.
    pub improvements: BTreeMap<String, String>,
}

impl Evaluation {
    pub fn rating(&self) -> Rating {
        Rating::from_score(self.score)
    }

    pub fn is_acceptable(&self, minimum: f64) -> bool {
        self.score >= minimum
    }
}

/// Seven equally wide bands over the score range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    InfinitelyWeak,
    ExtremelyWeak,
    VeryWeak,
    Weak,
    ModeratelyStrong,
    Strong,
    VeryStrong,
}

impl Rating {
    pub const ALL: [Rating; 7] = [
        Rating::InfinitelyWeak,
        Rating::ExtremelyWeak,
        Rating::VeryWeak,
        Rating::Weak,
        Rating::ModeratelyStrong,
        Rating::Strong,
        Rating::VeryStrong,
    ];

    /// Band containing `score`; out of range scores land on the nearest end.
    pub fn from_score(score: f64) -> Self {
        let bands = Self::ALL.len();
        // `as` saturates negatives and NaN to zero
        let index = ((score * bands as f64) as usize).min(bands - 1);
        Self::ALL[index]
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::InfinitelyWeak => "Infinitely weak",
            Rating::ExtremelyWeak => "Extremely weak",
            Rating::VeryWeak => "Very weak",
            Rating::Weak => "Weak",
            Rating::ModeratelyStrong => "Moderately strong",
            Rating::Strong => "Strong",
            Rating::VeryStrong => "Very strong",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&Evaluation> for PasswordEvaluation {
    /// Scales the score to `0..=100` and reports the improvement messages as
    /// reasons.
    fn from(evaluation: &Evaluation) -> Self {
        let score = (evaluation.score.clamp(0.0, 1.0) * 100.0).round() as i64;
        PasswordEvaluation {
            score: Some(PasswordScore::new(score)),
            reasons: evaluation.improvements.values().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwd_types::PasswordStrength;

    fn evaluation(score: f64, improvements: &[(&str, &str)]) -> Evaluation {
        Evaluation {
            score,
            improvements: improvements
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(Rating::from_score(0.0), Rating::InfinitelyWeak);
        assert_eq!(Rating::from_score(0.13), Rating::InfinitelyWeak);
        assert_eq!(Rating::from_score(0.15), Rating::ExtremelyWeak);
        assert_eq!(Rating::from_score(0.5), Rating::Weak);
        assert_eq!(Rating::from_score(0.9), Rating::VeryStrong);
        assert_eq!(Rating::from_score(1.0), Rating::VeryStrong);
    }

    #[test]
    fn test_rating_out_of_range() {
        assert_eq!(Rating::from_score(-1.0), Rating::InfinitelyWeak);
        assert_eq!(Rating::from_score(f64::NAN), Rating::InfinitelyWeak);
        assert_eq!(Rating::from_score(7.0), Rating::VeryStrong);
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::ModeratelyStrong.to_string(), "Moderately strong");
        assert_eq!(evaluation(0.95, &[]).rating().to_string(), "Very strong");
    }

    #[test]
    fn test_is_acceptable() {
        assert!(evaluation(0.75, &[]).is_acceptable(DEFAULT_MINIMUM));
        assert!(!evaluation(0.74, &[]).is_acceptable(DEFAULT_MINIMUM));
    }

    #[test]
    fn test_into_password_evaluation_weak() {
        let weak = evaluation(0.13, &[("notword", "Avoid common passwords")]);
        let converted = PasswordEvaluation::from(&weak);
        assert_eq!(converted.strength(), PasswordStrength::WEAK);
        assert_eq!(converted.reasons, vec!["Avoid common passwords".to_string()]);
    }

    #[test]
    fn test_into_password_evaluation_strong() {
        let converted = PasswordEvaluation::from(&evaluation(1.0, &[]));
        assert!(matches!(
            converted.strength(),
            PasswordStrength::STRONG | PasswordStrength::EPIC | PasswordStrength::GOD
        ));
        assert!(converted.reasons.is_empty());
    }
}
