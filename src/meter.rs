//! Password strength meter - aggregation of factor judgments.

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use toml::Table;

#[cfg(feature = "async")]
use std::time::Duration;

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::blacklist::Blacklist;
use crate::config::{
    ConfigError, DEFAULT_PESSIMISM, DEFAULT_THRESHOLD, MeterConfig, validate_pessimism,
    validate_threshold,
};
use crate::diagnostics::{DiagnosticSink, FactorRecord};
use crate::evaluation::Evaluation;
use crate::factors::{
    Factor, LengthFactor, MixFactor, MixKind, NotWordFactor, PhraseFactor, VarietyFactor,
};
use crate::registry::FactorRegistry;
use crate::shape::curve;

/// Delay [`evaluate_tx`] waits before evaluating, so that a caller reacting
/// to keystrokes can cancel superseded requests.
#[cfg(feature = "async")]
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Combines a set of factors into a single strength score.
///
/// A meter is immutable once built; `evaluate` can be called from several
/// threads at once.
pub struct Meter {
    factors: Vec<Box<dyn Factor>>,
    threshold: f64,
    pessimism: f64,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl fmt::Debug for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meter")
            .field("factors", &self.categories().collect::<Vec<_>>())
            .field("threshold", &self.threshold)
            .field("pessimism", &self.pessimism)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Meter {
    pub fn builder() -> MeterBuilder {
        MeterBuilder::default()
    }

    /// Creates a meter with the six built-in factors and default parameters.
    pub fn with_defaults(blacklist: Arc<Blacklist>) -> Self {
        Self {
            factors: vec![
                Box::new(LengthFactor::default()) as Box<dyn Factor>,
                Box::new(MixFactor::new(MixKind::Charmix)),
                Box::new(VarietyFactor::default()),
                Box::new(MixFactor::new(MixKind::Casemix)),
                Box::new(NotWordFactor::new(blacklist)),
                Box::new(PhraseFactor::default()),
            ],
            threshold: DEFAULT_THRESHOLD,
            pessimism: DEFAULT_PESSIMISM,
            sink: None,
        }
    }

    /// Builds the meter described by `config`, resolving factor identifiers
    /// through `registry`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unknown factors, invalid settings or
    /// parameters, overrides that target no configured factor, and
    /// duplicate categories.
    pub fn from_config(config: &MeterConfig, registry: &FactorRegistry) -> Result<Self, ConfigError> {
        config.validate()?;

        let empty = Table::new();
        let mut builder = Self::builder()
            .threshold(config.threshold)
            .pessimism(config.pessimism);
        for id in &config.factors {
            let settings = config.overrides.get(id).unwrap_or(&empty);
            builder = builder.boxed_factor(registry.build(id, settings)?);
        }
        let meter = builder.build()?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Meter configured: factors {:?}, threshold {}, pessimism {}",
            config.factors,
            meter.threshold,
            meter.pessimism
        );

        Ok(meter)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn pessimism(&self) -> f64 {
        self.pessimism
    }

    /// Categories of the configured factors, in evaluation order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(|factor| factor.category())
    }

    /// Evaluates password strength.
    ///
    /// # Arguments
    /// * `password` - The password to evaluate
    /// * `context` - Passed unaltered to every factor
    pub fn evaluate(&self, password: &SecretString, context: Option<&dyn Any>) -> Evaluation {
        self.evaluate_str(password.expose_secret(), context)
    }

    /// Same as [`Meter::evaluate`] for a password held as a plain string.
    pub fn evaluate_str(&self, password: &str, context: Option<&dyn Any>) -> Evaluation {
        let mut total_score = 0.0;
        let mut total_weight = 0.0;
        let mut candidates = Vec::new();

        for factor in &self.factors {
            let judgment = factor.test(password, context);
            let adjustment = factor.adjustment();
            let adjusted = adjustment.apply(judgment.score);
            let confidence = curve(adjusted, self.pessimism);

            let weight = adjustment.weight * confidence;
            total_score += adjusted * weight;
            total_weight += weight;

            if let Some(sink) = &self.sink {
                sink.record(&FactorRecord {
                    category: factor.category(),
                    raw_score: judgment.score,
                    adjusted_score: adjusted,
                    static_weight: adjustment.weight,
                    confidence_weight: confidence,
                });
            }

            if let Some(message) = judgment.message.filter(|m| !m.is_empty()) {
                candidates.push((adjusted, factor.category(), message));
            }
        }

        assert!(
            total_weight > 0.0 && total_weight.is_finite(),
            "meter total weight must be positive and finite, got {total_weight}"
        );
        let score = (total_score / total_weight).clamp(0.0, 1.0);

        let mut improvements = BTreeMap::new();
        if score < 1.0 {
            for (adjusted, category, message) in candidates {
                if adjusted < self.threshold {
                    improvements.insert(category.to_string(), message);
                }
            }
        }

        Evaluation {
            score,
            improvements,
        }
    }
}

/// Programmatic construction of a [`Meter`].
pub struct MeterBuilder {
    factors: Vec<Box<dyn Factor>>,
    threshold: f64,
    pessimism: f64,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Default for MeterBuilder {
    fn default() -> Self {
        Self {
            factors: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            pessimism: DEFAULT_PESSIMISM,
            sink: None,
        }
    }
}

impl MeterBuilder {
    pub fn factor<F: Factor + 'static>(self, factor: F) -> Self {
        self.boxed_factor(Box::new(factor))
    }

    pub fn boxed_factor(mut self, factor: Box<dyn Factor>) -> Self {
        self.factors.push(factor);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn pessimism(mut self, pessimism: f64) -> Self {
        self.pessimism = pessimism;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// # Errors
    ///
    /// Returns a `ConfigError` if no factor was added, two factors share a
    /// category, or threshold or pessimism are out of range.
    pub fn build(self) -> Result<Meter, ConfigError> {
        validate_threshold(self.threshold)?;
        validate_pessimism(self.pessimism)?;
        if self.factors.is_empty() {
            return Err(ConfigError::NoFactors);
        }
        let mut seen = HashSet::new();
        for factor in &self.factors {
            factor.adjustment().validate()?;
            if !seen.insert(factor.category()) {
                return Err(ConfigError::DuplicateCategory(factor.category().to_string()));
            }
        }

        // worst case of the aggregate's running sums
        let (weights, peak_weights) = self.factors.iter().fold((0.0, 0.0), |(sum, peak), factor| {
            let adjustment = factor.adjustment();
            (
                sum + adjustment.weight,
                peak + adjustment.weight * curve(adjustment.clip_min, self.pessimism),
            )
        });
        if !weights.is_finite() || !peak_weights.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "factor weights overflow at pessimism {}",
                self.pessimism
            )));
        }
        Ok(Meter {
            factors: self.factors,
            threshold: self.threshold,
            pessimism: self.pessimism,
            sink: self.sink,
        })
    }
}

/// Async version that sends the evaluation via channel.
///
/// Waits [`DEBOUNCE`] first; if `token` is cancelled in the meantime nothing
/// is evaluated or sent. `context` reaches the factors as with
/// [`Meter::evaluate`].
#[cfg(feature = "async")]
pub async fn evaluate_tx(
    meter: &Meter,
    password: &SecretString,
    context: Option<&(dyn Any + Sync)>,
    token: CancellationToken,
    tx: mpsc::Sender<Evaluation>,
) {
    #[cfg(feature = "tracing")]
    tracing::info!("evaluation is about to start...");

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            #[cfg(feature = "tracing")]
            tracing::info!("evaluation cancelled");
            return;
        }
        _ = tokio::time::sleep(DEBOUNCE) => {}
    }

    let evaluation = meter.evaluate(password, context.map(|c| c as &dyn Any));

    if let Err(e) = tx.send(evaluation).await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to send password evaluation result: {}", e);
        #[cfg(not(feature = "tracing"))]
        let _ = e;
    }
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;

    fn meter() -> Meter {
        Meter::with_defaults(Arc::new(Blacklist::from_words(["password"])))
    }

    /// Scores zero when the password equals the context string.
    struct MatchesContext;

    impl Factor for MatchesContext {
        fn category(&self) -> &str {
            "context"
        }

        fn test(&self, password: &str, context: Option<&dyn Any>) -> crate::factors::Judgment {
            let matches = context
                .and_then(|c| c.downcast_ref::<String>())
                .is_some_and(|value| value == password);
            if matches {
                crate::factors::Judgment::new(0.0).with_message("Do not reuse the account name")
            } else {
                crate::factors::Judgment::new(1.0)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_tx_sends_evaluation() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let pwd = SecretString::new("TestPass123!".to_string().into());

        evaluate_tx(&meter(), &pwd, None, token, tx).await;

        let evaluation = rx.recv().await.expect("Should receive evaluation");
        assert!(evaluation.score > 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_tx_cancelled() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();
        let pwd = SecretString::new("TestPass123!".to_string().into());

        evaluate_tx(&meter(), &pwd, None, token, tx).await;

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_tx_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let pwd = SecretString::new("TestPass123!".to_string().into());

        evaluate_tx(&meter(), &pwd, None, CancellationToken::new(), tx).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_tx_forwards_context() {
        let meter = Meter::builder().factor(MatchesContext).build().unwrap();
        let pwd = SecretString::new("alice".to_string().into());
        let account = "alice".to_string();

        let (tx, mut rx) = mpsc::channel(1);
        evaluate_tx(&meter, &pwd, Some(&account), CancellationToken::new(), tx).await;
        let evaluation = rx.recv().await.expect("Should receive evaluation");
        assert_eq!(evaluation.score, 0.0);
        assert!(evaluation.improvements.contains_key("context"));
        assert_eq!(evaluation, meter.evaluate(&pwd, Some(&account as &dyn Any)));

        let (tx, mut rx) = mpsc::channel(1);
        evaluate_tx(&meter, &pwd, None, CancellationToken::new(), tx).await;
        let evaluation = rx.recv().await.expect("Should receive evaluation");
        assert_eq!(evaluation.score, 1.0);
    }
}
