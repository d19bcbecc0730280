//! Per-factor diagnostic records.
//!
//! A meter configured with a [`DiagnosticSink`] reports every factor it
//! evaluates. Records never contain the password and have no effect on the
//! evaluation result.

/// What one factor contributed to one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorRecord<'a> {
    pub category: &'a str,
    pub raw_score: f64,
    pub adjusted_score: f64,
    pub static_weight: f64,
    pub confidence_weight: f64,
}

/// Observer for factor records.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: &FactorRecord<'_>);
}

/// Emits each record as a `tracing` debug event.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl DiagnosticSink for TracingSink {
    fn record(&self, record: &FactorRecord<'_>) {
        tracing::debug!(
            category = record.category,
            raw_score = record.raw_score,
            adjusted_score = record.adjusted_score,
            static_weight = record.static_weight,
            confidence_weight = record.confidence_weight,
            "password factor evaluated"
        );
    }
}

#[cfg(all(test, feature = "tracing"))]
mod tests {
    use super::*;
    use crate::Meter;
    use crate::factors::{LengthFactor, MixFactor, MixKind};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn meter(sink: Option<Arc<dyn DiagnosticSink>>) -> Meter {
        let mut builder = Meter::builder()
            .factor(LengthFactor::default())
            .factor(MixFactor::new(MixKind::Charmix));
        if let Some(sink) = sink {
            builder = builder.sink(sink);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_tracing_sink_records_directly() {
        TracingSink.record(&FactorRecord {
            category: "length",
            raw_score: 0.5,
            adjusted_score: 0.5,
            static_weight: 1.0,
            confidence_weight: 1.0 / 0.6,
        });
    }

    #[test]
    fn test_tracing_sink_leaves_evaluation_unchanged() {
        let traced = meter(Some(Arc::new(TracingSink)));
        let plain = meter(None);
        for pwd in ["", "abc", "Tr0ub4dor&3"] {
            let password = SecretString::new(pwd.to_string().into());
            assert_eq!(traced.evaluate(&password, None), plain.evaluate(&password, None));
        }
    }
}
