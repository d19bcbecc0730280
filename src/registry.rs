//! Factor registry - maps factor identifiers to factories.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use toml::Table;

use crate::blacklist::Blacklist;
use crate::config::ConfigError;
use crate::factors::{
    Factor, LengthFactor, MixFactor, MixKind, NotWordFactor, PhraseFactor, VarietyFactor,
};

/// Builds a factor from its settings table.
pub type FactorFactory =
    Box<dyn Fn(&Table) -> Result<Box<dyn Factor>, ConfigError> + Send + Sync>;

fn boxed<F: Factor + 'static>(factor: F) -> Box<dyn Factor> {
    Box::new(factor)
}

/// Known factor identifiers and how to build each of them.
///
/// External factors are registered under any identifier the caller chooses,
/// typically a fully qualified name such as `myapp::NotUsername`, before
/// meters are built from configuration.
#[derive(Default)]
pub struct FactorRegistry {
    factories: BTreeMap<String, FactorFactory>,
}

impl FactorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the six built-in factors.
    ///
    /// `notword` checks against `blacklist`, shared by every factor built
    /// from this registry.
    pub fn with_builtins(blacklist: Arc<Blacklist>) -> Self {
        let mut registry = Self::new();
        registry
            .register("length", |settings| {
                LengthFactor::from_settings(settings).map(boxed)
            })
            .register("charmix", |settings| {
                MixFactor::from_settings(MixKind::Charmix, settings).map(boxed)
            })
            .register("casemix", |settings| {
                MixFactor::from_settings(MixKind::Casemix, settings).map(boxed)
            })
            .register("variety", |settings| {
                VarietyFactor::from_settings(settings).map(boxed)
            })
            .register("notword", move |settings| {
                NotWordFactor::from_settings(Arc::clone(&blacklist), settings).map(boxed)
            })
            .register("phrase", |settings| {
                PhraseFactor::from_settings(settings).map(boxed)
            });
        registry
    }

    /// Registers `factory` under `id`, replacing any previous entry.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Table) -> Result<Box<dyn Factor>, ConfigError> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds the factor registered as `id`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownFactor` if nothing is registered under
    /// `id`, or whatever error the factory reports for `settings`.
    pub fn build(&self, id: &str, settings: &Table) -> Result<Box<dyn Factor>, ConfigError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| ConfigError::UnknownFactor(id.to_string()))?;
        factory(settings)
    }
}

impl fmt::Debug for FactorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorRegistry")
            .field("factors", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
