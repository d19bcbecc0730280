//! Password strength meter library
//!
//! This library estimates password strength as a score in `[0, 1]` and
//! suggests improvements. Independent factors each judge one property of
//! the password; the meter combines their judgments with a confidence
//! weighting that lets a single severe weakness dominate the result.
//!
//! # Features
//!
//! - `async` (default): Enables debounced async evaluation with cancellation support
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_BLACKLIST_PATH`: Custom path to the common password file
//!   (default: `./assets/blacklist.txt`)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pwd_meter::{Blacklist, Meter};
//! use secrecy::SecretString;
//!
//! // Usually loaded once at startup with `init_blacklist()`
//! let blacklist = Arc::new(Blacklist::from_words(["password", "123456"]));
//! let meter = Meter::with_defaults(blacklist);
//!
//! let password = SecretString::new("mY voiC3 !s m-y p$$4WR0d!".to_string().into());
//! let evaluation = meter.evaluate(&password, None);
//!
//! assert!(evaluation.score > 0.9);
//! println!("Strength: {} ({})", evaluation.score, evaluation.rating());
//! for message in evaluation.improvements.values() {
//!     println!("  - {message}");
//! }
//! ```

// Re-export types from pwd-types for convenience
pub use pwd_types::{PasswordEvaluation, PasswordScore, PasswordStrength};

mod blacklist;
mod config;
mod diagnostics;
mod evaluation;
mod meter;
mod registry;

pub mod factors;
pub mod shape;

// Public API
pub use blacklist::{
    BLACKLIST_PATH_ENV, Blacklist, BlacklistError, DEFAULT_BLACKLIST_PATH, get_blacklist_path,
    init_blacklist, shared_blacklist,
};
pub use config::{ConfigError, DEFAULT_FACTORS, DEFAULT_PESSIMISM, DEFAULT_THRESHOLD, MeterConfig};
pub use diagnostics::{DiagnosticSink, FactorRecord};
pub use evaluation::{DEFAULT_MINIMUM, Evaluation, Rating};
pub use factors::{Adjustment, CommonSettings, Factor, Judgment};
pub use meter::{Meter, MeterBuilder};
pub use registry::{FactorFactory, FactorRegistry};

#[cfg(feature = "tracing")]
pub use diagnostics::TracingSink;

#[cfg(feature = "async")]
pub use meter::{DEBOUNCE, evaluate_tx};
