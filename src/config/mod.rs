//! Engine configuration module
//!
//! Engine settings come from the process environment (plus an optional `.env`
//! file). Keys carry the `RPG_STATS` prefix and sections are joined with
//! double underscores, so `RPG_STATS__EVALUATION__MAX_BOUND=16` sets
//! `evaluation.max_bound`.
//!
//! # Example
//!
//! ```no_run
//! use rpg_stat_calculator::config::EngineConfig;
//!
//! let config = EngineConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let _ = config.logging.init_tracing();
//! println!("Outcome ceiling: {}", config.evaluation.max_outcomes);
//! ```

mod error;
mod evaluation;
mod logging;

pub use error::{ConfigError, LoggingError, ValidationError};
pub use evaluation::EvaluationConfig;
pub use logging::{LogFormat, LoggingConfig};

use serde::Deserialize;

/// Root engine configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration. Load using [`EngineConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Evaluator ceilings and reuse switches
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Tracing subscriber settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Reads `.env` when present, then every `RPG_STATS__*` variable.
    ///
    /// Unset keys fall back to section defaults.
    ///
    /// - `RPG_STATS__EVALUATION__MAX_OUTCOMES=50000` -> `evaluation.max_outcomes = 50000`
    /// - `RPG_STATS__LOGGING__FORMAT=json` -> `logging.format = json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("RPG_STATS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section, stopping at the first invalid value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.evaluation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
