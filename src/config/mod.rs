//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `PLAN_COMPASS` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use plan_compass::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod dialogue;
mod error;
mod nlu;
mod search;
mod server;

pub use dialogue::{CompletionPolicy, DialogueConfig};
pub use error::{ConfigError, ValidationError};
pub use nlu::NluConfig;
pub use search::SearchConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Language-model provider configuration
    #[serde(default)]
    pub nlu: NluConfig,

    /// Web-search provider configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Dialogue engine configuration (catalog path, session TTL)
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `PLAN_COMPASS` prefix, using `__` to separate nested
    /// values:
    ///
    /// - `PLAN_COMPASS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PLAN_COMPASS__NLU__API_KEY=...` -> `nlu.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PLAN_COMPASS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.nlu.validate()?;
        self.search.validate()?;
        self.dialogue.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
