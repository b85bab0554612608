//! Settings for the treatment service, read from `TREATMENT_ENGINE__*`
//! environment variables (and a `.env` file during development).
//!
//! Sections nest with `__`, so `TREATMENT_ENGINE__PERSISTENCE__BACKEND=file`
//! sets `persistence.backend`. Every field has a default; an empty
//! environment gives an in-memory server on port 8080.

mod engine;
mod error;
mod persistence;
mod server;
mod validation;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use persistence::{PersistenceBackend, PersistenceConfig};
pub use server::{Environment, ServerConfig};
pub use validation::ValidationFallbackConfig;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Unset endpoint disables the remote fallback.
    #[serde(default)]
    pub validation: ValidationFallbackConfig,
}

impl AppConfig {
    /// Reads `.env` if present, then the process environment.
    ///
    /// Fails only when a variable cannot be parsed into its field's type;
    /// range checks are left to [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // Logging is not up yet, so a missing or unreadable file is silent.
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TREATMENT_ENGINE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Checks every section, stopping at the first bad value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.engine.validate()?;
        self.persistence.validate()?;
        self.validation.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Process environment is shared by every test thread.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "TREATMENT_ENGINE__SERVER__PORT",
        "TREATMENT_ENGINE__SERVER__ENVIRONMENT",
        "TREATMENT_ENGINE__ENGINE__MAX_SIGNAL_ITERATIONS",
        "TREATMENT_ENGINE__PERSISTENCE__BACKEND",
        "TREATMENT_ENGINE__PERSISTENCE__DATA_DIR",
        "TREATMENT_ENGINE__VALIDATION__ENDPOINT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn empty_environment_gives_runnable_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.max_signal_iterations, 5);
        assert_eq!(config.persistence.backend, PersistenceBackend::Memory);
        assert!(!config.validation.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_sections_read_double_underscore_keys() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TREATMENT_ENGINE__SERVER__PORT", "3000");
        env::set_var("TREATMENT_ENGINE__ENGINE__MAX_SIGNAL_ITERATIONS", "8");
        env::set_var("TREATMENT_ENGINE__PERSISTENCE__BACKEND", "file");
        env::set_var("TREATMENT_ENGINE__PERSISTENCE__DATA_DIR", "/var/lib/treatment");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.max_signal_iterations, 8);
        assert_eq!(config.persistence.backend, PersistenceBackend::File);
        assert_eq!(config.persistence.data_dir, "/var/lib/treatment");
    }

    #[test]
    fn production_environment_is_detected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TREATMENT_ENGINE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn fallback_endpoint_without_scheme_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TREATMENT_ENGINE__VALIDATION__ENDPOINT", "classifier:9000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidFallbackUrl));
    }
}
