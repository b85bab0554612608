//! Persistence configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which store backs the engine
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    #[default]
    Memory,
    File,
    Postgres,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: PersistenceBackend,

    /// Root directory of the file backend
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// PostgreSQL connection URL (postgres backend only)
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Run migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,

    /// Attempts per background write, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay before the first retry; doubles each time
    #[serde(default = "default_retry_base_backoff")]
    pub retry_base_backoff_ms: u64,
}

impl PersistenceConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn retry_base_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_base_backoff_ms)
    }

    /// Validate persistence configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.backend {
            PersistenceBackend::Memory => {}
            PersistenceBackend::File => {
                if self.data_dir.trim().is_empty() {
                    return Err(ValidationError::MissingRequired("PERSISTENCE__DATA_DIR"));
                }
            }
            PersistenceBackend::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .ok_or(ValidationError::MissingRequired("PERSISTENCE__DATABASE_URL"))?;
                if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                    return Err(ValidationError::InvalidDatabaseUrl);
                }
                if self.max_connections == 0 || self.max_connections > 100 {
                    return Err(ValidationError::InvalidPoolSize);
                }
            }
        }
        if self.retry_attempts == 0 || self.retry_attempts > 10 {
            return Err(ValidationError::InvalidRetryAttempts);
        }
        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            data_dir: default_data_dir(),
            database_url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: default_run_migrations(),
            retry_attempts: default_retry_attempts(),
            retry_base_backoff_ms: default_retry_base_backoff(),
        }
    }
}

fn default_data_dir() -> String {
    "./data/treatment".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_run_migrations() -> bool {
    true
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_backoff() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_memory_with_three_attempts() {
        let config = PersistenceConfig::default();
        assert_eq!(config.backend, PersistenceBackend::Memory);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_base_backoff(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn postgres_requires_url() {
        let config = PersistenceConfig {
            backend: PersistenceBackend::Postgres,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("PERSISTENCE__DATABASE_URL"))
        );
    }

    #[test]
    fn postgres_rejects_foreign_scheme() {
        let config = PersistenceConfig {
            backend: PersistenceBackend::Postgres,
            database_url: Some("mysql://localhost/test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDatabaseUrl));
    }

    #[test]
    fn postgres_pool_is_bounded() {
        let config = PersistenceConfig {
            backend: PersistenceBackend::Postgres,
            database_url: Some("postgresql://localhost/treatment".to_string()),
            max_connections: 150,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPoolSize));
    }

    #[test]
    fn file_backend_needs_directory() {
        let config = PersistenceConfig {
            backend: PersistenceBackend::File,
            data_dir: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn retry_attempts_are_bounded() {
        let config = PersistenceConfig {
            retry_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRetryAttempts));
    }
}
