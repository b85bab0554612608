//! Validation fallback configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Optional remote validation for input the scripted rules find unclear.
/// Disabled unless an endpoint is set.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationFallbackConfig {
    pub endpoint: Option<String>,

    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ValidationFallbackConfig {
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ValidationError::InvalidFallbackUrl);
            }
        }
        if self.timeout_ms == 0 || self.timeout_ms > 30_000 {
            return Err(ValidationError::InvalidFallbackTimeout);
        }
        Ok(())
    }
}

impl Default for ValidationFallbackConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    3_000
}
