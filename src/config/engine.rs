//! Dialogue engine configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::treatment::DEFAULT_MAX_SIGNAL_ITERATIONS;

use super::error::ValidationError;

/// Upper bound accepted for `max_signal_iterations`.
const SIGNAL_LIMIT_CEILING: usize = 50;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How many internal signals one turn may chain before it is
    /// treated as a misconfigured flow
    #[serde(default = "default_max_signal_iterations")]
    pub max_signal_iterations: usize,

    /// Seconds a session may sit untouched before it is dropped from
    /// memory. The store keeps it; the next turn reloads it.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_signal_iterations == 0 || self.max_signal_iterations > SIGNAL_LIMIT_CEILING {
            return Err(ValidationError::InvalidSignalLimit(SIGNAL_LIMIT_CEILING));
        }
        if self.session_idle_secs == 0 {
            return Err(ValidationError::InvalidIdleTimeout);
        }
        Ok(())
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_signal_iterations: default_max_signal_iterations(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_max_signal_iterations() -> usize {
    DEFAULT_MAX_SIGNAL_ITERATIONS
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_iterations() {
        assert_eq!(EngineConfig::default().max_signal_iterations, 5);
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn idle_timeout_defaults_to_half_an_hour_and_must_be_positive() {
        assert_eq!(
            EngineConfig::default().session_idle_timeout(),
            Duration::from_secs(1800)
        );
        let config = EngineConfig {
            session_idle_secs: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidIdleTimeout));
    }

    #[test]
    fn rejects_zero_and_absurd_limits() {
        for max_signal_iterations in [0, 51] {
            let config = EngineConfig {
                max_signal_iterations,
                ..EngineConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::InvalidSignalLimit(_))
            ));
        }
    }
}
