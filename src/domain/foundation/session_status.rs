//! Lifecycle of a treatment session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Sessions are never deleted; a finished session stays `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Complete,
}

impl SessionStatus {
    /// Returns true if the session still accepts turns.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// The status after finishing. Only an active session can finish.
    pub fn finish(self) -> Result<Self, ValidationError> {
        match self {
            SessionStatus::Active => Ok(SessionStatus::Complete),
            SessionStatus::Complete => Err(ValidationError::invalid_format(
                "status",
                "session is already complete",
            )),
        }
    }

    /// Storage and wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "complete" => Ok(SessionStatus::Complete),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown session status '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sessions_are_active() {
        assert!(SessionStatus::default().is_active());
    }

    #[test]
    fn active_finishes_once() {
        let done = SessionStatus::Active.finish().unwrap();
        assert_eq!(done, SessionStatus::Complete);
        assert!(done.finish().is_err());
    }

    #[test]
    fn string_form_matches_serde() {
        for status in [SessionStatus::Active, SessionStatus::Complete] {
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("archived".parse::<SessionStatus>().is_err());
    }
}
