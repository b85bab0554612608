//! Treatment session aggregate.
//!
//! A session is the durable record that one user went through the
//! treatment dialogue. The dialogue state itself lives in the
//! `TreatmentContext`; the session only tracks ownership and lifecycle.

use crate::domain::foundation::{
    DomainError, ErrorCode, SessionId, SessionStatus, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

/// Session aggregate - top-level record for one treatment run.
///
/// # Invariants
///
/// - `id` is globally unique
/// - Complete sessions cannot be modified
/// - Sessions are never deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentSession {
    id: SessionId,
    user_id: UserId,
    status: SessionStatus,
    turn_count: u32,
    created_at: Timestamp,
    updated_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl TreatmentSession {
    /// Create a new active session.
    pub fn new(id: SessionId, user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            status: SessionStatus::Active,
            turn_count: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    pub fn reconstitute(
        id: SessionId,
        user_id: UserId,
        status: SessionStatus,
        turn_count: u32,
        created_at: Timestamp,
        updated_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            user_id,
            status,
            turn_count,
            created_at,
            updated_at,
            completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Count one processed turn.
    ///
    /// # Errors
    ///
    /// - `SessionComplete` if the session already finished
    pub fn record_turn(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.turn_count += 1;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Mark the session complete (terminal step reached or explicit exit).
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session is already complete
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.status = self.status.finish().map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
        })?;
        let now = Timestamp::now();
        self.updated_at = now;
        self.completed_at = Some(now);
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::SessionComplete,
                format!("Session {} is already complete", self.id),
            ))
        }
    }
}
