//! Treatment store port - persistence of contexts, sessions and turns.
//!
//! Three independent writes happen after every turn: the context snapshot,
//! the session record and one interaction record. The orchestrator runs
//! them concurrently and never waits for them before answering the user,
//! so implementations must tolerate writes arriving out of order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{InteractionId, SessionId, Timestamp};
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::{StepId, TreatmentContext};

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Nothing stored for session: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// One processed turn, kept for history and timing analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: InteractionId,
    pub session_id: SessionId,
    /// The step the input was answered at.
    pub step_id: StepId,
    pub raw_input: String,
    pub display_text: String,
    pub timing_ms: u64,
    pub recorded_at: Timestamp,
}

impl InteractionRecord {
    pub fn new(
        session_id: SessionId,
        step_id: StepId,
        raw_input: impl Into<String>,
        display_text: impl Into<String>,
        timing_ms: u64,
    ) -> Self {
        Self {
            id: InteractionId::new(),
            session_id,
            step_id,
            raw_input: raw_input.into(),
            display_text: display_text.into(),
            timing_ms,
            recorded_at: Timestamp::now(),
        }
    }
}

/// Port for persisting treatment state.
#[async_trait]
pub trait TreatmentStore: Send + Sync {
    /// Load the latest context for a session.
    ///
    /// Returns `None` if nothing was stored.
    async fn load_context(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentContext>, StoreError>;

    /// Save a context snapshot.
    ///
    /// A snapshot whose version is lower than the stored one is ignored.
    async fn save_context(&self, context: &TreatmentContext) -> Result<(), StoreError>;

    /// Append one interaction record to the session's history.
    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError>;

    /// Load the session record.
    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentSession>, StoreError>;

    /// Save (insert or replace) the session record.
    async fn save_session(&self, session: &TreatmentSession) -> Result<(), StoreError>;

    /// All interaction records of a session, oldest first.
    async fn interactions(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<InteractionRecord>, StoreError>;
}
