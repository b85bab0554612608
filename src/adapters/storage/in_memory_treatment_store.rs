//! In-Memory Treatment Store Adapter
//!
//! Keeps contexts, sessions and interaction history in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::foundation::SessionId;
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::TreatmentContext;
use crate::ports::{InteractionRecord, StoreError, TreatmentStore};

/// In-memory storage for treatment state
#[derive(Debug, Clone, Default)]
pub struct InMemoryTreatmentStore {
    contexts: Arc<RwLock<HashMap<SessionId, TreatmentContext>>>,
    sessions: Arc<RwLock<HashMap<SessionId, TreatmentSession>>>,
    interactions: Arc<RwLock<HashMap<SessionId, Vec<InteractionRecord>>>>,
}

impl InMemoryTreatmentStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.contexts.write().await.clear();
        self.sessions.write().await.clear();
        self.interactions.write().await.clear();
    }

    /// Get the number of stored contexts
    pub async fn context_count(&self) -> usize {
        self.contexts.read().await.len()
    }
}

#[async_trait]
impl TreatmentStore for InMemoryTreatmentStore {
    async fn load_context(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentContext>, StoreError> {
        Ok(self.contexts.read().await.get(session_id).cloned())
    }

    async fn save_context(&self, context: &TreatmentContext) -> Result<(), StoreError> {
        let mut contexts = self.contexts.write().await;
        if let Some(stored) = contexts.get(context.session_id()) {
            if stored.version() > context.version() {
                debug!(
                    session_id = %context.session_id(),
                    stored = stored.version(),
                    incoming = context.version(),
                    "Ignoring stale context"
                );
                return Ok(());
            }
        }
        contexts.insert(*context.session_id(), context.clone());
        Ok(())
    }

    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        self.interactions
            .write()
            .await
            .entry(record.session_id)
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentSession>, StoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save_session(&self, session: &TreatmentSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        if let Some(stored) = sessions.get(session.id()) {
            if stored.turn_count() > session.turn_count() {
                return Ok(());
            }
        }
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn interactions(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        let interactions = self.interactions.read().await;
        let mut records = interactions.get(session_id).cloned().unwrap_or_default();
        records.sort_by_key(|record| record.recorded_at);
        Ok(records)
    }
}
