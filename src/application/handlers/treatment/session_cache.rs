//! In-memory view of live sessions, backed by the store.
//!
//! Holds the latest context and session record per session plus a turn
//! gate that serializes turns of the same session. A cache miss falls back
//! to the store, whose copy is then authoritative.
//!
//! Entries leave the cache two ways: a finished session is released once
//! its last writes have landed, and anything idle past the configured limit
//! is swept in the background. Gates nobody holds are pruned with them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::foundation::SessionId;
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::{TreatmentContext, TreatmentError};
use crate::ports::TreatmentStore;

use super::ProcessInputError;

/// Shortest interval between idle sweeps.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

struct CachedSession {
    context: TreatmentContext,
    session: Option<TreatmentSession>,
    touched: Instant,
}

impl CachedSession {
    fn new(context: TreatmentContext) -> Self {
        Self {
            context,
            session: None,
            touched: Instant::now(),
        }
    }
}

pub struct SessionCache {
    store: Arc<dyn TreatmentStore>,
    entries: RwLock<HashMap<SessionId, CachedSession>>,
    gates: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn TreatmentStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// The turn gate for a session. Hold its lock for the whole turn.
    pub async fn gate(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        Arc::clone(gates.entry(*session_id).or_default())
    }

    /// Latest context, from memory or the store.
    ///
    /// # Errors
    ///
    /// - `ContextNotFound` if neither has it
    /// - `Store` if the store could not be read
    pub async fn context(&self, session_id: &SessionId) -> Result<TreatmentContext, ProcessInputError> {
        if let Some(entry) = self.entries.write().await.get_mut(session_id) {
            entry.touched = Instant::now();
            return Ok(entry.context.clone());
        }

        let ctx = self
            .store
            .load_context(session_id)
            .await?
            .ok_or(TreatmentError::ContextNotFound(*session_id))?;
        debug!(session_id = %session_id, version = ctx.version(), "Context reloaded from store");

        self.entries
            .write()
            .await
            .entry(*session_id)
            .or_insert_with(|| CachedSession::new(ctx.clone()));
        Ok(ctx)
    }

    /// Session record for a context, from memory or the store.
    ///
    /// A context whose record was never persisted gets a fresh record.
    pub async fn session(&self, ctx: &TreatmentContext) -> Result<TreatmentSession, ProcessInputError> {
        let session_id = ctx.session_id();
        let cached = self
            .entries
            .read()
            .await
            .get(session_id)
            .and_then(|entry| entry.session.clone());
        if let Some(session) = cached {
            return Ok(session);
        }

        let session = match self.store.load_session(session_id).await? {
            Some(session) => session,
            None => {
                warn!(session_id = %session_id, "Session record missing, recreating");
                TreatmentSession::new(*session_id, ctx.user_id().clone())
            }
        };
        if let Some(entry) = self.entries.write().await.get_mut(session_id) {
            entry.session = Some(session.clone());
        }
        Ok(session)
    }

    /// Replaces the cached state after a turn.
    pub async fn update(&self, ctx: &TreatmentContext, session: &TreatmentSession) {
        self.entries.write().await.insert(
            *ctx.session_id(),
            CachedSession {
                context: ctx.clone(),
                session: Some(session.clone()),
                touched: Instant::now(),
            },
        );
    }

    /// Returns true while a session is held in memory.
    pub async fn is_cached(&self, session_id: &SessionId) -> bool {
        self.entries.read().await.contains_key(session_id)
    }

    /// Drops the cached copy of a session, forcing the next turn to reload.
    pub async fn evict(&self, session_id: &SessionId) {
        self.entries.write().await.remove(session_id);
        self.prune_gate(session_id).await;
    }

    /// Drops a session whose state at `version` is safely in the store.
    ///
    /// Waits for any turn in progress. A newer cached version means a turn
    /// ran since, so the entry stays.
    pub async fn release(&self, session_id: &SessionId, version: u64) {
        {
            let gate = self.gate(session_id).await;
            let _turn = gate.lock().await;
            let mut entries = self.entries.write().await;
            if entries
                .get(session_id)
                .is_some_and(|entry| entry.context.version() == version)
            {
                entries.remove(session_id);
                debug!(session_id = %session_id, version, "Released finished session");
            }
        }
        self.prune_gate(session_id).await;
    }

    /// Evicts entries untouched for `max_idle` and gates nobody holds.
    /// Returns how many entries were evicted.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut gates = self.gates.lock().await;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|id, entry| {
            entry.touched.elapsed() < max_idle || gates.get(id).is_some_and(gate_in_use)
        });
        gates.retain(|_, gate| gate_in_use(gate));
        before - entries.len()
    }

    /// Sweeps idle entries every quarter of `max_idle` until aborted.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let period = (max_idle / 4).max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = cache.evict_idle(max_idle).await;
                if evicted > 0 {
                    debug!(evicted, "Idle sessions evicted");
                }
            }
        })
    }

    async fn prune_gate(&self, session_id: &SessionId) {
        let mut gates = self.gates.lock().await;
        if gates.get(session_id).is_some_and(|gate| !gate_in_use(gate)) {
            gates.remove(session_id);
        }
    }
}

/// A gate is in use while anyone besides the map holds it.
fn gate_in_use(gate: &Arc<Mutex<()>>) -> bool {
    Arc::strong_count(gate) > 1
}
