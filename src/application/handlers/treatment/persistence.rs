//! Background persistence of finished turns.
//!
//! Every turn produces three writes (context snapshot, session record,
//! interaction record). They run concurrently in a spawned task, each with
//! its own exponential-backoff retry, so the user never waits for storage.
//! The final turn of a session also releases it from the cache once all
//! three writes have landed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::domain::foundation::SessionId;
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::TreatmentContext;
use crate::ports::{InteractionRecord, StoreError, TreatmentStore};

use super::SessionCache;

/// How often, and how patiently, a failed write is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_backoff,
        }
    }

    /// Delay before retry number `retry` (1-based): base, 2x base, 4x base...
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.base_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Spawns and tracks persistence tasks.
pub struct TurnPersister {
    store: Arc<dyn TreatmentStore>,
    retry: RetryPolicy,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TurnPersister {
    pub fn new(store: Arc<dyn TreatmentStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn TreatmentStore> {
        &self.store
    }

    /// Persists one turn in the background.
    pub async fn spawn(
        &self,
        context: TreatmentContext,
        session: TreatmentSession,
        record: Option<InteractionRecord>,
    ) {
        self.spawn_inner(context, session, record, None).await;
    }

    /// Persists the final turn of a session, then releases it from `cache`.
    ///
    /// If any write gives up, the cached copy is the only current one and
    /// is kept.
    pub async fn spawn_final(
        &self,
        context: TreatmentContext,
        session: TreatmentSession,
        record: Option<InteractionRecord>,
        cache: Arc<SessionCache>,
    ) {
        self.spawn_inner(context, session, record, Some(cache)).await;
    }

    async fn spawn_inner(
        &self,
        context: TreatmentContext,
        session: TreatmentSession,
        record: Option<InteractionRecord>,
        release_from: Option<Arc<SessionCache>>,
    ) {
        let store = Arc::clone(&self.store);
        let retry = self.retry;

        let handle = tokio::spawn(async move {
            let session_id = *context.session_id();
            let (context_saved, session_saved, record_saved) = tokio::join!(
                with_retry(retry, session_id, "save_context", || store.save_context(&context)),
                with_retry(retry, session_id, "save_session", || store.save_session(&session)),
                async {
                    match &record {
                        Some(record) => {
                            with_retry(retry, session_id, "append_interaction", || {
                                store.append_interaction(record)
                            })
                            .await
                        }
                        None => true,
                    }
                },
            );

            if let Some(cache) = release_from {
                if context_saved && session_saved && record_saved {
                    cache.release(&session_id, context.version()).await;
                } else {
                    warn!(session_id = %session_id, "Finished session kept in memory, store is behind");
                }
            }
        });

        let mut pending = self.pending.lock().await;
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    /// Waits for every write spawned so far.
    pub async fn flush(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.pending.lock().await);
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "Persistence task panicked");
            }
        }
    }
}

/// Runs `op` until it succeeds or the policy gives up. Returns whether it
/// succeeded; failures are logged, never propagated.
pub(crate) async fn with_retry<F, Fut>(
    policy: RetryPolicy,
    session_id: SessionId,
    operation: &'static str,
    op: F,
) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), StoreError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(()) => return true,
            Err(e) if attempt < policy.attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    session_id = %session_id,
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Persistence failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(
                    session_id = %session_id,
                    operation,
                    attempts = attempt,
                    error = %e,
                    "Persistence failed, giving up"
                );
                return false;
            }
        }
    }
}
