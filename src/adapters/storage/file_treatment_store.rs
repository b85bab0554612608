//! File-based Treatment Store Adapter
//!
//! One directory per session:
//!
//! ```text
//! <base>/<session_id>/context.yaml
//! <base>/<session_id>/session.yaml
//! <base>/<session_id>/interactions.jsonl
//! ```
//!
//! Snapshots are written to a temporary file and renamed into place.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::foundation::SessionId;
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::TreatmentContext;
use crate::ports::{InteractionRecord, StoreError, TreatmentStore};

/// File-based storage for treatment state
#[derive(Debug, Clone)]
pub struct FileTreatmentStore {
    base_path: PathBuf,
    /// Serializes read-compare-write of snapshots.
    write_lock: Arc<Mutex<()>>,
}

impl FileTreatmentStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileTreatmentStore::new("./data/treatment");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn session_dir(&self, session_id: &SessionId) -> PathBuf {
        self.base_path.join(session_id.to_string())
    }

    fn context_path(&self, session_id: &SessionId) -> PathBuf {
        self.session_dir(session_id).join("context.yaml")
    }

    fn session_path(&self, session_id: &SessionId) -> PathBuf {
        self.session_dir(session_id).join("session.yaml")
    }

    fn interactions_path(&self, session_id: &SessionId) -> PathBuf {
        self.session_dir(session_id).join("interactions.jsonl")
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }

        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        serde_yaml::from_str(&yaml)
            .map(Some)
            .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
    }

    async fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(value)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl TreatmentStore for FileTreatmentStore {
    async fn load_context(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentContext>, StoreError> {
        Self::read_yaml(&self.context_path(session_id)).await
    }

    async fn save_context(&self, context: &TreatmentContext) -> Result<(), StoreError> {
        let session_id = context.session_id();
        self.ensure_dir(&self.session_dir(session_id)).await?;

        let _guard = self.write_lock.lock().await;
        let path = self.context_path(session_id);
        if let Some(stored) = Self::read_yaml::<TreatmentContext>(&path).await? {
            if stored.version() > context.version() {
                debug!(
                    session_id = %session_id,
                    stored = stored.version(),
                    incoming = context.version(),
                    "Ignoring stale context"
                );
                return Ok(());
            }
        }
        Self::write_yaml(&path, context).await
    }

    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        self.ensure_dir(&self.session_dir(&record.session_id)).await?;

        let mut line = serde_json::to_string(record)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.interactions_path(&record.session_id))
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentSession>, StoreError> {
        Self::read_yaml(&self.session_path(session_id)).await
    }

    async fn save_session(&self, session: &TreatmentSession) -> Result<(), StoreError> {
        self.ensure_dir(&self.session_dir(session.id())).await?;

        let _guard = self.write_lock.lock().await;
        let path = self.session_path(session.id());
        if let Some(stored) = Self::read_yaml::<TreatmentSession>(&path).await? {
            if stored.turn_count() > session.turn_count() {
                return Ok(());
            }
        }
        Self::write_yaml(&path, session).await
    }

    async fn interactions(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        let path = self.interactions_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let mut records = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<InteractionRecord>(line)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|record| record.recorded_at);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::treatment::{Modality, StepId, TreatmentPhase};
    use tempfile::TempDir;

    fn store() -> (TempDir, FileTreatmentStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTreatmentStore::new(dir.path());
        (dir, store)
    }

    fn context() -> TreatmentContext {
        TreatmentContext::new(
            SessionId::new(),
            UserId::new("user-1").unwrap(),
            StepId::from_static("introduction"),
            TreatmentPhase::Introduction,
        )
    }

    mod contexts {
        use super::*;

        #[tokio::test]
        async fn missing_context_loads_as_none() {
            let (_dir, store) = store();
            assert!(store.load_context(&SessionId::new()).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn context_survives_round_trip_with_nested_state() {
            let (_dir, store) = store();
            let mut ctx = context();
            ctx.set_problem_statement("I feel anxious");
            ctx.metadata_mut().selected_method = Some(Modality::IdentityShifting);
            ctx.metadata_mut().dig_deeper_consent = true;
            ctx.record_response(&StepId::from_static("work_type_description"), "I feel anxious");
            ctx.bump_version();

            store.save_context(&ctx).await.unwrap();

            let loaded = store.load_context(ctx.session_id()).await.unwrap().unwrap();
            assert_eq!(loaded, ctx);
        }

        #[tokio::test]
        async fn stale_context_is_ignored() {
            let (_dir, store) = store();
            let old = context();
            let mut newer = old.clone();
            newer.bump_version();

            store.save_context(&newer).await.unwrap();
            store.save_context(&old).await.unwrap();

            let loaded = store.load_context(old.session_id()).await.unwrap().unwrap();
            assert_eq!(loaded.version(), 1);
        }

        #[tokio::test]
        async fn leaves_no_temporary_files() {
            let (dir, store) = store();
            let ctx = context();
            store.save_context(&ctx).await.unwrap();

            let session_dir = dir.path().join(ctx.session_id().to_string());
            let names: Vec<_> = std::fs::read_dir(session_dir)
                .unwrap()
                .map(|entry| entry.unwrap().file_name().into_string().unwrap())
                .collect();
            assert_eq!(names, vec!["context.yaml".to_string()]);
        }
    }

    mod interactions {
        use super::*;

        #[tokio::test]
        async fn appends_json_lines() {
            let (dir, store) = store();
            let session_id = SessionId::new();
            for input in ["1", "1", "I feel anxious"] {
                let record = InteractionRecord::new(
                    session_id,
                    StepId::from_static("method_selection"),
                    input,
                    "text",
                    3,
                );
                store.append_interaction(&record).await.unwrap();
            }

            let raw = std::fs::read_to_string(
                dir.path()
                    .join(session_id.to_string())
                    .join("interactions.jsonl"),
            )
            .unwrap();
            assert_eq!(raw.lines().count(), 3);

            let records = store.interactions(&session_id).await.unwrap();
            assert_eq!(records.len(), 3);
            assert_eq!(records[2].raw_input, "I feel anxious");
        }

        #[tokio::test]
        async fn unknown_session_has_no_history() {
            let (_dir, store) = store();
            assert!(store.interactions(&SessionId::new()).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn session_record_round_trips() {
        let (_dir, store) = store();
        let mut session = TreatmentSession::new(SessionId::new(), UserId::new("user-1").unwrap());
        session.record_turn().unwrap();
        session.complete().unwrap();

        store.save_session(&session).await.unwrap();

        let loaded = store.load_session(session.id()).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert!(loaded.is_complete());
    }
}
