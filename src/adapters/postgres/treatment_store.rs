//! PostgreSQL implementation of TreatmentStore.
//!
//! Contexts are stored whole as JSONB next to their version; the upsert only
//! replaces a row when the incoming version is not older. Schema lives in
//! `migrations/0001_treatment.sql`.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    InteractionId, SessionId, SessionStatus, Timestamp, UserId, ValidationError,
};
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::{StepId, TreatmentContext};
use crate::ports::{InteractionRecord, StoreError, TreatmentStore};

/// PostgreSQL implementation of TreatmentStore.
#[derive(Clone)]
pub struct PostgresTreatmentStore {
    pool: PgPool,
}

impl PostgresTreatmentStore {
    /// Creates a new PostgresTreatmentStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| db_error("run migrations", e))
    }
}

#[async_trait]
impl TreatmentStore for PostgresTreatmentStore {
    async fn load_context(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentContext>, StoreError> {
        let row = sqlx::query("SELECT context::text AS context FROM treatment_contexts WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch context", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let json: String = row
            .try_get("context")
            .map_err(|e| db_error("get context", e))?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
    }

    async fn save_context(&self, context: &TreatmentContext) -> Result<(), StoreError> {
        let json = serde_json::to_string(context)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO treatment_contexts (session_id, version, context, updated_at)
            VALUES ($1, $2, $3::jsonb, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                version = EXCLUDED.version,
                context = EXCLUDED.context,
                updated_at = EXCLUDED.updated_at
            WHERE treatment_contexts.version <= EXCLUDED.version
            "#,
        )
        .bind(context.session_id().as_uuid())
        .bind(to_i64(context.version()))
        .bind(json)
        .bind(context.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("upsert context", e))?;

        Ok(())
    }

    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO treatment_interactions (
                id, session_id, step_id, raw_input, display_text, timing_ms, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.session_id.as_uuid())
        .bind(record.step_id.as_str())
        .bind(&record.raw_input)
        .bind(&record.display_text)
        .bind(to_i64(record.timing_ms))
        .bind(record.recorded_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert interaction", e))?;

        Ok(())
    }

    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<TreatmentSession>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, turn_count, created_at, updated_at, completed_at
            FROM treatment_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch session", e))?;

        row.map(row_to_session).transpose()
    }

    async fn save_session(&self, session: &TreatmentSession) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO treatment_sessions (
                id, user_id, status, turn_count, created_at, updated_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                turn_count = EXCLUDED.turn_count,
                updated_at = EXCLUDED.updated_at,
                completed_at = EXCLUDED.completed_at
            WHERE treatment_sessions.turn_count <= EXCLUDED.turn_count
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_str())
        .bind(session.status().as_str())
        .bind(i32::try_from(session.turn_count()).unwrap_or(i32::MAX))
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .bind(session.completed_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("upsert session", e))?;

        Ok(())
    }

    async fn interactions(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, step_id, raw_input, display_text, timing_ms, recorded_at
            FROM treatment_interactions
            WHERE session_id = $1
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch interactions", e))?;

        rows.into_iter().map(row_to_interaction).collect()
    }
}

fn db_error(action: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::DatabaseError(format!("Failed to {}: {}", action, e))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn str_to_status(s: &str) -> Result<SessionStatus, StoreError> {
    s.parse()
        .map_err(|e: ValidationError| StoreError::DeserializationFailed(e.to_string()))
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<TreatmentSession, StoreError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_error("get id", e))?;
    let user_id: String = row.try_get("user_id").map_err(|e| db_error("get user_id", e))?;
    let status: String = row.try_get("status").map_err(|e| db_error("get status", e))?;
    let turn_count: i32 = row
        .try_get("turn_count")
        .map_err(|e| db_error("get turn_count", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_error("get created_at", e))?;
    let updated_at: chrono::DateTime<chrono::Utc> = row
        .try_get("updated_at")
        .map_err(|e| db_error("get updated_at", e))?;
    let completed_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("completed_at")
        .map_err(|e| db_error("get completed_at", e))?;

    let user_id =
        UserId::new(user_id).map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;

    Ok(TreatmentSession::reconstitute(
        SessionId::from_uuid(id),
        user_id,
        str_to_status(&status)?,
        u32::try_from(turn_count).unwrap_or(0),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        completed_at.map(Timestamp::from_datetime),
    ))
}

fn row_to_interaction(row: sqlx::postgres::PgRow) -> Result<InteractionRecord, StoreError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_error("get id", e))?;
    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| db_error("get session_id", e))?;
    let step_id: String = row.try_get("step_id").map_err(|e| db_error("get step_id", e))?;
    let raw_input: String = row
        .try_get("raw_input")
        .map_err(|e| db_error("get raw_input", e))?;
    let display_text: String = row
        .try_get("display_text")
        .map_err(|e| db_error("get display_text", e))?;
    let timing_ms: i64 = row
        .try_get("timing_ms")
        .map_err(|e| db_error("get timing_ms", e))?;
    let recorded_at: chrono::DateTime<chrono::Utc> = row
        .try_get("recorded_at")
        .map_err(|e| db_error("get recorded_at", e))?;

    Ok(InteractionRecord {
        id: InteractionId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        step_id: StepId::from(step_id),
        raw_input,
        display_text,
        timing_ms: u64::try_from(timing_ms).unwrap_or(0),
        recorded_at: Timestamp::from_datetime(recorded_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conversion_roundtrips() {
        for status in [SessionStatus::Active, SessionStatus::Complete] {
            assert_eq!(str_to_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn str_to_status_rejects_invalid() {
        assert!(str_to_status("archived").is_err());
    }

    #[test]
    fn large_counters_saturate() {
        assert_eq!(to_i64(u64::MAX), i64::MAX);
        assert_eq!(to_i64(42), 42);
    }
}
