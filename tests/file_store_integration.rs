//! Integration tests for the file-backed store.
//!
//! A session written by one process must resume, from disk, in the next.

use std::sync::Arc;

use tempfile::TempDir;

use treatment_dialogue::adapters::storage::FileTreatmentStore;
use treatment_dialogue::application::handlers::{
    ProcessInputCommand, ProcessInputHandler, RetryPolicy, SessionCache, StartTreatmentCommand,
    StartTreatmentHandler, TurnPersister,
};
use treatment_dialogue::domain::foundation::{SessionId, UserId};
use treatment_dialogue::domain::treatment::steps::{ids, problem_shifting};
use treatment_dialogue::domain::treatment::TreatmentEngine;
use treatment_dialogue::ports::TreatmentStore;

fn handlers(dir: &TempDir) -> (StartTreatmentHandler, ProcessInputHandler) {
    let store = Arc::new(FileTreatmentStore::new(dir.path()));
    let sessions = Arc::new(SessionCache::new(store.clone()));
    let persister = Arc::new(TurnPersister::new(store, RetryPolicy::default()));
    let engine = TreatmentEngine::default();
    (
        StartTreatmentHandler::new(engine, sessions.clone(), persister.clone()),
        ProcessInputHandler::new(engine, sessions, persister),
    )
}

fn command(session_id: SessionId, input: &str) -> ProcessInputCommand {
    ProcessInputCommand {
        session_id,
        raw_input: input.to_string(),
    }
}

#[tokio::test]
async fn session_resumes_after_restart() {
    let dir = TempDir::new().unwrap();

    let session_id = {
        let (start, process) = handlers(&dir);
        let started = start
            .handle(StartTreatmentCommand {
                user_id: UserId::new("user-1").unwrap(),
            })
            .await
            .unwrap();
        for input in ["1", "1", "I feel anxious"] {
            process.handle(command(started.session_id, input)).await.unwrap();
        }
        process.flush().await;
        started.session_id
    };

    let (_, process) = handlers(&dir);
    let response = process.handle(command(session_id, "yes")).await.unwrap();

    assert_eq!(response.next_step_id, problem_shifting::FEEL_PROBLEM);
    assert!(response.display_text.starts_with("Feel 'I feel anxious'..."));
    process.flush().await;

    let store = FileTreatmentStore::new(dir.path());
    let session = store.load_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.turn_count(), 4);

    let history = store.interactions(&session_id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3].step_id, ids::WORK_TYPE_CONFIRMATION);
}

#[tokio::test]
async fn unknown_session_is_reported_not_found() {
    let dir = TempDir::new().unwrap();
    let (_, process) = handlers(&dir);

    let error = process
        .handle(command(SessionId::new(), "1"))
        .await
        .unwrap_err();

    assert!(error.is_not_found());
}
