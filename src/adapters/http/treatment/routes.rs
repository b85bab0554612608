//! HTTP routes for treatment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_session, health, start_session, submit_turn, TreatmentHandlers};

/// Creates the treatment router with all endpoints.
pub fn treatment_routes(handlers: TreatmentHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/treatment/sessions", post(start_session))
        .route("/api/treatment/sessions/:id", get(get_session))
        .route("/api/treatment/sessions/:id/turns", post(submit_turn))
        .with_state(handlers)
}
