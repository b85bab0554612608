//! HTTP adapter for treatment endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChoiceResponse, ErrorResponse, SessionStatusResponse, StartSessionRequest,
    SubmitTurnRequest, TurnResponseBody,
};
pub use handlers::TreatmentHandlers;
pub use routes::treatment_routes;
