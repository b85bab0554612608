//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (start, submit a turn) and the session query are kept apart.

pub mod handlers;

pub use handlers::{
    GetTreatmentSessionHandler, GetTreatmentSessionQuery, ProcessInputCommand,
    ProcessInputError, ProcessInputHandler, StartTreatmentCommand, StartTreatmentHandler,
    StartTreatmentResult, TreatmentSessionView, TurnResponse,
};
