//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod treatment;

pub use treatment::{
    GetTreatmentSessionHandler, GetTreatmentSessionQuery, ProcessInputCommand,
    ProcessInputError, ProcessInputHandler, RetryPolicy, SessionCache, StartTreatmentCommand,
    StartTreatmentHandler, StartTreatmentResult, TreatmentSessionView, TurnPersister,
    TurnResponse,
};
