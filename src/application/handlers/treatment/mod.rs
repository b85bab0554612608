//! Treatment command and query handlers.
//!
//! The handlers share one [`SessionCache`] (live contexts and per-session
//! turn gates) and one [`TurnPersister`] (background writes).

mod errors;
mod get_treatment_session;
mod persistence;
mod process_input;
mod session_cache;
mod start_treatment;

pub use errors::ProcessInputError;
pub use get_treatment_session::{
    GetTreatmentSessionHandler, GetTreatmentSessionQuery, TreatmentSessionView,
};
pub use persistence::{RetryPolicy, TurnPersister};
pub use process_input::{ProcessInputCommand, ProcessInputHandler, TurnResponse};
pub use session_cache::SessionCache;
pub use start_treatment::{StartTreatmentCommand, StartTreatmentHandler, StartTreatmentResult};
