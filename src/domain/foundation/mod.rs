//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! shared by the session and treatment modules.

mod errors;
mod ids;
mod session_status;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{InteractionId, SessionId, UserId};
pub use session_status::SessionStatus;
pub use timestamp::Timestamp;
