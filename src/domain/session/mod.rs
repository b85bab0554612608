//! Session domain module.
//!
//! Tracks ownership and lifecycle (active → complete) of treatment sessions.

mod aggregate;

pub use aggregate::TreatmentSession;
