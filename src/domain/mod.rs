//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `session` - Treatment session lifecycle
//! - `treatment` - The dialogue engine: steps, routing, signals, digging deeper

pub mod foundation;
pub mod session;
pub mod treatment;
