//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - REST API over axum
//! - `storage` - In-memory and file-backed treatment stores
//! - `postgres` - PostgreSQL treatment store
//! - `validation` - Fallback validators for uncertain input

pub mod http;
pub mod postgres;
pub mod storage;
pub mod validation;

pub use postgres::PostgresTreatmentStore;
pub use storage::{FileTreatmentStore, InMemoryTreatmentStore};
pub use validation::{HttpFallbackConfig, HttpValidationFallback};
