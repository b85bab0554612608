//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTreatmentStore` - Sessions, contexts and turn history

mod treatment_store;

pub use treatment_store::PostgresTreatmentStore;
