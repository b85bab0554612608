//! Storage Adapters
//!
//! Implementations of the TreatmentStore port.
//!
//! ## Available Adapters
//!
//! - **FileTreatmentStore** - YAML snapshots and a JSON-lines history on disk
//! - **InMemoryTreatmentStore** - Everything in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileTreatmentStore, InMemoryTreatmentStore};
//!
//! // Single-node deployments: file-based storage
//! let store = FileTreatmentStore::new("./data/treatment");
//!
//! // Testing: in-memory storage
//! let store = InMemoryTreatmentStore::new();
//! ```

mod file_treatment_store;
mod in_memory_treatment_store;

pub use file_treatment_store::FileTreatmentStore;
pub use in_memory_treatment_store::InMemoryTreatmentStore;
