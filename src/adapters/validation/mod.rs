//! Validation Adapters - second opinions on unclear input.
//!
//! - `HttpValidationFallback` - Remote classifier over HTTP
//! - `MockValidationFallback` - Scripted verdicts for tests

mod http_validation_fallback;
mod mock_validation_fallback;

pub use http_validation_fallback::{HttpFallbackConfig, HttpValidationFallback};
pub use mock_validation_fallback::{MockFallbackResponse, MockValidationFallback};
