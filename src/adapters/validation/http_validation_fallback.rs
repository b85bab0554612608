//! HTTP Validation Fallback - asks a remote classifier about unclear input.
//!
//! The remote side receives the raw text and a description of the step and
//! answers with a [`FallbackVerdict`] as JSON.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpFallbackConfig::new("https://classifier.internal/validate")
//!     .with_api_key(key)
//!     .with_timeout(Duration::from_secs(3));
//!
//! let fallback = HttpValidationFallback::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::ports::{FallbackVerdict, StepPromptContext, ValidationFallback, ValidationFallbackError};

/// Configuration for the HTTP fallback.
#[derive(Debug, Clone)]
pub struct HttpFallbackConfig {
    pub endpoint: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpFallbackConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ValidationRequest<'a> {
    text: &'a str,
    step: &'a StepPromptContext,
}

/// Remote validation fallback over HTTP.
pub struct HttpValidationFallback {
    config: HttpFallbackConfig,
    client: Client,
}

impl HttpValidationFallback {
    pub fn new(config: HttpFallbackConfig) -> Result<Self, ValidationFallbackError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ValidationFallbackError::RequestFailed(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ValidationFallback for HttpValidationFallback {
    async fn validate(
        &self,
        text: &str,
        step: &StepPromptContext,
    ) -> Result<FallbackVerdict, ValidationFallbackError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&ValidationRequest { text, step });
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ValidationFallbackError::Timeout
            } else {
                ValidationFallbackError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ValidationFallbackError::RequestFailed(format!(
                "Unexpected status {}: {}",
                status, body
            )));
        }

        response
            .json::<FallbackVerdict>()
            .await
            .map_err(|e| ValidationFallbackError::InvalidResponse(e.to_string()))
    }
}
