//! Generation-service boundary: a trait seam plus the Ollama implementation.
//!
//! The pipeline only ever sees [`Generator`] — one method, prompt in, text
//! out. That keeps the extraction logic testable with a scripted fake and
//! means any compatible backend (a different local server, an in-process
//! model) can be dropped in without touching the pipeline.
//!
//! ## Retry Strategy
//!
//! Transient Ollama failures (model still loading, socket hiccup) are
//! frequent on first contact. Exponential backoff (`retry_backoff_ms *
//! 2^attempt`) retries a couple of times before the caller falls back to a
//! sentinel answer; with 500 ms base and 2 retries the wait sequence is
//! 500 ms → 1 s, so a dead server costs under two seconds per call.

use crate::config::ExtractionConfig;
use crate::error::{DocumentError, ExtractError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// The injected generation capability: prompt in, generated text out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DocumentError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    // Ollama error payloads parse too; a missing field is detected here
    // rather than failing deserialisation.
    response: Option<String>,
}

/// [`Generator`] backed by an Ollama server's `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl OllamaGenerator {
    /// Build a client from the batch configuration.
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ExtractError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    async fn call_once(&self, prompt: &str) -> Result<String, DocumentError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocumentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DocumentError::Transport(format!("invalid response body: {e}")))?;

        parsed
            .response
            .map(|s| s.trim().to_string())
            .ok_or(DocumentError::MalformedResponse)
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DocumentError> {
        let mut last_err: Option<DocumentError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "generation retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.call_once(prompt).await {
                Ok(text) => {
                    debug!(
                        "model '{}' answered ({} chars, attempt {})",
                        self.model,
                        text.len(),
                        attempt + 1
                    );
                    return Ok(text);
                }
                // A parseable body without the expected field will not
                // improve on retry; bail out immediately.
                Err(e @ DocumentError::MalformedResponse) => return Err(e),
                Err(e) => {
                    warn!("generation attempt {} failed: {e}", attempt + 1);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or(DocumentError::Transport("unknown error".into())))
    }
}
