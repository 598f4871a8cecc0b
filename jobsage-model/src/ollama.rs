//! Ollama generation client.
//!
//! Calls the `/api/generate` endpoint of a local Ollama server with
//! `stream: false`, so the full completion comes back in a single response.
//! One request is made per [`generate`](GenerationModel::generate) call and
//! the client keeps no conversation state between calls.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ModelError, Result};

/// The default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default model name.
pub const DEFAULT_MODEL: &str = "mistral";

/// The default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// The outcome of a completed generation call.
///
/// A backend that answers successfully but produces no text is a completed
/// call, not a failure; callers decide how to surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The generated answer text.
    Text(String),
    /// The backend completed but returned no usable text.
    Empty,
}

/// A non-streaming text-generation backend.
///
/// Implementations make exactly one backend call per `generate` invocation
/// and keep no session state; multi-turn context, if any, is baked into the
/// prompt by the caller each time.
#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// The model identifier sent to the backend.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` in one synchronous call.
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}

/// Configuration for [`OllamaClient`].
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server, without a trailing path.
    pub base_url: String,
    /// Model name, e.g. `mistral`.
    pub model: String,
    /// Whole-request timeout applied to every generate call.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A [`GenerationModel`] backed by Ollama's `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the base URL or model name is
    /// empty, or if the HTTP client cannot be constructed.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ModelError::InvalidConfig("base_url must not be empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(ModelError::InvalidConfig("model must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Parse the raw body of a successful `/api/generate` response.
///
/// Strict JSON is tried first. Some model runners have been seen emitting
/// single-quoted pseudo-JSON; one normalization pass covers that before the
/// body is given up on as [`ModelError::MalformedOutput`]. A valid body with
/// a missing or blank `response` field is a completed [`Generation::Empty`].
fn parse_generation(raw: &str) -> Result<Generation> {
    let parsed: GenerateResponse = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(_) => {
            let normalized = raw.replace('\'', "\"");
            serde_json::from_str(&normalized).map_err(|_| ModelError::MalformedOutput {
                raw: raw.to_string(),
            })?
        }
    };

    match parsed.response {
        Some(text) if !text.trim().is_empty() => Ok(Generation::Text(text)),
        _ => Ok(Generation::Empty),
    }
}

#[async_trait]
impl GenerationModel for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest { model: &self.model, prompt, stream: false };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling generation backend");

        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            error!(model = %self.model, error = %e, "generation request failed");
            if e.is_timeout() {
                ModelError::BackendUnavailable(format!("request timed out: {e}"))
            } else {
                ModelError::BackendUnavailable(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ModelError::BackendUnavailable(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            error!(model = %self.model, status = status.as_u16(), "generation backend error");
            return Err(ModelError::BackendError { status: status.as_u16(), body });
        }

        parse_generation(&body)
    }
}
