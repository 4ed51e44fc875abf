//! Gemini Provider - Implementation of NluProvider for the Gemini API.
//!
//! Sends a single-part `generateContent` request and concatenates the
//! text parts of the first candidate.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.0-flash-exp")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{NluError, NluProvider, NluRequest};

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.0-flash-exp").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.0-flash-exp".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NluError::InvalidRequest`] when the HTTP client cannot
    /// be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, NluError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NluError::InvalidRequest(format!("http client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn to_gemini_request(&self, request: &NluRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl NluProvider for GeminiProvider {
    async fn complete(&self, request: NluRequest) -> Result<String, NluError> {
        let body = self.to_gemini_request(&request);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NluError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    NluError::unavailable(format!("connection failed: {}", e))
                } else {
                    NluError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &detail));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| NluError::parse(format!("response body: {}", e)))?;

        extract_text(&parsed)
    }
}

fn map_error_status(status: StatusCode, detail: &str) -> NluError {
    match status.as_u16() {
        401 | 403 => NluError::AuthenticationFailed,
        400 => NluError::InvalidRequest(truncate(detail, 200)),
        429 => NluError::unavailable("rate limited"),
        s if status.is_server_error() => NluError::unavailable(format!("status {}", s)),
        s => NluError::network(format!("unexpected status {}", s)),
    }
}

fn extract_text(response: &GeminiResponse) -> Result<String, NluError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| NluError::parse("response has no candidates"))?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .map(|part| part.text.as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(NluError::parse("candidate has no text parts"));
    }
    Ok(text)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
