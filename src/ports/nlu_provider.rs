//! NLU Provider Port - Interface for the language-model service.
//!
//! Abstracts the text-completion API used for intent detection, entity
//! extraction, question generation, and result summarization. The service
//! consumes a single constructed prompt and returns free text; structured
//! interpretation of that text belongs to the callers.

use async_trait::async_trait;

/// Port for language-model completions.
///
/// Implementations connect to an external completion API (or a mock) and
/// translate transport failures into [`NluError`].
#[async_trait]
pub trait NluProvider: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn complete(&self, request: NluRequest) -> Result<String, NluError>;
}

/// Request for a language-model completion.
#[derive(Debug, Clone, PartialEq)]
pub struct NluRequest {
    /// The full prompt text.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
    /// Sampling temperature (low values for deterministic extraction).
    pub temperature: f32,
}

impl NluRequest {
    /// Creates a request with extraction-friendly defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens: 512,
            temperature: 0.1,
        }
    }

    /// Sets the maximum output tokens.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Language-model service errors.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    /// Service is unavailable (5xx or connection refused).
    #[error("model service unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("model authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be interpreted as expected.
    #[error("unparseable model response: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl NluError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if a later retry could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NluError::Unavailable { .. } | NluError::Network(_) | NluError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_works() {
        let request = NluRequest::new("analyze this")
            .with_max_output_tokens(1024)
            .with_temperature(0.7);

        assert_eq!(request.prompt, "analyze this");
        assert_eq!(request.max_output_tokens, 1024);
        assert_eq!(request.temperature, 0.7);
    }

    #[test]
    fn request_defaults_favor_extraction() {
        let request = NluRequest::new("x");
        assert_eq!(request.max_output_tokens, 512);
        assert!(request.temperature < 0.5);
    }

    #[test]
    fn retryable_classification() {
        assert!(NluError::unavailable("down").is_retryable());
        assert!(NluError::network("reset").is_retryable());
        assert!(NluError::Timeout { timeout_secs: 30 }.is_retryable());

        assert!(!NluError::AuthenticationFailed.is_retryable());
        assert!(!NluError::parse("garbage").is_retryable());
        assert!(!NluError::InvalidRequest("bad".into()).is_retryable());
    }

    #[test]
    fn errors_display_correctly() {
        assert_eq!(
            NluError::Timeout { timeout_secs: 30 }.to_string(),
            "request timed out after 30s"
        );
        assert_eq!(
            NluError::unavailable("503").to_string(),
            "model service unavailable: 503"
        );
    }
}
