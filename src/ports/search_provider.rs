//! Search Provider Port - Interface for the indexed web-search service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for web search.
///
/// Implementations call an external search index and map its response
/// into [`SearchHit`] values.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs a query and returns at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// One result from the search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Short page description.
    pub description: String,
    /// Page URL.
    pub url: String,
    /// Relevant text excerpts.
    #[serde(default)]
    pub snippets: Vec<String>,
}

impl SearchHit {
    /// Creates a hit without snippets.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            snippets: Vec::new(),
        }
    }

    /// Adds text excerpts.
    pub fn with_snippets(mut self, snippets: Vec<String>) -> Self {
        self.snippets = snippets;
        self
    }

    /// The best short text for this hit: first snippet, else description.
    pub fn excerpt(&self) -> &str {
        self.snippets
            .first()
            .map(String::as_str)
            .unwrap_or(&self.description)
    }
}

/// Search service errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Service is unavailable (5xx or connection refused).
    #[error("search service unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("search authentication failed")]
    AuthenticationFailed,

    /// Non-success status that is not an availability problem.
    #[error("search request failed with status {status}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed.
    #[error("unparseable search response: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("search timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl SearchError {
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
}
