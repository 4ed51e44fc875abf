//! Indexed-search client for a You.com-style search API.
//!
//! Issues a GET against `/v1/search` with the query and result count,
//! and maps the `results.web` collection into [`SearchHit`] values.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{SearchError, SearchHit, SearchProvider};

/// Hard cap on hits returned regardless of the requested count.
const MAX_RESULTS: usize = 10;

/// Configuration for the search client.
#[derive(Debug, Clone)]
pub struct YdcConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl YdcConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.ydc-index.io".to_string(),
            timeout: Duration::from_secs(10),
        }
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

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Search client implementation.
pub struct YdcSearchClient {
    config: YdcConfig,
    client: Client,
}

impl YdcSearchClient {
    /// Creates a new search client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Network`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: YdcConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::network(format!("http client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!("{}/v1/search", self.config.base_url)
    }
}

#[async_trait]
impl SearchProvider for YdcSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let count = limit.clamp(1, MAX_RESULTS);
        let count_param = count.to_string();

        let response = self
            .client
            .get(self.search_url())
            .header("X-API-Key", self.config.api_key())
            .query(&[("query", query), ("count", count_param.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    SearchError::unavailable(format!("connection failed: {}", e))
                } else {
                    SearchError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_error_status(status));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::parse(format!("response body: {}", e)))?;

        Ok(map_hits(parsed, count))
    }
}

fn map_error_status(status: StatusCode) -> SearchError {
    match status.as_u16() {
        401 | 403 => SearchError::AuthenticationFailed,
        429 => SearchError::unavailable("rate limited"),
        s if status.is_server_error() => SearchError::unavailable(format!("status {}", s)),
        s => SearchError::RequestFailed { status: s },
    }
}

fn map_hits(response: SearchResponse, limit: usize) -> Vec<SearchHit> {
    response
        .results
        .web
        .into_iter()
        .take(limit.min(MAX_RESULTS))
        .map(|hit| {
            SearchHit::new(hit.title, hit.description, hit.url).with_snippets(hit.snippets)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: ResultGroups,
}

#[derive(Debug, Default, Deserialize)]
struct ResultGroups {
    #[serde(default)]
    web: Vec<WebHit>,
}

#[derive(Debug, Deserialize)]
struct WebHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippets: Vec<String>,
}
