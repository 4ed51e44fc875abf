//! Web-search provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the indexed web-search service.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// API key for the search service
    pub api_key: Option<Secret<String>>,

    /// Base URL for the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of results to return per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate search configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("SEARCH__API_KEY"));
        }
        if !self.base_url.starts_with("http") {
            return Err(ValidationError::InvalidBaseUrl("search.base_url"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_results == 0 || self.max_results > 10 {
            return Err(ValidationError::InvalidResultLimit);
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_results: default_max_results(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.ydc-index.io".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_results() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_results, 10);
    }

    #[test]
    fn test_validation_requires_api_key() {
        let config = SearchConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_result_limit_bounds() {
        let base = SearchConfig {
            api_key: Some(Secret::new("key".to_string())),
            ..Default::default()
        };

        let zero = SearchConfig {
            max_results: 0,
            ..base.clone()
        };
        assert!(matches!(
            zero.validate(),
            Err(ValidationError::InvalidResultLimit)
        ));

        let too_many = SearchConfig {
            max_results: 50,
            ..base.clone()
        };
        assert!(too_many.validate().is_err());

        assert!(base.validate().is_ok());
    }
}
