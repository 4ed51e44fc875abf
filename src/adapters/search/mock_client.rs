//! Mock search client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{SearchError, SearchHit, SearchProvider};

/// Mock search provider with scripted results and call tracking.
#[derive(Debug, Clone, Default)]
pub struct MockSearchClient {
    replies: Arc<Mutex<VecDeque<Result<Vec<SearchHit>, String>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchClient {
    /// Creates a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful result set.
    pub fn with_results(self, hits: Vec<SearchHit>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(hits));
        self
    }

    /// Queues an unavailable-service failure.
    pub fn with_outage(self, message: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// Number of searches issued so far.
    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// The most recent query string.
    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SearchProvider for MockSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(hits)) => Ok(hits.into_iter().take(limit).collect()),
            Some(Err(message)) => Err(SearchError::unavailable(message)),
            None => Err(SearchError::RequestFailed { status: 418 }),
        }
    }
}
