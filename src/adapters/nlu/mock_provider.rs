//! Mock NLU Provider for testing.
//!
//! Queue-backed implementation of the NluProvider port so tests can
//! script model replies and outages without network access.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockNluProvider::new()
//!     .with_response(r#"{"intent": "FAQ", "entities": {}}"#)
//!     .with_error(NluError::unavailable("scripted outage"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{NluError, NluProvider, NluRequest};

/// A scripted mock reply.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(MockFailure),
}

/// Cloneable failure shapes, mapped to [`NluError`] when consumed.
#[derive(Debug, Clone)]
enum MockFailure {
    Unavailable(String),
    Timeout(u32),
    Parse(String),
}

/// Mock NLU provider with scripted responses and call tracking.
#[derive(Debug, Clone, Default)]
pub struct MockNluProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<NluRequest>>>,
}

impl MockNluProvider {
    /// Creates a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful completion.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Text(text.into()));
        self
    }

    /// Queues an unavailable-service failure.
    pub fn with_outage(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Error(MockFailure::Unavailable(message.into())));
        self
    }

    /// Queues a timeout failure.
    pub fn with_timeout(self, timeout_secs: u32) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Error(MockFailure::Timeout(timeout_secs)));
        self
    }

    /// Queues a garbage reply that callers will fail to interpret.
    pub fn with_unparseable(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Error(MockFailure::Parse(message.into())));
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The prompt of the most recent request.
    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|request| request.prompt.clone())
    }
}

#[async_trait]
impl NluProvider for MockNluProvider {
    async fn complete(&self, request: NluRequest) -> Result<String, NluError> {
        self.calls.lock().unwrap().push(request);

        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(failure)) => Err(match failure {
                MockFailure::Unavailable(message) => NluError::unavailable(message),
                MockFailure::Timeout(timeout_secs) => NluError::Timeout { timeout_secs },
                MockFailure::Parse(message) => NluError::parse(message),
            }),
            None => Err(NluError::InvalidRequest(
                "mock script exhausted".to_string(),
            )),
        }
    }
}
