//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `NluProvider` - language-model completions (extraction, question
//!   generation, summarization)
//! - `SearchProvider` - indexed web search
//! - `SessionStore` - keyed, time-bounded conversation state

mod nlu_provider;
mod search_provider;
mod session_store;

pub use nlu_provider::{NluError, NluProvider, NluRequest};
pub use search_provider::{SearchError, SearchHit, SearchProvider};
pub use session_store::{SessionHandle, SessionStore};
