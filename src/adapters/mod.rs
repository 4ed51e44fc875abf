//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `nlu` - language-model providers (Gemini API, mock)
//! - `search` - indexed web-search clients (You.com-style API, mock)
//! - `store` - session storage (in-memory)
//! - `http` - the axum REST surface

pub mod http;
pub mod nlu;
pub mod search;
pub mod store;
