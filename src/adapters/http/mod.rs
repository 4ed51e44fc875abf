//! HTTP adapter - the REST surface of the conversation service.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::{api_routes, app};
