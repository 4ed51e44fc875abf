//! Web-search provider adapters.

mod mock_client;
mod ydc_client;

pub use mock_client::MockSearchClient;
pub use ydc_client::{YdcConfig, YdcSearchClient};
