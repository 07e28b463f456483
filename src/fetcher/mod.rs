pub mod http_fetcher;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{BotError, Result};
use crate::config::HttpConfig;

pub use http_fetcher::HttpFetcher;

/// Plain page retrieval for link targets.
#[async_trait]
pub trait PageFetcher {
    /// Fetch `url` and return the body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Shared reqwest client with the per-call timeout applied.
pub fn build_client(http: &HttpConfig, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(http.timeout())
        .gzip(true)
        .brotli(true)
        .user_agent(user_agent)
        .build()
        .map_err(|e| BotError::Other(format!("Failed to build HTTP client: {}", e)))
}
