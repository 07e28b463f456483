use async_trait::async_trait;
use reqwest::Client;

use crate::app::{BotError, Result};
use crate::config::HttpConfig;
use crate::fetcher::{build_client, PageFetcher};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(http, &http.user_agent)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::TerminalUpstream(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        Ok(response.text().await?)
    }
}
