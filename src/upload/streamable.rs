use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::app::{BotError, Result};
use crate::config::{HttpConfig, StreamableConfig};
use crate::fetcher::build_client;
use crate::upload::UploadService;

pub struct StreamableClient {
    client: Client,
    config: StreamableConfig,
}

#[derive(Deserialize)]
struct ImportResponse {
    shortcode: String,
}

impl StreamableClient {
    pub fn new(config: StreamableConfig, http: &HttpConfig) -> Result<Self> {
        let user_agent = format!("linux:io.pacefalmd.converter (by {})", config.username);
        Ok(Self {
            client: build_client(http, &user_agent)?,
            config,
        })
    }
}

#[async_trait]
impl UploadService for StreamableClient {
    async fn import(&self, source_url: &str) -> Result<String> {
        let endpoint = format!("{}/import", self.config.api_url.trim_end_matches('/'));
        let response = self
            .client
            .post(endpoint)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .query(&[("url", source_url)])
            .send()
            .await
            .map_err(|e| BotError::TerminalUpstream(format!("import request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::GATEWAY_TIMEOUT {
            return Err(BotError::TransientUpstream(format!(
                "import of {} timed out at the gateway",
                source_url
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BotError::TerminalUpstream(format!("import body unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(BotError::TerminalUpstream(format!(
                "import returned {}: {}",
                status, text
            )));
        }

        let parsed: ImportResponse = serde_json::from_str(&text).map_err(|e| {
            BotError::TerminalUpstream(format!("malformed import response ({}): {}", e, text))
        })?;

        Ok(parsed.shortcode)
    }

    fn share_url(&self, shortcode: &str) -> String {
        format!("{}/{}", self.config.share_url.trim_end_matches('/'), shortcode)
    }
}
