use async_trait::async_trait;
use reqwest::Client;

use crate::app::{BotError, Result};
use crate::config::{HttpConfig, TwitterConfig};
use crate::fetcher::build_client;
use crate::microblog::{MicroblogApi, Post};

pub struct TwitterClient {
    client: Client,
    config: TwitterConfig,
}

impl TwitterClient {
    pub fn new(config: TwitterConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(http, &http.user_agent)?,
            config,
        })
    }
}

#[async_trait]
impl MicroblogApi for TwitterClient {
    async fn get_post(&self, id: &str) -> Result<Post> {
        let url = format!(
            "{}/statuses/show.json",
            self.config.api_url.trim_end_matches('/')
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.bearer_token)
            .query(&[("id", id), ("tweet_mode", "extended")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::TerminalUpstream(format!(
                "post {} lookup returned {}",
                id, status
            )));
        }

        Ok(response.json().await?)
    }
}
