use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::app::{BotError, Result};
use crate::config::{HttpConfig, RedditConfig};
use crate::domain::Item;
use crate::feed::{FeedSource, ReplyId};
use crate::fetcher::build_client;

/// Refresh the token this long before reddit says it expires
const TOKEN_SLACK: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct RedditClient {
    client: Client,
    config: RedditConfig,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3600
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Thing<Submission>>,
}

#[derive(Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Deserialize)]
struct Submission {
    id: String,
    subreddit: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    is_self: bool,
}

impl From<Submission> for Item {
    fn from(s: Submission) -> Self {
        Item {
            id: s.id,
            feed: s.subreddit,
            url: s.url,
            domain: s.domain,
            is_self: s.is_self,
        }
    }
}

#[derive(Deserialize)]
struct ApiEnvelope {
    json: ApiJson,
}

#[derive(Deserialize)]
struct ApiJson {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
    data: Option<ApiData>,
}

#[derive(Deserialize)]
struct ApiData {
    #[serde(default)]
    things: Vec<Thing<CreatedComment>>,
}

#[derive(Deserialize)]
struct CreatedComment {
    name: String,
}

impl ApiJson {
    /// Reddit reports refusals as `[code, message, field]` triples.
    fn rejection(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let codes: Vec<String> = self
            .errors
            .iter()
            .map(|e| {
                e.iter()
                    .take(2)
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(": ")
            })
            .collect();
        Some(codes.join("; "))
    }
}

impl RedditClient {
    pub fn new(config: RedditConfig, http: &HttpConfig) -> Result<Self> {
        let client = build_client(http, &config.user_agent)?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Requesting reddit access token");
        let response = self
            .client
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::TerminalUpstream(format!(
                "reddit token request returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_SLACK);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    async fn authed(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let token = self.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Token revoked early; drop it so the next call re-authenticates
            *self.token.lock().await = None;
        }

        Ok(response)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl FeedSource for RedditClient {
    async fn newest(&self, feed: &str, limit: usize) -> Result<Vec<Item>> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.endpoint(&format!("/r/{}/new", feed)))
            .query(&[("limit", limit.as_str()), ("raw_json", "1")]);

        let response = self.authed(request).await?;
        response.error_for_status_ref()?;

        let listing: Listing = response.json().await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|thing| Item::from(thing.data))
            .collect())
    }

    async fn reply(&self, item: &Item, body: &str) -> Result<ReplyId> {
        let thing_id = format!("t3_{}", item.id);
        let request = self.client.post(self.endpoint("/api/comment")).form(&[
            ("api_type", "json"),
            ("thing_id", thing_id.as_str()),
            ("text", body),
        ]);

        let response = self.authed(request).await?;
        response.error_for_status_ref()?;

        let envelope: ApiEnvelope = response.json().await?;
        if let Some(reason) = envelope.json.rejection() {
            return Err(BotError::PostRejected(reason));
        }

        envelope
            .json
            .data
            .and_then(|d| d.things.into_iter().next())
            .map(|thing| thing.data.name)
            .ok_or_else(|| BotError::TerminalUpstream("reply response had no comment".into()))
    }

    async fn distinguish(&self, reply: &ReplyId, sticky: bool) -> Result<()> {
        let request = self.client.post(self.endpoint("/api/distinguish")).form(&[
            ("api_type", "json"),
            ("how", "yes"),
            ("id", reply.as_str()),
            ("sticky", if sticky { "true" } else { "false" }),
        ]);

        let response = self.authed(request).await?;
        response.error_for_status_ref()?;

        let envelope: ApiEnvelope = response.json().await?;
        if let Some(reason) = envelope.json.rejection() {
            return Err(BotError::PostRejected(reason));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> RedditClient {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .mount(server)
            .await;

        let config = RedditConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            username: "bot".into(),
            password: "pw".into(),
            auth_url: format!("{}/api/v1/access_token", server.uri()),
            api_url: server.uri(),
            ..RedditConfig::default()
        };
        RedditClient::new(config, &HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_newest_maps_listing_to_items() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/hockey/new"))
            .and(query_param("limit", "2"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "Listing",
                "data": {"children": [
                    {"kind": "t3", "data": {
                        "id": "a1", "subreddit": "hockey",
                        "url": "https://streamable.com/xyz",
                        "domain": "streamable.com", "is_self": false
                    }},
                    {"kind": "t3", "data": {
                        "id": "a2", "subreddit": "hockey",
                        "url": "https://www.reddit.com/r/hockey/comments/a2/",
                        "domain": "self.hockey", "is_self": true
                    }}
                ]}
            })))
            .mount(&server)
            .await;

        let items = client.newest("hockey", 2).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a1");
        assert_eq!(items[0].domain, "streamable.com");
        assert!(!items[0].is_self);
        assert!(items[1].is_self);
    }

    #[tokio::test]
    async fn test_newest_http_error_propagates() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/r/private/new"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        assert!(client.newest("private", 25).await.is_err());
    }

    #[tokio::test]
    async fn test_reply_returns_comment_name() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/comment"))
            .and(body_string_contains("thing_id=t3_a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {"errors": [], "data": {"things": [
                    {"kind": "t1", "data": {"name": "t1_c9", "id": "c9"}}
                ]}}
            })))
            .mount(&server)
            .await;

        let item = Item::new("a1", "hockey", "https://streamable.com/x", "streamable.com");
        let reply = client.reply(&item, "hello").await.unwrap();
        assert_eq!(reply, "t1_c9");
    }

    #[tokio::test]
    async fn test_reply_too_old_is_rejection() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/comment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {"errors": [
                    ["TOO_OLD", "that's a piece of history now; it's too late to reply to it", "parent"]
                ]}
            })))
            .mount(&server)
            .await;

        let item = Item::new("a1", "hockey", "https://streamable.com/x", "streamable.com");
        let err = client.reply(&item, "hello").await.unwrap_err();
        match err {
            BotError::PostRejected(reason) => assert!(reason.starts_with("TOO_OLD")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_distinguish_sends_sticky() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/distinguish"))
            .and(body_string_contains("id=t1_c9"))
            .and(body_string_contains("sticky=true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"json": {"errors": []}})))
            .expect(1)
            .mount(&server)
            .await;

        client.distinguish(&"t1_c9".to_string(), true).await.unwrap();
    }

    #[tokio::test]
    async fn test_token_is_cached_between_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok", "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/leafs/new"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"children": []}})),
            )
            .mount(&server)
            .await;

        let config = RedditConfig {
            auth_url: format!("{}/api/v1/access_token", server.uri()),
            api_url: server.uri(),
            ..RedditConfig::default()
        };
        let client = RedditClient::new(config, &HttpConfig::default()).unwrap();

        client.newest("leafs", 5).await.unwrap();
        client.newest("leafs", 5).await.unwrap();
    }
}
