use std::sync::Arc;
use std::time::Duration;

use crate::app::Result;
use crate::config::Config;
use crate::feed::{FeedSource, RedditClient};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::handlers::{DirectVideoHandler, Handlers, HostedVideoHandler, MicroblogHandler};
use crate::microblog::{MicroblogApi, TwitterClient};
use crate::responder::{ReplyTemplates, Responder};
use crate::store::{SharedStore, SqliteSeenStore};
use crate::upload::{StreamableClient, UploadService};

/// External collaborators the pipeline talks to.
pub struct Services {
    pub store: SharedStore,
    pub feed: Arc<dyn FeedSource + Send + Sync>,
    pub pages: Arc<dyn PageFetcher + Send + Sync>,
    pub microblog: Arc<dyn MicroblogApi + Send + Sync>,
    pub uploads: Arc<dyn UploadService + Send + Sync>,
}

/// Everything a poll cycle and its item tasks need, built once at startup.
pub struct AppContext {
    pub store: SharedStore,
    pub feed: Arc<dyn FeedSource + Send + Sync>,
    pub handlers: Handlers,
    pub responder: Responder,
    pub templates: ReplyTemplates,
}

impl AppContext {
    pub fn new(services: Services, config: &Config) -> Self {
        let handlers = Handlers {
            direct_video: DirectVideoHandler::new(services.pages),
            microblog: MicroblogHandler::new(services.microblog, services.uploads),
            hosted_video: HostedVideoHandler,
        };
        let responder = Responder::new(
            services.store.clone(),
            services.feed.clone(),
            config.poller.pin_feeds.clone(),
        );

        Self {
            store: services.store,
            feed: services.feed,
            handlers,
            responder,
            templates: ReplyTemplates::new(&config.reply),
        }
    }

    /// Wire the real clients described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let services = Services {
            store: Arc::new(open_store(config)?),
            feed: Arc::new(RedditClient::new(config.reddit.clone(), &config.http)?),
            pages: Arc::new(HttpFetcher::new(&config.http)?),
            microblog: Arc::new(TwitterClient::new(config.twitter.clone(), &config.http)?),
            uploads: Arc::new(StreamableClient::new(config.streamable.clone(), &config.http)?),
        };
        Ok(Self::new(services, config))
    }
}

/// Open the seen-marker database named by `config`.
pub fn open_store(config: &Config) -> Result<SqliteSeenStore> {
    let path = match &config.store.path {
        Some(p) => p.clone(),
        None => Config::default_db_path()?,
    };
    SqliteSeenStore::new(
        path,
        &config.store.namespace,
        Duration::from_millis(config.store.busy_timeout_ms),
    )
}
