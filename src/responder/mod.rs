//! Posting replies and writing the seen marker that finishes an item.

mod templates;

pub use templates::ReplyTemplates;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::app::{BotError, Result};
use crate::domain::Item;
use crate::feed::{FeedSource, ReplyId};
use crate::store::{self, SharedStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Marker already present; nothing was posted or written
    AlreadySeen,
    Posted(ReplyId),
    /// The feed refused the reply
    Rejected,
    Failed,
}

pub struct Responder {
    store: SharedStore,
    feed: Arc<dyn FeedSource + Send + Sync>,
    pin_feeds: Vec<String>,
}

impl Responder {
    pub fn new(
        store: SharedStore,
        feed: Arc<dyn FeedSource + Send + Sync>,
        pin_feeds: Vec<String>,
    ) -> Self {
        Self {
            store,
            feed,
            pin_feeds,
        }
    }

    /// Post `body` under `item`, then mark the item seen whatever the post did.
    ///
    /// Only a failed marker lookup is returned as an error; in that case
    /// nothing is posted.
    pub async fn respond(&self, item: &Item, body: &str) -> Result<ReplyOutcome> {
        match store::ensure_unseen(&self.store, &item.id).await {
            Ok(()) => {}
            Err(BotError::DuplicateItem(_)) => {
                debug!(item = %item.id, "Already answered, not replying");
                return Ok(ReplyOutcome::AlreadySeen);
            }
            Err(e) => return Err(e),
        }

        let outcome = match self.post(item, body).await {
            Ok(reply) => ReplyOutcome::Posted(reply),
            Err(BotError::PostRejected(reason)) => {
                info!(item = %item.id, %reason, "Reply rejected (too old?)");
                ReplyOutcome::Rejected
            }
            Err(e) => {
                error!(item = %item.id, feed = %item.feed, error = %e, "Failed to post reply");
                ReplyOutcome::Failed
            }
        };

        self.finalize(item).await;
        Ok(outcome)
    }

    async fn post(&self, item: &Item, body: &str) -> Result<ReplyId> {
        let reply = self.feed.reply(item, body).await?;
        info!(item = %item.id, feed = %item.feed, reply = %reply, "Posted reply");

        if item.is_in(&self.pin_feeds) {
            if let Err(e) = self.feed.distinguish(&reply, true).await {
                warn!(reply = %reply, error = %e, "Failed to pin reply");
            }
        }

        Ok(reply)
    }

    /// Write the seen marker. Failures are logged, never returned.
    pub async fn finalize(&self, item: &Item) {
        match store::mark_seen(&self.store, &item.id).await {
            Ok(true) => debug!(item = %item.id, "Marked seen"),
            Ok(false) => debug!(item = %item.id, "Seen marker already present"),
            Err(e) => error!(item = %item.id, error = %e, "Failed to mark item seen"),
        }
    }
}
