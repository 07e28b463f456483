//! The feed the bot watches and replies on.

pub mod reddit;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Item;

pub use reddit::RedditClient;

/// Identifier of a reply the bot created, as the feed names it.
pub type ReplyId = String;

#[async_trait]
pub trait FeedSource {
    /// Newest `limit` items of `feed`, in the feed's own order.
    async fn newest(&self, feed: &str, limit: usize) -> Result<Vec<Item>>;

    /// Post `body` as a reply to `item`.
    ///
    /// A refusal by the feed itself (thread archived, locked, ...) is
    /// reported as [`BotError::PostRejected`](crate::app::BotError::PostRejected).
    async fn reply(&self, item: &Item, body: &str) -> Result<ReplyId>;

    /// Mark a reply as moderator-distinguished, optionally pinned.
    async fn distinguish(&self, reply: &ReplyId, sticky: bool) -> Result<()>;
}
