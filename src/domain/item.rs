use serde::{Deserialize, Serialize};

/// One submission pulled from a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub feed: String,
    pub url: String,
    pub domain: String,
    pub is_self: bool,
}

impl Item {
    pub fn new(id: &str, feed: &str, url: &str, domain: &str) -> Self {
        Self {
            id: id.to_string(),
            feed: feed.to_string(),
            url: url.to_string(),
            domain: domain.to_string(),
            is_self: false,
        }
    }

    pub fn self_post(id: &str, feed: &str) -> Self {
        Self {
            id: id.to_string(),
            feed: feed.to_string(),
            url: String::new(),
            domain: format!("self.{}", feed),
            is_self: true,
        }
    }

    /// Whether the item links somewhere worth classifying
    pub fn has_external_link(&self) -> bool {
        !self.is_self && !self.url.is_empty()
    }

    /// Whether replies in this feed should be pinned
    pub fn is_in(&self, feeds: &[String]) -> bool {
        feeds.iter().any(|f| f.eq_ignore_ascii_case(&self.feed))
    }
}
