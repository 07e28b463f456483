use serde::{Deserialize, Serialize};

/// What a handler found for an item. Both fields empty is a valid result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub url: Option<String>,
    pub title: Option<String>,
}

impl ResolvedMedia {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}
