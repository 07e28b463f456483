//! Read-only access to microblog posts.

pub mod twitter;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;

pub use twitter::TwitterClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    pub full_text: String,
    /// Only present when the post carries native media
    pub extended_entities: Option<ExtendedEntities>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendedEntities {
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Post {
    /// Type of the first attached media entry, if any media is attached.
    pub fn first_media_kind(&self) -> Option<&str> {
        self.extended_entities
            .as_ref()
            .and_then(|e| e.media.first())
            .map(|m| m.kind.as_str())
    }

    /// Post text on a single line: blank lines dropped, line breaks become ". "
    pub fn single_line_text(&self) -> String {
        self.full_text.replace("\n\n", "\n").replace('\n', ". ")
    }
}

#[async_trait]
pub trait MicroblogApi {
    async fn get_post(&self, id: &str) -> Result<Post>;
}

/// Post id from a link: the path segment right after `status`.
pub fn post_id_from_url(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    let mut segments = parsed.path_segments()?;
    segments.find(|s| *s == "status")?;
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_from_status_link() {
        assert_eq!(
            post_id_from_url("https://twitter.com/NHL/status/123456").as_deref(),
            Some("123456")
        );
        assert_eq!(
            post_id_from_url("https://twitter.com/NHL/status/123456/video/1?s=20").as_deref(),
            Some("123456")
        );
    }

    #[test]
    fn test_post_id_missing() {
        assert_eq!(post_id_from_url("https://twitter.com/NHL"), None);
        assert_eq!(post_id_from_url("https://twitter.com/NHL/status/"), None);
        assert_eq!(post_id_from_url("not a link"), None);
    }

    #[test]
    fn test_single_line_text() {
        let post = Post {
            full_text: "What a goal!\n\nOvertime winner\nfrom the slot".into(),
            extended_entities: None,
        };
        assert_eq!(
            post.single_line_text(),
            "What a goal!. Overtime winner. from the slot"
        );
    }

    #[test]
    fn test_media_kind_inspection() {
        let post: Post = serde_json::from_str(
            r#"{"full_text": "x", "extended_entities": {"media": [{"type": "video"}, {"type": "photo"}]}}"#,
        )
        .unwrap();
        assert_eq!(post.first_media_kind(), Some("video"));

        let photo: Post = serde_json::from_str(
            r#"{"full_text": "x", "extended_entities": {"media": [{"type": "photo"}]}}"#,
        )
        .unwrap();
        assert_eq!(photo.first_media_kind(), Some("photo"));

        let bare: Post = serde_json::from_str(r#"{"full_text": "x"}"#).unwrap();
        assert_eq!(bare.first_media_kind(), None);
    }
}
