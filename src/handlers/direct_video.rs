use std::sync::Arc;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use serde::Deserialize;

use crate::app::{BotError, Result};
use crate::domain::{Item, ResolvedMedia};
use crate::fetcher::PageFetcher;
use crate::handlers::{Handler, Resolution};

/// Variable the video page assigns its metadata to
pub const METADATA_MARKER: &str = "var initialMedia";
/// Playback variant linked in replies
pub const PLAYBACK_NAME: &str = "FLASH_1800K_960X540";

#[derive(Deserialize)]
struct InitialMedia {
    #[serde(rename = "metaData")]
    meta_data: MetaData,
}

#[derive(Deserialize)]
struct MetaData {
    title: String,
    #[serde(default)]
    playbacks: Vec<Playback>,
}

#[derive(Deserialize)]
struct Playback {
    name: String,
    url: String,
}

pub struct DirectVideoHandler {
    pages: Arc<dyn PageFetcher + Send + Sync>,
}

impl DirectVideoHandler {
    pub fn new(pages: Arc<dyn PageFetcher + Send + Sync>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl Handler for DirectVideoHandler {
    async fn resolve(&self, item: &Item) -> Result<Resolution> {
        let page = self
            .pages
            .fetch_text(&item.url)
            .await
            .map_err(|e| BotError::TerminalUpstream(format!("page fetch failed: {}", e)))?;

        let media = extract_media(&page)?;
        tracing::info!(item = %item.id, title = ?media.title, "Resolved video page");
        Ok(Resolution::Resolved(media))
    }
}

/// Pull title and playback URL out of the first metadata assignment in `page`.
pub fn extract_media(page: &str) -> Result<ResolvedMedia> {
    let line = page
        .lines()
        .find(|line| line.contains(METADATA_MARKER))
        .ok_or_else(|| BotError::TerminalUpstream("no media metadata on page".into()))?;

    let rhs = assignment_value(line)
        .ok_or_else(|| BotError::TerminalUpstream("metadata assignment is malformed".into()))?;

    // Only the first value; the rest of the line may hold more script
    let media: InitialMedia = serde_json::Deserializer::from_str(rhs)
        .into_iter::<InitialMedia>()
        .next()
        .ok_or_else(|| BotError::TerminalUpstream("metadata assignment is empty".into()))?
        .map_err(|e| BotError::TerminalUpstream(format!("metadata is not valid JSON: {}", e)))?;

    let playback = media
        .meta_data
        .playbacks
        .into_iter()
        .find(|p| p.name == PLAYBACK_NAME)
        .ok_or_else(|| BotError::TerminalUpstream(format!("no {} playback", PLAYBACK_NAME)))?;

    let title = decode_html_entities(&media.meta_data.title).to_string();
    Ok(ResolvedMedia::new(playback.url, title))
}

/// Everything after the `=` of `var initialMedia = ...`
fn assignment_value(line: &str) -> Option<&str> {
    let start = line.find(METADATA_MARKER)? + METADATA_MARKER.len();
    let (_, rhs) = line[start..].split_once('=')?;
    Some(rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedPages(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for FixedPages {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| BotError::Other(format!("connection refused: {}", url)))
        }
    }

    const PAGE: &str = r#"<html>
<script>
var initialMedia = {"metaData":{"title":"Great Save","playbacks":[{"name":"FLASH_1800K_960X540","url":"http://x/v.mp4"}]}};
</script>
</html>"#;

    #[test]
    fn test_extracts_title_and_playback() {
        let media = extract_media(PAGE).unwrap();
        assert_eq!(media.url.as_deref(), Some("http://x/v.mp4"));
        assert_eq!(media.title.as_deref(), Some("Great Save"));
    }

    #[test]
    fn test_picks_named_variant_among_many() {
        let page = r#"var initialMedia = {"metaData":{"title":"t","playbacks":[{"name":"HTTP_CLOUD_MOBILE","url":"http://x/m.m3u8"},{"name":"FLASH_1800K_960X540","url":"http://x/1800.mp4"},{"name":"FLASH_450K_400X224","url":"http://x/450.mp4"}]}};"#;
        let media = extract_media(page).unwrap();
        assert_eq!(media.url.as_deref(), Some("http://x/1800.mp4"));
    }

    #[test]
    fn test_title_entities_are_decoded() {
        let page = r#"var initialMedia = {"metaData":{"title":"Ovechkin&#39;s 700th &amp; counting","playbacks":[{"name":"FLASH_1800K_960X540","url":"u"}]}};"#;
        let media = extract_media(page).unwrap();
        assert_eq!(media.title.as_deref(), Some("Ovechkin's 700th & counting"));
    }

    #[test]
    fn test_missing_marker_is_terminal() {
        let err = extract_media("<html>no script here</html>").unwrap_err();
        assert!(matches!(err, BotError::TerminalUpstream(_)));
    }

    #[test]
    fn test_malformed_json_is_terminal() {
        let err = extract_media("var initialMedia = {\"metaData\": {oops};").unwrap_err();
        assert!(matches!(err, BotError::TerminalUpstream(_)));
    }

    #[test]
    fn test_missing_variant_is_terminal() {
        let page = r#"var initialMedia = {"metaData":{"title":"t","playbacks":[{"name":"FLASH_450K_400X224","url":"u"}]}};"#;
        let err = extract_media(page).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_incomplete_metadata_is_terminal() {
        let err = extract_media("var initialMedia = {\"metaData\":{}};").unwrap_err();
        assert!(matches!(err, BotError::TerminalUpstream(_)));
        assert!(extract_media("var initialMedia = ;").is_err());
        assert!(extract_media("var initialMedia").is_err());
    }

    #[test]
    fn test_ignores_script_after_assignment() {
        let page = r#"<script>var initialMedia = {"metaData":{"title":"Great Save","playbacks":[{"name":"FLASH_1800K_960X540","url":"http://x/v.mp4"}]}}; var other = 1;</script>"#;
        let media = extract_media(page).unwrap();
        assert_eq!(media.url.as_deref(), Some("http://x/v.mp4"));
        assert_eq!(media.title.as_deref(), Some("Great Save"));
    }

    #[tokio::test]
    async fn test_resolve_fetches_item_page() {
        let url = "https://www.nhl.com/video/abc";
        let pages = FixedPages(HashMap::from([(url.to_string(), PAGE.to_string())]));
        let handler = DirectVideoHandler::new(Arc::new(pages));

        let item = Item::new("v1", "hockey", url, "nhl.com");
        let resolution = handler.resolve(&item).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Resolved(ResolvedMedia::new("http://x/v.mp4", "Great Save"))
        );
    }

    #[tokio::test]
    async fn test_network_error_is_terminal() {
        let handler = DirectVideoHandler::new(Arc::new(FixedPages(HashMap::new())));
        let item = Item::new("v1", "hockey", "https://www.nhl.com/video/gone", "nhl.com");
        let err = handler.resolve(&item).await.unwrap_err();
        assert!(matches!(err, BotError::TerminalUpstream(_)));
    }
}
