//! Maps an item's link to the handlers that should look at it.
//!
//! Rules are checked independently. An item can match several of them, and
//! an empty set means nothing is dispatched for it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Item;

pub const MICROBLOG_DOMAIN: &str = "twitter.com";
pub const HOSTED_VIDEO_DOMAIN: &str = "streamable.com";

/// `nhl.com/video/...` or `nhl.com/<locale>/video/...`
static DIRECT_VIDEO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"nhl\.com(/[a-zA-Z].*)?/video/").expect("valid video pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    /// Video page on the league site; the playback URL is embedded in the page.
    DirectVideo,
    /// Microblog post that may carry a native video.
    MicroblogLink,
    /// Already hosted on the video service; nothing to resolve.
    HostedVideoLink,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::DirectVideo,
        Classification::MicroblogLink,
        Classification::HostedVideoLink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::DirectVideo => "direct-video",
            Classification::MicroblogLink => "microblog-link",
            Classification::HostedVideoLink => "hosted-video-link",
        }
    }

    fn matches(&self, url: &str, domain: &str) -> bool {
        match self {
            Classification::DirectVideo => DIRECT_VIDEO_PATTERN.is_match(url),
            Classification::MicroblogLink => domain == MICROBLOG_DOMAIN,
            Classification::HostedVideoLink => domain == HOSTED_VIDEO_DOMAIN,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every classification that applies to `(url, domain)`, in declaration order.
pub fn classify(url: &str, domain: &str) -> Vec<Classification> {
    Classification::ALL
        .into_iter()
        .filter(|c| c.matches(url, domain))
        .collect()
}

/// Classify an item. Self posts never match.
pub fn classify_item(item: &Item) -> Vec<Classification> {
    if !item.has_external_link() {
        return Vec::new();
    }
    classify(&item.url, &item.domain)
}

/// Domain of a URL as the feed would report it (host without `www.`).
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_video_without_locale() {
        assert_eq!(
            classify("https://nhl.com/video/abc", "nhl.com"),
            vec![Classification::DirectVideo]
        );
    }

    #[test]
    fn test_direct_video_with_locale_and_team_path() {
        assert_eq!(
            classify("https://www.nhl.com/fr/video/c-123", "nhl.com"),
            vec![Classification::DirectVideo]
        );
        assert_eq!(
            classify("https://www.nhl.com/leafs/video/goal/t-277", "nhl.com"),
            vec![Classification::DirectVideo]
        );
    }

    #[test]
    fn test_nhl_non_video_page_unmatched() {
        assert!(classify("https://www.nhl.com/news/trade", "nhl.com").is_empty());
        assert!(classify("https://www.nhl.com/1/video/x", "nhl.com").is_empty());
    }

    #[test]
    fn test_microblog_apex_only() {
        assert_eq!(
            classify("https://twitter.com/nhl/status/123456", "twitter.com"),
            vec![Classification::MicroblogLink]
        );
        assert!(classify("https://mobile.twitter.com/nhl/status/1", "mobile.twitter.com").is_empty());
    }

    #[test]
    fn test_hosted_video() {
        assert_eq!(
            classify("https://streamable.com/abcd", "streamable.com"),
            vec![Classification::HostedVideoLink]
        );
    }

    #[test]
    fn test_rules_are_not_exclusive() {
        let set = classify("https://twitter.com/x?u=nhl.com/video/1", "twitter.com");
        assert_eq!(
            set,
            vec![Classification::DirectVideo, Classification::MicroblogLink]
        );
    }

    #[test]
    fn test_unmatched_and_garbage_input_yield_empty_set() {
        assert!(classify("https://youtube.com/watch?v=1", "youtube.com").is_empty());
        assert!(classify("", "").is_empty());
        assert!(classify("not a url at all", "???").is_empty());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let url = "https://www.nhl.com/video/abc";
        assert_eq!(classify(url, "nhl.com"), classify(url, "nhl.com"));
    }

    #[test]
    fn test_self_posts_are_never_classified() {
        let mut item = Item::self_post("s1", "hockey");
        item.url = "https://www.nhl.com/video/abc".into();
        assert!(classify_item(&item).is_empty());
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            domain_of("https://www.streamable.com/abc").as_deref(),
            Some("streamable.com")
        );
        assert_eq!(
            domain_of("https://twitter.com/a/status/1").as_deref(),
            Some("twitter.com")
        );
        assert_eq!(domain_of("nope"), None);
    }
}
