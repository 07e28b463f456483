//! # clipmirror
//!
//! A reddit bot that watches hockey subreddits for highlight links and
//! replies with a playable mirror.
//!
//! ## Architecture
//!
//! ```text
//! Poller → WorkQueue → Classifier → Handler(s) → Responder → SeenStore
//! ```
//!
//! Polling is at-least-once: every sweep re-reads the newest submissions of
//! each feed. Replies are at-most-once: an item is only answered while it has
//! no seen marker, and the marker is written once the item is finished,
//! whether or not the reply went through.
//!
//! ## Quick Start
//!
//! ```bash
//! # Writes ~/.config/clipmirror/config.toml on first run
//! clipmirror once
//!
//! # Poll forever
//! clipmirror run --interval 30s
//!
//! # Debugging
//! clipmirror classify https://www.nhl.com/video/c-123
//! clipmirror seen abc123
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires the store, the external clients,
/// the handlers and the responder together once at startup.
pub mod app;

/// Link classification.
///
/// - [`Classification`](classifier::Classification): closed set of link kinds
/// - [`classify`](classifier::classify): pure `(url, domain)` → kinds
pub mod classifier;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/clipmirror/config.toml`.
pub mod config;

/// Core domain models: [`Item`](domain::Item) and
/// [`ResolvedMedia`](domain::ResolvedMedia).
pub mod domain;

/// The watched feed: listing, replying, pinning.
///
/// - [`FeedSource`](feed::FeedSource): async trait
/// - [`RedditClient`](feed::RedditClient): reddit OAuth API implementation
pub mod feed;

/// Plain page fetching for video pages.
pub mod fetcher;

/// One handler per classification, each resolving media for an item.
pub mod handlers;

/// Microblog post lookup.
pub mod microblog;

/// Per-item pipeline and the bounded worker pool that runs it.
pub mod pipeline;

/// The repeating sweep over all feeds.
pub mod poller;

/// Reply rendering, posting and seen-marker finalization.
pub mod responder;

/// Durable seen markers.
///
/// - [`SeenStore`](store::SeenStore): exists / create-if-absent
/// - [`SqliteSeenStore`](store::SqliteSeenStore): SQLite implementation
pub mod store;

/// Video import service used to mirror microblog videos.
pub mod upload;
