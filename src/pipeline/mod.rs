//! Classify → resolve → reply for a single item.
//!
//! Every failure is contained here. An item either ends with its seen
//! marker written, or (gateway timeout, unmatched link, store outage) is
//! left untouched for the next poll to pick up again.

pub mod queue;

pub use queue::WorkQueue;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::app::{AppContext, BotError};
use crate::classifier::{classify_item, Classification};
use crate::domain::Item;
use crate::handlers::Resolution;
use crate::responder::ReplyOutcome;
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    SelfPost,
    /// Seen marker present before processing began
    Duplicate,
    NoMatch,
    /// Marker lookup failed; skipped rather than risk a second reply
    StoreUnavailable,
    Processed(Vec<(Classification, BranchOutcome)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    Replied(ReplyOutcome),
    /// Finished without a reply
    Unresolvable,
    /// Left unmarked for the next cycle
    Retry,
    /// Marker lookup failed right before posting
    Skipped,
}

/// What a branch asks for once its handler has finished
enum Step {
    Reply(String),
    Finish,
    Retry,
}

/// Run one item through the pipeline.
///
/// Handlers run concurrently. Replies go out one at a time so the
/// responder's re-check sees a marker written by a sibling branch.
pub async fn process_item(ctx: &AppContext, item: &Item) -> ItemOutcome {
    if !item.has_external_link() {
        return ItemOutcome::SelfPost;
    }

    match store::ensure_unseen(&ctx.store, &item.id).await {
        Ok(()) => {}
        Err(BotError::DuplicateItem(_)) => {
            debug!(item = %item.id, url = %item.url, "Skipping duplicate");
            return ItemOutcome::Duplicate;
        }
        Err(e) => {
            warn!(item = %item.id, error = %e, "Seen lookup failed, skipping item");
            return ItemOutcome::StoreUnavailable;
        }
    }

    let kinds = classify_item(item);
    if kinds.is_empty() {
        return ItemOutcome::NoMatch;
    }

    let steps = join_all(kinds.into_iter().map(|kind| async move {
        info!(item = %item.id, %kind, url = %item.url, "Handling link");
        (kind, resolve_branch(ctx, item, kind).await)
    }))
    .await;

    let mut branches = Vec::with_capacity(steps.len());
    let mut finish = false;
    for (kind, step) in steps {
        let outcome = match step {
            Step::Reply(body) => match ctx.responder.respond(item, &body).await {
                Ok(outcome) => BranchOutcome::Replied(outcome),
                Err(e) => {
                    warn!(item = %item.id, error = %e, "Seen lookup failed before reply, skipping");
                    BranchOutcome::Skipped
                }
            },
            Step::Finish => {
                finish = true;
                BranchOutcome::Unresolvable
            }
            Step::Retry => BranchOutcome::Retry,
        };
        branches.push((kind, outcome));
    }

    // After the replies, so a dead-end branch cannot suppress a sibling's reply
    if finish {
        ctx.responder.finalize(item).await;
    }

    ItemOutcome::Processed(branches)
}

async fn resolve_branch(ctx: &AppContext, item: &Item, kind: Classification) -> Step {
    match ctx.handlers.for_kind(kind).resolve(item).await {
        Ok(Resolution::Resolved(media)) => Step::Reply(ctx.templates.render(kind, &media)),
        Ok(Resolution::Unresolvable(reason)) => {
            info!(item = %item.id, %kind, %reason, "Nothing to mirror");
            Step::Finish
        }
        Err(e) if e.is_retryable() => {
            warn!(item = %item.id, %kind, error = %e, "Upstream unavailable, retrying next cycle");
            Step::Retry
        }
        Err(BotError::BadLink(link)) => {
            info!(item = %item.id, %link, "Bad link");
            Step::Finish
        }
        Err(e @ BotError::TerminalUpstream(_)) => {
            warn!(item = %item.id, %kind, error = %e, "Could not resolve media");
            Step::Finish
        }
        Err(e) => {
            error!(item = %item.id, %kind, url = %item.url, error = %e, "Unexpected failure handling item");
            Step::Finish
        }
    }
}
