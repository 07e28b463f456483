//! Per-classification enrichment.
//!
//! Each [`Classification`] maps to exactly one handler through
//! [`Handlers::for_kind`]; adding a variant without a handler fails to compile.

pub mod direct_video;
pub mod hosted_video;
pub mod microblog;

use async_trait::async_trait;

use crate::app::Result;
use crate::classifier::Classification;
use crate::domain::{Item, ResolvedMedia};

pub use direct_video::DirectVideoHandler;
pub use hosted_video::HostedVideoHandler;
pub use microblog::MicroblogHandler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Worth a reply built from this media
    Resolved(ResolvedMedia),
    /// Nothing usable; the item is finished without a reply
    Unresolvable(String),
}

#[async_trait]
pub trait Handler: Send + Sync {
    /// Resolve media for `item`.
    ///
    /// Errors other than [`BotError::TransientUpstream`](crate::app::BotError::TransientUpstream)
    /// are final for the item.
    async fn resolve(&self, item: &Item) -> Result<Resolution>;
}

pub struct Handlers {
    pub direct_video: DirectVideoHandler,
    pub microblog: MicroblogHandler,
    pub hosted_video: HostedVideoHandler,
}

impl Handlers {
    pub fn for_kind(&self, kind: Classification) -> &dyn Handler {
        match kind {
            Classification::DirectVideo => &self.direct_video,
            Classification::MicroblogLink => &self.microblog,
            Classification::HostedVideoLink => &self.hosted_video,
        }
    }
}
