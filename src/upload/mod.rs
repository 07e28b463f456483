//! Mirroring a remote video onto the hosting service.

pub mod streamable;

use async_trait::async_trait;

use crate::app::Result;

pub use streamable::StreamableClient;

#[async_trait]
pub trait UploadService {
    /// Ask the service to import `source_url`; returns the new short code.
    ///
    /// A gateway timeout comes back as
    /// [`BotError::TransientUpstream`](crate::app::BotError::TransientUpstream);
    /// everything else that goes wrong is terminal.
    async fn import(&self, source_url: &str) -> Result<String>;

    /// Public link for a short code returned by [`import`](Self::import).
    fn share_url(&self, shortcode: &str) -> String;
}
