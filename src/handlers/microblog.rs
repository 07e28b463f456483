use std::sync::Arc;

use async_trait::async_trait;

use crate::app::{BotError, Result};
use crate::domain::{Item, ResolvedMedia};
use crate::handlers::{Handler, Resolution};
use crate::microblog::{post_id_from_url, MicroblogApi};
use crate::upload::UploadService;

/// Mirrors native microblog videos onto the hosting service.
pub struct MicroblogHandler {
    api: Arc<dyn MicroblogApi + Send + Sync>,
    uploads: Arc<dyn UploadService + Send + Sync>,
}

impl MicroblogHandler {
    pub fn new(
        api: Arc<dyn MicroblogApi + Send + Sync>,
        uploads: Arc<dyn UploadService + Send + Sync>,
    ) -> Self {
        Self { api, uploads }
    }
}

#[async_trait]
impl Handler for MicroblogHandler {
    async fn resolve(&self, item: &Item) -> Result<Resolution> {
        let post_id =
            post_id_from_url(&item.url).ok_or_else(|| BotError::BadLink(item.url.clone()))?;

        let post = self
            .api
            .get_post(&post_id)
            .await
            .map_err(|e| BotError::TerminalUpstream(format!("post {} lookup: {}", post_id, e)))?;

        match post.first_media_kind() {
            None => {
                return Ok(Resolution::Unresolvable(format!(
                    "post {} has no attached media",
                    post_id
                )))
            }
            Some("video") => {}
            Some(other) => {
                return Ok(Resolution::Unresolvable(format!(
                    "post {} carries {} rather than video",
                    post_id, other
                )))
            }
        }

        // A gateway timeout surfaces unchanged so the item stays unmarked
        let shortcode = self.uploads.import(&item.url).await?;

        tracing::info!(item = %item.id, post = %post_id, shortcode = %shortcode, "Mirrored post video");
        Ok(Resolution::Resolved(ResolvedMedia::new(
            self.uploads.share_url(&shortcode),
            post.single_line_text(),
        )))
    }
}
