use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{Item, ResolvedMedia};
use crate::handlers::{Handler, Resolution};

/// Links already on the hosting service get the mirrors notice as-is.
#[derive(Debug, Default, Clone)]
pub struct HostedVideoHandler;

#[async_trait]
impl Handler for HostedVideoHandler {
    async fn resolve(&self, _item: &Item) -> Result<Resolution> {
        Ok(Resolution::Resolved(ResolvedMedia::none()))
    }
}
