// src/notify/mod.rs
pub mod email;

use anyhow::Result;

use crate::rank::Selection;

/// Delivery collaborator. The commit coordinator gates on this result:
/// commit only after `deliver` returned Ok.
#[async_trait::async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, selection: &Selection) -> Result<()>;
}
