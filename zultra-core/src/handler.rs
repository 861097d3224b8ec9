//! Handler trait: the unit of work behind the pipeline.

use async_trait::async_trait;

use crate::context::UpdateContext;
use crate::error::Result;
use crate::types::Update;

/// Processes one update after the pipeline admits it. Replies are side
/// effects through [`crate::Bot`]; errors propagate to the dispatcher's
/// fault reporter, never to the transport loop.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: &Update, ctx: &UpdateContext) -> Result<()>;
}
