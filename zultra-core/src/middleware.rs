//! Middleware trait: veto-capable pipeline stages.

use async_trait::async_trait;

use crate::context::UpdateContext;
use crate::error::Result;
use crate::types::Update;

/// One pipeline stage. `process_update` runs before the handler in
/// registration order and may veto by returning `Ok(false)`; `post_process`
/// runs after a completed handler in reverse registration order.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Stable name used in logs and stats.
    fn name(&self) -> &'static str;

    /// Disabled stages are skipped entirely, pre and post.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Pre-handler filter. `Ok(false)` vetoes the update: no later stage
    /// runs, the handler does not run, and no `post_process` hook fires.
    /// Side effects (e.g. a warning reply) are allowed before vetoing.
    async fn process_update(&self, update: &Update, ctx: &mut UpdateContext) -> Result<bool>;

    /// Post-handler hook; runs only when the handler completed.
    async fn post_process(&self, _update: &Update, _ctx: &mut UpdateContext) -> Result<()> {
        Ok(())
    }
}
