//! No-op handler: terminal target for updates nothing else wants. The
//! pipeline still runs for them, so tracking and anti-spam stay current.

use async_trait::async_trait;
use zultra_core::{Result, Update, UpdateContext, UpdateHandler};

#[derive(Clone, Default)]
pub struct NoOpHandler;

impl NoOpHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UpdateHandler for NoOpHandler {
    async fn handle(&self, _update: &Update, _ctx: &UpdateContext) -> Result<()> {
        Ok(())
    }
}
