//! Routes one update to its handler through the middleware pipeline.

use std::sync::Arc;

use tracing::{debug, warn};
use update_pipeline::{DispatchOutcome, UpdatePipeline};
use zultra_core::{Bot, Update, UpdateHandler};

use crate::faults::FaultReporter;
use crate::handlers::{NoOpHandler, UnknownCommandHandler};
use crate::registry::{AdminGate, CommandRegistry};

/// Per-update entry point. Resolves the handler, applies the admin gate,
/// runs the pipeline, and absorbs every failure; nothing propagates to the
/// transport loop.
pub struct UpdateDispatcher {
    pipeline: UpdatePipeline,
    registry: Arc<CommandRegistry>,
    gate: AdminGate,
    fallback: Arc<dyn UpdateHandler>,
    unknown: Arc<dyn UpdateHandler>,
    noop: Arc<dyn UpdateHandler>,
    faults: Arc<FaultReporter>,
    bot: Arc<dyn Bot>,
}

impl UpdateDispatcher {
    pub fn new(
        pipeline: UpdatePipeline,
        registry: Arc<CommandRegistry>,
        gate: AdminGate,
        fallback: Arc<dyn UpdateHandler>,
        faults: Arc<FaultReporter>,
        bot: Arc<dyn Bot>,
    ) -> Self {
        Self {
            pipeline,
            registry,
            gate,
            fallback,
            unknown: Arc::new(UnknownCommandHandler::new(bot.clone())),
            noop: Arc::new(NoOpHandler::new()),
            faults,
            bot,
        }
    }

    pub async fn dispatch(&self, update: &Update) {
        let (handler, admin_only) = self.resolve(update);

        // The gate runs before the pipeline: a refused admin command never
        // touches rate-limit or anti-spam state.
        if admin_only && !self.gate.permits(update.user_id()) {
            warn!(
                user_id = ?update.user_id(),
                command = ?update.command(),
                "Admin command refused"
            );
            if let Err(e) = self
                .bot
                .reply_to(update, "You are not permitted to use this command.")
                .await
            {
                warn!(error = %e, "Failed to send refusal notice");
            }
            return;
        }

        match self.pipeline.dispatch(update, handler.as_ref()).await {
            Ok(DispatchOutcome::Handled) => {}
            Ok(DispatchOutcome::Vetoed { stage }) => {
                debug!(update_id = update.update_id, stage, "Update vetoed");
            }
            Err(fault) => self.faults.report(update, fault).await,
        }
    }

    /// Command → registry (or the unknown-command reply); plain text → chat
    /// fallback; anything else → no-op.
    fn resolve(&self, update: &Update) -> (Arc<dyn UpdateHandler>, bool) {
        match update.command() {
            Some(name) => match self.registry.get(name) {
                Some(command) => (command.handler.clone(), command.admin_only),
                None => (self.unknown.clone(), false),
            },
            None if update.text().is_some() => (self.fallback.clone(), false),
            None => (self.noop.clone(), false),
        }
    }
}
