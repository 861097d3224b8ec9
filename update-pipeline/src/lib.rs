//! # Update pipeline
//!
//! Runs an ordered chain of middleware stages around one handler per update.
//! Stages run in registration order (`process_update`); the first stage that
//! returns false vetoes the update: no later stage runs, the handler does not
//! run, and no `post_process` hook fires. After a completed handler,
//! `post_process` runs in reverse registration order. A fault inside a stage
//! is logged, counted, and treated as "continue" — the pipeline fails open.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};
use zultra_core::{Middleware, Result, Update, UpdateContext, UpdateHandler};

/// Outcome of dispatching one update through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every stage admitted the update and the handler completed.
    Handled,
    /// The named stage vetoed; the handler never ran.
    Vetoed { stage: &'static str },
}

/// Counters for one registered stage. Snapshots feed the health report.
#[derive(Debug, Clone, Serialize)]
pub struct MiddlewareStats {
    pub name: String,
    pub processed: u64,
    pub errors: u64,
    pub error_rate: f64,
    pub uptime_seconds: u64,
}

struct StageEntry {
    stage: Arc<dyn Middleware>,
    processed: AtomicU64,
    errors: AtomicU64,
    registered_at: Instant,
}

impl StageEntry {
    fn snapshot(&self) -> MiddlewareStats {
        let processed = self.processed.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let error_rate = if processed == 0 {
            0.0
        } else {
            errors as f64 / processed as f64
        };
        MiddlewareStats {
            name: self.stage.name().to_string(),
            processed,
            errors,
            error_rate,
            uptime_seconds: self.registered_at.elapsed().as_secs(),
        }
    }
}

/// Ordered middleware chain wrapped around update handlers.
#[derive(Clone)]
pub struct UpdatePipeline {
    stages: Vec<Arc<StageEntry>>,
}

impl UpdatePipeline {
    /// Creates an empty pipeline (every update goes straight to the handler).
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage; stages run in the order they were registered.
    pub fn register(mut self, stage: Arc<dyn Middleware>) -> Self {
        self.stages.push(Arc::new(StageEntry {
            stage,
            processed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            registered_at: Instant::now(),
        }));
        self
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Names of the registered stages, in run order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|e| e.stage.name()).collect()
    }

    /// Per-stage counters for the health report.
    pub fn stats(&self) -> Vec<MiddlewareStats> {
        self.stages.iter().map(|e| e.snapshot()).collect()
    }

    /// Runs the stages around `handler` for one update. A handler error
    /// propagates to the caller and skips every `post_process` hook.
    #[instrument(skip(self, update, handler), fields(update_id = update.update_id))]
    pub async fn dispatch(
        &self,
        update: &Update,
        handler: &dyn UpdateHandler,
    ) -> Result<DispatchOutcome> {
        let mut ctx = UpdateContext::new();

        info!(
            user_id = ?update.user_id(),
            chat_id = ?update.chat_id(),
            kind = update.kind_name(),
            "step: pipeline started"
        );

        let mut ran: Vec<&Arc<StageEntry>> = Vec::with_capacity(self.stages.len());
        for entry in &self.stages {
            let name = entry.stage.name();
            if !entry.stage.is_enabled() {
                info!(middleware = name, "step: middleware disabled, skipped");
                continue;
            }

            entry.processed.fetch_add(1, Ordering::Relaxed);
            match entry.stage.process_update(update, &mut ctx).await {
                Ok(true) => ran.push(entry),
                Ok(false) => {
                    info!(
                        user_id = ?update.user_id(),
                        middleware = name,
                        "step: middleware vetoed update"
                    );
                    return Ok(DispatchOutcome::Vetoed { stage: name });
                }
                Err(e) => {
                    // Fail open: a broken stage must not take the bot down.
                    entry.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        middleware = name,
                        error = %e,
                        "step: middleware failed, treating as continue"
                    );
                    ran.push(entry);
                }
            }
        }

        let handler_name = std::any::type_name_of_val(handler);
        info!(
            user_id = ?update.user_id(),
            handler = %handler_name,
            "step: handler processing"
        );
        handler.handle(update, &ctx).await?;
        info!(handler = %handler_name, "step: handler done");

        // post_process in reverse order, last registered first.
        for entry in ran.iter().rev() {
            if let Err(e) = entry.stage.post_process(update, &mut ctx).await {
                entry.errors.fetch_add(1, Ordering::Relaxed);
                warn!(
                    middleware = entry.stage.name(),
                    error = %e,
                    "step: middleware post_process failed, ignored"
                );
            }
        }

        info!(update_id = update.update_id, "step: pipeline finished");
        Ok(DispatchOutcome::Handled)
    }
}

impl Default for UpdatePipeline {
    fn default() -> Self {
        Self::new()
    }
}

// Behavior tests live in tests/pipeline_test.rs
