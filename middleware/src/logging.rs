//! Logging stage: request metadata before handling, elapsed time after,
//! with a bounded ring of recent slow requests for the health report.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use zultra_core::{Middleware, Result, Update, UpdateContext};

/// The slow-request ring keeps at most this many entries; the oldest is
/// evicted first.
pub const SLOW_REQUEST_CAPACITY: usize = 100;

const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(5);

/// One request that exceeded the slow threshold.
#[derive(Debug, Clone, Serialize)]
pub struct SlowRequest {
    pub update_id: i64,
    pub user_id: Option<i64>,
    pub kind: String,
    pub elapsed_ms: u64,
    pub at: DateTime<Utc>,
}

pub struct LoggingMiddleware {
    slow_threshold: Duration,
    slow_requests: Mutex<VecDeque<SlowRequest>>,
    enabled: AtomicBool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SLOW_THRESHOLD)
    }

    pub fn with_threshold(slow_threshold: Duration) -> Self {
        Self {
            slow_threshold,
            slow_requests: Mutex::new(VecDeque::with_capacity(SLOW_REQUEST_CAPACITY)),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Snapshot of the slow-request ring, oldest first.
    pub fn slow_requests(&self) -> Vec<SlowRequest> {
        self.slow_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn record_slow(&self, slow: SlowRequest) {
        let mut ring = self
            .slow_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if ring.len() == SLOW_REQUEST_CAPACITY {
            ring.pop_front();
        }
        ring.push_back(slow);
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[instrument(skip(self, update, _ctx))]
    async fn process_update(&self, update: &Update, _ctx: &mut UpdateContext) -> Result<bool> {
        info!(
            update_id = update.update_id,
            kind = update.kind_name(),
            user_id = ?update.user_id(),
            chat_id = ?update.chat_id(),
            content = %update.content_preview(),
            "Received update"
        );
        Ok(true)
    }

    #[instrument(skip(self, update, ctx))]
    async fn post_process(&self, update: &Update, ctx: &mut UpdateContext) -> Result<()> {
        let elapsed = ctx.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        info!(
            update_id = update.update_id,
            elapsed_ms, "Finished processing update"
        );

        if elapsed > self.slow_threshold {
            warn!(
                update_id = update.update_id,
                elapsed_ms,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow request"
            );
            self.record_slow(SlowRequest {
                update_id: update.update_id,
                user_id: update.user_id(),
                kind: update.kind_name().to_string(),
                elapsed_ms,
                at: Utc::now(),
            });
        }

        Ok(())
    }
}
