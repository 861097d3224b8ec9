//! Health report assembly for the `/health` command and monitoring.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use update_pipeline::{MiddlewareStats, UpdatePipeline};

use middleware::LoggingMiddleware;
use storage::SqlitePoolManager;

use crate::cache::SharedCache;
use crate::handlers::SharedAi;
use crate::lifecycle::LifecycleState;

/// Snapshot of everything the bot knows about its own health.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub state: String,
    pub uptime_seconds: u64,
    pub uptime: String,
    pub database: bool,
    pub cache: String,
    pub ai: BTreeMap<String, String>,
    pub middleware: Vec<MiddlewareStats>,
    pub slow_requests: usize,
    pub generated_at: DateTime<Utc>,
}

/// Gathers the health report from the live components. Constructed during
/// initialization and shared with the `/health` handler.
pub struct HealthService {
    state: Arc<Mutex<LifecycleState>>,
    started_at: Arc<RwLock<Option<Instant>>>,
    pipeline: UpdatePipeline,
    pool: SqlitePoolManager,
    logging: Arc<LoggingMiddleware>,
    ai: SharedAi,
    cache: SharedCache,
}

impl HealthService {
    pub fn new(
        state: Arc<Mutex<LifecycleState>>,
        started_at: Arc<RwLock<Option<Instant>>>,
        pipeline: UpdatePipeline,
        pool: SqlitePoolManager,
        logging: Arc<LoggingMiddleware>,
        ai: SharedAi,
        cache: SharedCache,
    ) -> Self {
        Self {
            state,
            started_at,
            pipeline,
            pool,
            logging,
            ai,
            cache,
        }
    }

    pub async fn report(&self) -> HealthReport {
        let state = self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_str()
            .to_string();
        let uptime = self
            .started_at
            .read()
            .await
            .map(|started| started.elapsed())
            .unwrap_or_default();

        let database = self.pool.health_check().await;

        let probe = self.cache.read().await.clone();
        let cache = match &probe {
            Some(probe) => {
                if probe.ping().await {
                    "connected"
                } else {
                    "unavailable"
                }
            }
            None => "not configured",
        }
        .to_string();

        let ai = match self.ai.read().await.clone() {
            Some(orchestrator) => orchestrator.health_check(),
            None => BTreeMap::from([
                ("openai".to_string(), "not configured".to_string()),
                ("gemini".to_string(), "not configured".to_string()),
            ]),
        };

        HealthReport {
            status: roll_up(database, &cache).to_string(),
            state,
            uptime_seconds: uptime.as_secs(),
            uptime: format_uptime(uptime),
            database,
            cache,
            ai,
            middleware: self.pipeline.stats(),
            slow_requests: self.logging.slow_requests().len(),
            generated_at: Utc::now(),
        }
    }
}

/// Overall status: the database is load-bearing, the cache only degrades.
fn roll_up(database: bool, cache: &str) -> &'static str {
    if !database {
        "unhealthy"
    } else if cache == "unavailable" {
        "degraded"
    } else {
        "healthy"
    }
}

/// `1d 2h 3m 4s`, omitting leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}
