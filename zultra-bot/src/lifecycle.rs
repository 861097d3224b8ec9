//! Bot lifecycle: the state machine, the gated initialization sequence, and
//! start/shutdown orchestration.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ai_orchestrator::AiOrchestrator;
use teloxide::requests::{Request, Requester};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use update_pipeline::UpdatePipeline;

use middleware::{
    AntiSpamMiddleware, LoggingMiddleware, PermissionMiddleware, RateLimitMiddleware,
    UserTrackingMiddleware, REPEAT_WINDOW,
};
use storage::{GroupRepository, SqlitePoolManager, UserRepository};
use zultra_core::{Bot, BotError, Result};
use zultra_telegram::TelegramBotAdapter;

use crate::cache::{CacheProbe, SharedCache};
use crate::dispatcher::UpdateDispatcher;
use crate::faults::FaultReporter;
use crate::handlers::{
    AskHandler, ChatFallbackHandler, HealthHandler, HelpHandler, IdHandler, PingHandler,
    ReloadHandler, SharedAi, StartHandler, StatsHandler, UptimeHandler,
};
use crate::health::{HealthReport, HealthService};
use crate::registry::{AdminGate, CommandRegistry};
use crate::runtime;
use crate::settings::{Settings, SettingsStore};

const PERSISTENCE_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Must exceed the long-poll timeout in [`crate::runtime`].
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle states, strictly forward. `Failed` is reachable from
/// `Initializing` and `Starting`; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Initialized,
    Starting,
    Running,
    ShuttingDown,
    Stopped,
    Failed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

/// Everything a started bot runs on, built during initialization.
#[derive(Clone)]
struct Components {
    pool: SqlitePoolManager,
    telegram: teloxide::Bot,
    dispatcher: Arc<UpdateDispatcher>,
    health: Arc<HealthService>,
    rate_limit: Arc<RateLimitMiddleware>,
    anti_spam: Arc<AntiSpamMiddleware>,
    window: Duration,
}

/// The bot itself: owns the lifecycle state, the cancellation token, and the
/// components assembled by [`ZultraBot::initialize`].
pub struct ZultraBot {
    store: Arc<SettingsStore>,
    state: Arc<Mutex<LifecycleState>>,
    cancel: CancellationToken,
    started_at: Arc<RwLock<Option<Instant>>>,
    components: tokio::sync::Mutex<Option<Components>>,
    tasks: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl ZultraBot {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(LifecycleState::Uninitialized)),
            cancel: CancellationToken::new(),
            started_at: Arc::new(RwLock::new(None)),
            components: tokio::sync::Mutex::new(None),
            tasks: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        info!(from = state.as_str(), to = next.as_str(), "Lifecycle transition");
        *state = next;
    }

    /// Time since entering the running state.
    pub async fn uptime(&self) -> Option<Duration> {
        self.started_at
            .read()
            .await
            .map(|started| started.elapsed())
    }

    /// Health snapshot; `None` before initialization completes.
    pub async fn health_report(&self) -> Option<HealthReport> {
        let health = self
            .components
            .lock()
            .await
            .as_ref()
            .map(|components| components.health.clone())?;
        Some(health.report().await)
    }

    /// Runs the gated initialization sequence: persistence (with retries),
    /// transport client, fault reporter, middleware stages, command
    /// registry, best-effort auxiliaries, and the connectivity self-check.
    /// Any failure outside the best-effort step marks the bot failed.
    pub async fn initialize(&self) -> Result<()> {
        if self.state() != LifecycleState::Uninitialized {
            return Err(BotError::Config(format!(
                "initialize called in state {}",
                self.state().as_str()
            )));
        }
        self.set_state(LifecycleState::Initializing);
        let settings = self.store.current();
        info!(
            environment = settings.environment.as_str(),
            "Initializing bot"
        );

        let pool = match self.connect_persistence(&settings).await {
            Ok(pool) => pool,
            Err(e) => return self.abort_init(e, None).await,
        };

        match self.assemble(&settings, pool.clone()).await {
            Ok(components) => {
                *self.components.lock().await = Some(components);
                self.set_state(LifecycleState::Initialized);
                info!("Initialization complete");
                Ok(())
            }
            Err(e) => self.abort_init(e, Some(pool)).await,
        }
    }

    async fn abort_init(&self, error: BotError, pool: Option<SqlitePoolManager>) -> Result<()> {
        error!(error = %error, "Initialization aborted");
        if let Some(pool) = pool {
            pool.close().await;
        }
        self.set_state(LifecycleState::Failed);
        Err(error)
    }

    async fn connect_persistence(&self, settings: &Settings) -> Result<SqlitePoolManager> {
        let mut delay = INITIAL_BACKOFF;
        let mut last_error = String::new();
        for attempt in 1..=PERSISTENCE_ATTEMPTS {
            match SqlitePoolManager::new(&settings.database_url).await {
                Ok(pool) => {
                    info!(attempt, "Persistence connected");
                    return Ok(pool);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Persistence connection failed");
                    last_error = e.to_string();
                    if attempt < PERSISTENCE_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }
        Err(BotError::Persistence(format!(
            "database unreachable after {} attempts: {}",
            PERSISTENCE_ATTEMPTS, last_error
        )))
    }

    async fn assemble(&self, settings: &Settings, pool: SqlitePoolManager) -> Result<Components> {
        let users = UserRepository::new(pool.clone())
            .await
            .map_err(|e| BotError::Persistence(e.to_string()))?;
        let groups = GroupRepository::new(pool.clone())
            .await
            .map_err(|e| BotError::Persistence(e.to_string()))?;

        // Transport client. The request timeout must cover a full long poll.
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BotError::Transport(format!("http client: {}", e)))?;
        let telegram = teloxide::Bot::with_client(settings.bot_token.clone(), http);
        let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(telegram.clone()));

        let staff: HashSet<i64> = settings
            .owner_ids
            .union(&settings.admin_ids)
            .copied()
            .collect();
        let faults = Arc::new(FaultReporter::new(bot.clone(), staff));

        // Middleware stages, in pipeline order.
        let logging = Arc::new(LoggingMiddleware::new());
        let tracking = Arc::new(UserTrackingMiddleware::new(users.clone(), groups.clone()));
        let rate_limit = Arc::new(RateLimitMiddleware::new(
            settings.rate_limit_messages,
            settings.rate_limit_window(),
            bot.clone(),
        ));
        let anti_spam = Arc::new(AntiSpamMiddleware::new(
            settings.spam_keywords.clone(),
            bot.clone(),
        ));
        let permission = Arc::new(PermissionMiddleware::new(
            settings.owner_ids.clone(),
            settings.admin_ids.clone(),
        ));
        let pipeline = UpdatePipeline::new()
            .register(logging.clone())
            .register(tracking)
            .register(rate_limit.clone())
            .register(anti_spam.clone())
            .register(permission);

        let ai_slot: SharedAi = Arc::new(RwLock::new(None));
        let cache_slot: SharedCache = Arc::new(RwLock::new(None));
        let health = Arc::new(HealthService::new(
            self.state.clone(),
            self.started_at.clone(),
            pipeline.clone(),
            pool.clone(),
            logging,
            ai_slot.clone(),
            cache_slot.clone(),
        ));

        let registry = self.build_registry(&bot, &users, &groups, &pipeline, &ai_slot, &health)?;
        info!(commands = registry.len(), "Command registry built");

        let gate = AdminGate::new(&settings.owner_ids, &settings.admin_ids);
        let fallback = Arc::new(ChatFallbackHandler::new(bot.clone(), ai_slot.clone()));
        let dispatcher = Arc::new(UpdateDispatcher::new(
            pipeline.clone(),
            Arc::new(registry),
            gate,
            fallback,
            faults,
            bot.clone(),
        ));

        // Best-effort auxiliaries; failures degrade, never abort.
        match AiOrchestrator::new(
            settings.openai_api_key.clone(),
            settings.gemini_api_key.clone(),
        ) {
            Ok(orchestrator) if orchestrator.is_configured() => {
                info!("AI orchestrator configured");
                *ai_slot.write().await = Some(Arc::new(orchestrator));
            }
            Ok(_) => info!("No AI provider configured; AI replies disabled"),
            Err(e) => warn!(error = %e, "AI orchestrator unavailable; continuing without it"),
        }
        if let Some(url) = &settings.redis_url {
            match CacheProbe::connect(url).await {
                Ok(probe) => {
                    info!("Cache connected");
                    *cache_slot.write().await = Some(probe);
                }
                Err(e) => warn!(error = %e, "Cache unavailable; continuing without it"),
            }
        }

        // Connectivity self-check.
        let me = telegram
            .get_me()
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("connectivity check failed: {}", e)))?;
        info!(username = me.username(), "Connected to Telegram");

        Ok(Components {
            pool,
            telegram,
            dispatcher,
            health,
            rate_limit,
            anti_spam,
            window: settings.rate_limit_window(),
        })
    }

    fn build_registry(
        &self,
        bot: &Arc<dyn Bot>,
        users: &UserRepository,
        groups: &GroupRepository,
        pipeline: &UpdatePipeline,
        ai: &SharedAi,
        health: &Arc<HealthService>,
    ) -> Result<CommandRegistry> {
        let registry = CommandRegistry::new()
            .register(
                "start",
                "Introduce the bot",
                Arc::new(StartHandler::new(bot.clone())),
            )?
            .register(
                "ping",
                "Round-trip check",
                Arc::new(PingHandler::new(bot.clone())),
            )?
            .register(
                "uptime",
                "Show time since start",
                Arc::new(UptimeHandler::new(bot.clone(), self.started_at.clone())),
            )?
            .register(
                "id",
                "Show your user and chat ids",
                Arc::new(IdHandler::new(bot.clone())),
            )?
            .register(
                "stats",
                "Show tracking and pipeline counters",
                Arc::new(StatsHandler::new(
                    bot.clone(),
                    users.clone(),
                    groups.clone(),
                    pipeline.clone(),
                )),
            )?
            .register(
                "ask",
                "Ask the AI assistant",
                Arc::new(AskHandler::new(bot.clone(), ai.clone())),
            )?
            .register_admin(
                "health",
                "Full health report",
                Arc::new(HealthHandler::new(bot.clone(), health.clone())),
            )?
            .register_admin(
                "reload",
                "Reload settings from the environment",
                Arc::new(ReloadHandler::new(bot.clone(), self.store.clone())),
            )?;

        let public = registry.describe_public();
        registry.register(
            "help",
            "List available commands",
            Arc::new(HelpHandler::new(bot.clone(), public)),
        )
    }

    /// Brings the serving mode up: webhook when a public URL is configured,
    /// long-polling otherwise. Only valid from `Initialized`.
    pub async fn start(&self) -> Result<()> {
        if self.state() != LifecycleState::Initialized {
            return Err(BotError::Config(format!(
                "start called in state {}",
                self.state().as_str()
            )));
        }
        self.set_state(LifecycleState::Starting);
        let settings = self.store.current();
        let components = match self.components.lock().await.clone() {
            Some(components) => components,
            None => {
                self.set_state(LifecycleState::Failed);
                return Err(BotError::Unexpected(
                    "initialized without components".to_string(),
                ));
            }
        };

        let webhook_listener = match settings.webhook_url() {
            Some(url) => {
                match runtime::prepare_webhook(
                    &components.telegram,
                    url,
                    &settings.webhook_host,
                    settings.webhook_port,
                )
                .await
                {
                    Ok(listener) => Some(listener),
                    Err(e) => {
                        error!(error = %e, "Failed to stand up webhook");
                        self.set_state(LifecycleState::Failed);
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        *self.started_at.write().await = Some(Instant::now());

        let serving = match webhook_listener {
            Some(listener) => {
                info!(path = %settings.webhook_path, "Serving in webhook mode");
                tokio::spawn(runtime::serve_webhook(
                    components.telegram.clone(),
                    components.dispatcher.clone(),
                    listener,
                    settings.webhook_path.clone(),
                    self.cancel.clone(),
                ))
            }
            None => {
                info!("Serving in long-poll mode");
                tokio::spawn(runtime::run_polling(
                    components.telegram.clone(),
                    components.dispatcher.clone(),
                    self.cancel.clone(),
                ))
            }
        };
        let sweeper = self.spawn_sweeper(
            components.rate_limit.clone(),
            components.anti_spam.clone(),
            components.window,
        );
        self.tasks.lock().await.extend([serving, sweeper]);

        self.set_state(LifecycleState::Running);
        info!("Bot is running");
        Ok(())
    }

    fn spawn_sweeper(
        &self,
        rate_limit: Arc<RateLimitMiddleware>,
        anti_spam: Arc<AntiSpamMiddleware>,
        window: Duration,
    ) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {
                        // Double the window so a still-live window is never swept.
                        let dropped = rate_limit.sweep_idle(window * 2)
                            + anti_spam.sweep_idle(REPEAT_WINDOW * 2);
                        if dropped > 0 {
                            debug!(dropped, "Swept idle per-user state");
                        }
                    }
                }
            }
        })
    }

    /// Fires the single-shot shutdown signal, waits for the serving tasks to
    /// drain, and releases resources. Idempotent: later calls return
    /// immediately.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if matches!(
                *state,
                LifecycleState::ShuttingDown | LifecycleState::Stopped
            ) {
                return;
            }
            info!(from = state.as_str(), to = "shutting_down", "Lifecycle transition");
            *state = LifecycleState::ShuttingDown;
        }

        self.cancel.cancel();

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }

        if let Some(components) = self.components.lock().await.take() {
            components.pool.close().await;
        }

        self.set_state(LifecycleState::Stopped);
        info!("Shutdown complete");
    }
}
