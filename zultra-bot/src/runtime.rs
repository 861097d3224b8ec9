//! Serving modes: the long-poll loop and the webhook listener.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use teloxide::prelude::*;
use teloxide::requests::Request;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use zultra_core::{BotError, Result, ToCoreUpdate};
use zultra_telegram::TelegramUpdateWrapper;

use crate::dispatcher::UpdateDispatcher;

/// Long-poll request timeout. The HTTP client's own timeout must exceed it.
const POLL_TIMEOUT_SECS: u32 = 25;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polls `getUpdates` until `cancel` fires, spawning one task per update.
pub async fn run_polling(
    bot: teloxide::Bot,
    dispatcher: Arc<UpdateDispatcher>,
    cancel: CancellationToken,
) {
    info!("Long-poll loop started");
    let mut offset: Option<i32> = None;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let mut request = bot.get_updates().timeout(POLL_TIMEOUT_SECS);
        if let Some(offset) = offset {
            request = request.offset(offset);
        }

        let updates = tokio::select! {
            _ = cancel.cancelled() => break,
            result = request.send() => match result {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "get_updates failed; retrying in 5s");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                    continue;
                }
            },
        };

        for update in updates {
            offset = Some(update.id.0 as i32 + 1);
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let core = TelegramUpdateWrapper(&update).to_core();
                dispatcher.dispatch(&core).await;
            });
        }
    }

    info!("Long-poll loop stopped");
}

#[derive(Clone)]
struct WebhookState {
    dispatcher: Arc<UpdateDispatcher>,
}

/// Registers the webhook with Telegram and binds the local listener. Runs
/// synchronously during start so a failure marks the lifecycle failed.
pub async fn prepare_webhook(
    bot: &teloxide::Bot,
    public_url: &str,
    host: &str,
    port: u16,
) -> Result<TcpListener> {
    let url = url::Url::parse(public_url)
        .map_err(|e| BotError::Config(format!("invalid WEBHOOK_URL: {}", e)))?;

    // Clear any stale registration before installing ours.
    bot.delete_webhook()
        .send()
        .await
        .map_err(|e| BotError::Transport(format!("delete_webhook: {}", e)))?;
    bot.set_webhook(url)
        .send()
        .await
        .map_err(|e| BotError::Transport(format!("set_webhook: {}", e)))?;

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(BotError::Io)?;
    info!(addr = %addr, "Webhook listener bound");
    Ok(listener)
}

/// Serves the webhook until `cancel` fires, then deregisters it.
pub async fn serve_webhook(
    bot: teloxide::Bot,
    dispatcher: Arc<UpdateDispatcher>,
    listener: TcpListener,
    path: String,
    cancel: CancellationToken,
) {
    let app = Router::new()
        .route(&path, post(receive_update))
        .with_state(WebhookState { dispatcher });

    info!(path = %path, "Webhook server started");
    let shutdown = cancel.clone();
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
    {
        error!(error = %e, "Webhook server failed");
    }

    if let Err(e) = bot.delete_webhook().send().await {
        warn!(error = %e, "Failed to deregister webhook during shutdown");
    }
    info!("Webhook server stopped");
}

async fn receive_update(
    State(state): State<WebhookState>,
    body: std::result::Result<Json<teloxide::types::Update>, JsonRejection>,
) -> StatusCode {
    let Json(update) = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Rejected malformed webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    tokio::spawn(async move {
        let core = TelegramUpdateWrapper(&update).to_core();
        state.dispatcher.dispatch(&core).await;
    });
    StatusCode::OK
}
