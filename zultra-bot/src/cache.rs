//! Optional Redis probe. The cache is best-effort: connection failures at
//! startup leave it absent, and the health report is its only consumer.

use std::sync::Arc;

use tokio::sync::RwLock;
use zultra_core::{BotError, Result};

/// Late-bound cache slot, filled during initialization when Redis answers.
pub type SharedCache = Arc<RwLock<Option<CacheProbe>>>;

#[derive(Clone)]
pub struct CacheProbe {
    client: redis::Client,
}

impl CacheProbe {
    /// Opens a client and verifies connectivity with a `PING`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| BotError::ExternalService(format!("redis client: {}", e)))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BotError::ExternalService(format!("redis connect: {}", e)))?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| BotError::ExternalService(format!("redis ping: {}", e)))?;
        if pong != "PONG" {
            return Err(BotError::ExternalService(format!(
                "unexpected PING response: {}",
                pong
            )));
        }
        Ok(Self { client })
    }

    /// Health probe over a fresh connection.
    pub async fn ping(&self) -> bool {
        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .is_ok(),
            Err(_) => false,
        }
    }
}
