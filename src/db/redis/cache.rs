use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Aggregated decision/feedback stats for one user at one generation
    UserStats { user_id: Uuid, generation: u64 },
    /// Counter bumped whenever a user's stats go stale
    StatsGeneration(Uuid),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::UserStats {
                user_id,
                generation,
            } => write!(f, "stats:{}:{}", user_id, generation),
            CacheKey::StatsGeneration(user_id) => write!(f, "stats-gen:{}", user_id),
        }
    }
}

/// Creates a Redis client for caching
///
/// The client connects lazily, so this only validates the URL.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Work item for the background writer
struct CacheCommand {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheCommand>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending commands and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a new Cache instance with a background writer task
    ///
    /// Writes are queued on a channel so request handlers never wait on
    /// Redis for them.
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    /// Applies queued commands until shutdown, then drains what is left
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheCommand>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(command) = write_rx.recv() => {
                    if let Err(e) = Self::apply(&client, command).await {
                        tracing::error!(error = %e, "Failed to apply Redis cache command");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(command) = write_rx.recv().await {
                        if let Err(e) = Self::apply(&client, command).await {
                            tracing::error!(error = %e, "Failed to flush cache command during shutdown");
                        }
                        flushed += 1;
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn apply(client: &Client, command: CacheCommand) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(command.key, command.value, command.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a write; returns without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let command = CacheCommand {
            key: key.to_string(),
            value: json,
            ttl,
        };
        if let Err(e) = self.write_tx.send(command) {
            tracing::error!(error = %e, "Failed to queue cache command");
        }
    }

    /// Current value of a generation counter, 0 when unset
    pub async fn generation(&self, key: &CacheKey) -> AppResult<u64> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: Option<u64> = conn.get(key.to_string()).await?;
        Ok(value.unwrap_or(0))
    }

    /// Bumps a generation counter so entries keyed on older values are never read again
    ///
    /// Awaited rather than queued. A read that sampled the old generation may
    /// still queue its write afterwards, but only under the old key.
    pub async fn bump_generation(&self, key: &CacheKey) -> AppResult<u64> {
        tracing::debug!(key = %key, "Bumping cache generation");
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: u64 = conn.incr(key.to_string(), 1u64).await?;
        Ok(value)
    }
}
