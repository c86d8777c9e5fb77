//! Redis pub/sub change feed.
//!
//! Lets several server processes share live queries over one store.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use pixgram_core::ports::{ChangeFeed, ChangeFeedError, ChangeStream};

const CHANNEL_PREFIX: &str = "pixgram:changes:";

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Redis-backed change feed.
pub struct RedisChangeFeed {
    conn: ConnectionManager,
    client: Client,
}

impl RedisChangeFeed {
    pub async fn new(config: RedisConfig) -> Result<Self, ChangeFeedError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| ChangeFeedError::Connection(e.to_string()))?;

        // Bounded so an unreachable server fails startup instead of hanging it.
        let conn_manager_fut = ConnectionManager::new(client.clone());
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| ChangeFeedError::Connection("Connection timed out".to_string()))?
            .map_err(|e| ChangeFeedError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis change feed");

        Ok(Self { conn, client })
    }

    fn channel_key(channel: &str) -> String {
        format!("{CHANNEL_PREFIX}{channel}")
    }
}

#[async_trait]
impl ChangeFeed for RedisChangeFeed {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), ChangeFeedError> {
        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(Self::channel_key(channel), payload)
            .await
            .map_err(|e| ChangeFeedError::PublishError(e.to_string()))?;
        Ok(())
    }

    async fn watch(&self, channel: &str) -> Result<ChangeStream, ChangeFeedError> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| ChangeFeedError::Connection(e.to_string()))?;

        let key = Self::channel_key(channel);
        pubsub
            .subscribe(&key)
            .await
            .map_err(|e| ChangeFeedError::SubscribeError(e.to_string()))?;
        tracing::debug!(channel = %key, "Subscribed to Redis channel");

        let changes = pubsub.into_on_message().filter_map(|msg| async move {
            match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get message payload");
                    None
                }
            }
        });

        Ok(Box::pin(changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_test_feed() -> Option<RedisChangeFeed> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
        };

        RedisChangeFeed::new(config).await.ok()
    }

    #[test]
    fn test_channels_are_namespaced() {
        assert_eq!(
            RedisChangeFeed::channel_key("posts/p1/likes"),
            "pixgram:changes:posts/p1/likes"
        );
    }

    #[tokio::test]
    async fn test_redis_watch_and_publish() {
        let feed = match get_test_feed().await {
            Some(f) => f,
            None => return,
        };

        let mut changes = feed.watch("test_posts").await.unwrap();
        feed.publish("test_posts", "test_posts/a").await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), changes.next())
            .await
            .unwrap();
        assert_eq!(received.as_deref(), Some("test_posts/a"));
    }
}
