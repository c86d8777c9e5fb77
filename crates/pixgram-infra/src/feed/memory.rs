//! In-memory change feed.
//!
//! Works within a single process only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::{RwLock, broadcast};

use pixgram_core::ports::{ChangeFeed, ChangeFeedError, ChangeStream};

/// In-memory change feed backed by one broadcast channel per name.
#[derive(Clone)]
pub struct InMemoryChangeFeed {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    buffer_size: usize,
}

impl InMemoryChangeFeed {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }
}

impl Default for InMemoryChangeFeed {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl ChangeFeed for InMemoryChangeFeed {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), ChangeFeedError> {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(channel) {
                Some(sender) => sender.send(payload.to_string()).is_ok(),
                None => return Ok(()),
            }
        };

        if delivered {
            tracing::trace!(channel = %channel, "Change published");
        } else {
            // Every watcher is gone.
            let mut channels = self.channels.write().await;
            if channels.get(channel).is_some_and(|s| s.receiver_count() == 0) {
                channels.remove(channel);
                tracing::trace!(channel = %channel, "Channel dropped");
            }
        }

        Ok(())
    }

    async fn watch(&self, channel: &str) -> Result<ChangeStream, ChangeFeedError> {
        let mut channels = self.channels.write().await;
        channels.retain(|_, sender| sender.receiver_count() > 0);

        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        let receiver = sender.subscribe();
        let channel_name = channel.to_string();

        let changes = stream::unfold(receiver, move |mut receiver| {
            let channel_name = channel_name.clone();
            async move {
                match receiver.recv().await {
                    Ok(payload) => Some((payload, receiver)),
                    // Missed payloads still mean the channel changed.
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            channel = %channel_name,
                            lagged = count,
                            "Watcher lagged behind"
                        );
                        Some((channel_name, receiver))
                    }
                    Err(broadcast::error::RecvError::Closed) => None,
                }
            }
        });

        Ok(Box::pin(changes))
    }
}
