//! Change feed port - fan-out of "collection changed" notifications.

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of payloads published on one channel. Dropping it unsubscribes.
pub type ChangeStream = BoxStream<'static, String>;

/// Change feed trait - abstraction over notification backends.
///
/// Stores publish the path of every written document on the channel named
/// after its parent collection; live queries watch that channel.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Publish a payload to a channel.
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), ChangeFeedError>;

    /// Start receiving every payload published to a channel from now on.
    async fn watch(&self, channel: &str) -> Result<ChangeStream, ChangeFeedError>;
}

/// Change feed errors.
#[derive(Debug, thiserror::Error)]
pub enum ChangeFeedError {
    #[error("Failed to publish: {0}")]
    PublishError(String),

    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    #[error("Connection error: {0}")]
    Connection(String),
}
