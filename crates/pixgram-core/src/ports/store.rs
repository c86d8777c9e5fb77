//! Document store port and live subscriptions.

use async_trait::async_trait;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ChangeStream;
use crate::document::{Document, Fields, Snapshot};
use crate::error::StoreError;
use crate::paths::{CollectionPath, DocumentPath};
use crate::query::Query;

/// Document store trait - abstraction over hosted document databases.
///
/// Writes resolve `server_timestamp()` placeholders and notify live queries
/// on the written document's parent collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    /// One-shot query.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Create a document with a store-assigned id.
    async fn add(&self, collection: &CollectionPath, fields: Fields)
    -> Result<DocumentPath, StoreError>;

    /// Create or overwrite a document.
    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Create a document only if none exists at `path`. Returns `true` if written.
    async fn create(&self, path: &DocumentPath, fields: Fields) -> Result<bool, StoreError>;

    /// Shallow-merge fields into an existing document.
    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, path: &DocumentPath) -> Result<bool, StoreError>;

    /// Live query: a full snapshot now and after every change.
    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;
}

const SNAPSHOT_BUFFER: usize = 16;

/// A live query.
///
/// Snapshots are complete result sets. `unsubscribe` consumes the
/// subscription; dropping it tears it down as well.
pub struct Subscription {
    query: Query,
    receiver: mpsc::Receiver<Snapshot>,
    pump: JoinHandle<()>,
}

impl Subscription {
    /// Drive a live query off a change stream.
    ///
    /// `changes` must already be attached to the collection's channel so that
    /// no write between the initial read and the first notification is lost.
    pub fn spawn<S>(store: S, query: Query, mut changes: ChangeStream) -> Self
    where
        S: DocumentStore + 'static,
    {
        let (tx, receiver) = mpsc::channel(SNAPSHOT_BUFFER);
        let pumped = query.clone();

        let pump = tokio::spawn(async move {
            loop {
                match store.query(&pumped).await {
                    Ok(docs) => {
                        if tx.send(Snapshot::new(docs)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            collection = %pumped.collection,
                            error = %e,
                            "Live query failed"
                        );
                    }
                }

                if changes.next().await.is_none() {
                    tracing::debug!(collection = %pumped.collection, "Change stream ended");
                    break;
                }
                // A burst of writes collapses into one re-query.
                while let Some(Some(_)) = changes.next().now_or_never() {}
            }
        });

        Self {
            query,
            receiver,
            pump,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Next snapshot, or `None` once the subscription has ended.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }

    /// Tear the subscription down.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.pump.abort();
        tracing::debug!(collection = %self.query.collection, "Subscription closed");
    }
}
