//! Live query reconciliation.
//!
//! A view registers a callback per query; every snapshot pushed by the store
//! replaces the view's local copy wholesale. The returned [`Disposer`] is the
//! only handle on the subscription.

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::document::Snapshot;
use crate::error::StoreError;
use crate::ports::DocumentStore;
use crate::query::Query;

/// Tears a live query down. Consumed by [`Disposer::dispose`]; dropping it
/// has the same effect.
#[must_use = "dropping a Disposer immediately ends the live query"]
pub struct Disposer {
    label: String,
    task: JoinHandle<()>,
}

impl Disposer {
    /// Tie a task driving live queries to a disposer.
    pub(crate) fn for_task(label: impl Into<String>, task: JoinHandle<()>) -> Self {
        Self {
            label: label.into(),
            task,
        }
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer").field("label", &self.label).finish()
    }
}

/// Subscribe to `query` and call `on_snapshot` with every pushed snapshot.
pub async fn watch<F>(
    store: &dyn DocumentStore,
    query: Query,
    mut on_snapshot: F,
) -> Result<Disposer, StoreError>
where
    F: FnMut(Snapshot) + Send + 'static,
{
    let label = query.collection.to_string();
    let mut subscription = store.subscribe(query).await?;

    let task = tokio::spawn(async move {
        while let Some(snapshot) = subscription.next().await {
            on_snapshot(snapshot);
        }
    });

    Ok(Disposer { label, task })
}

/// Like [`watch`], decoding each snapshot into typed records first.
/// Documents that do not decode are logged and skipped.
pub async fn watch_records<T, F>(
    store: &dyn DocumentStore,
    query: Query,
    mut on_records: F,
) -> Result<Disposer, StoreError>
where
    T: DeserializeOwned + Send + 'static,
    F: FnMut(Vec<T>) + Send + 'static,
{
    watch(store, query, move |snapshot| on_records(snapshot.decode_lossy())).await
}
