//! In-memory document store.
//!
//! This is a fallback when no database is configured.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pixgram_core::ServerClock;
use pixgram_core::document::{Document, Fields, resolve_server_values};
use pixgram_core::error::StoreError;
use pixgram_core::paths::{CollectionPath, DocumentPath};
use pixgram_core::ports::{ChangeFeed, DocumentStore, Subscription};
use pixgram_core::query::Query;

use super::{new_document_id, notify};

type Collections = HashMap<String, BTreeMap<String, Fields>>;

/// In-memory document store. Clones share the same data.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    clock: Arc<ServerClock>,
    feed: Arc<dyn ChangeFeed>,
}

impl InMemoryDocumentStore {
    pub fn new(feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            clock: Arc::new(ServerClock::new()),
            feed,
        }
    }

    fn stamp(&self, mut fields: Fields) -> Fields {
        resolve_server_values(&mut fields, &self.clock.now_string());
        fields
    }

    async fn write(&self, path: &DocumentPath, fields: Fields) {
        self.collections
            .write()
            .await
            .entry(path.parent().to_string())
            .or_default()
            .insert(path.id().to_string(), fields);
        notify(self.feed.as_ref(), path).await;
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        let fields = collections
            .get(path.parent().as_str())
            .and_then(|docs| docs.get(path.id()));
        Ok(fields.map(|f| Document::new(path.clone(), f.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(query.collection.as_str()) else {
            return Ok(Vec::new());
        };

        let docs = docs
            .iter()
            .map(|(id, fields)| Ok(Document::new(query.collection.doc(id)?, fields.clone())))
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(query.apply(docs))
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, StoreError> {
        let path = collection.doc(&new_document_id())?;
        self.write(&path, self.stamp(fields)).await;
        tracing::debug!(path = %path, "Document added");
        Ok(path)
    }

    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.write(path, self.stamp(fields)).await;
        Ok(())
    }

    async fn create(&self, path: &DocumentPath, fields: Fields) -> Result<bool, StoreError> {
        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(path.parent().to_string()).or_default();
            if docs.contains_key(path.id()) {
                return Ok(false);
            }
            docs.insert(path.id().to_string(), self.stamp(fields));
        }
        notify(self.feed.as_ref(), path).await;
        Ok(true)
    }

    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        {
            let mut collections = self.collections.write().await;
            let existing = collections
                .get_mut(path.parent().as_str())
                .and_then(|docs| docs.get_mut(path.id()))
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            existing.extend(self.stamp(fields));
        }
        notify(self.feed.as_ref(), path).await;
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<bool, StoreError> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(path.parent().as_str())
            .and_then(|docs| docs.remove(path.id()))
            .is_some();
        if removed {
            notify(self.feed.as_ref(), path).await;
        }
        Ok(removed)
    }

    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let changes = self.feed.watch(query.collection.as_str()).await?;
        tracing::debug!(collection = %query.collection, "Live query started");
        Ok(Subscription::spawn(self.clone(), query, changes))
    }
}
