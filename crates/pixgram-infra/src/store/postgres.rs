//! PostgreSQL document store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectOptions, Database, DbConn, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use pixgram_core::ServerClock;
use pixgram_core::document::{Document, Fields, resolve_server_values};
use pixgram_core::error::StoreError;
use pixgram_core::paths::{CollectionPath, DocumentPath};
use pixgram_core::ports::{ChangeFeed, DocumentStore, Subscription};
use pixgram_core::query::{Filter, Query};

use super::entity::document::{self, Entity as DocumentEntity};
use super::{new_document_id, notify};

/// Configuration for the document database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

fn query_err(e: DbErr) -> StoreError {
    StoreError::Query(e.to_string())
}

/// `data -> field = value` for every equality filter.
fn filter_condition(query: &Query) -> Condition {
    query
        .filters
        .iter()
        .fold(Condition::all(), |cond, filter| match filter {
            Filter::Eq { field, value } => cond.add(Expr::cust_with_values(
                "\"data\" -> $1 = $2",
                [sea_orm::Value::from(field.clone()), sea_orm::Value::from(value.clone())],
            )),
        })
}

/// Documents stored as JSONB rows. Equality filters run in the database;
/// ordering and limits run in process with the same rules as every other
/// store.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    db: DbConn,
    clock: Arc<ServerClock>,
    feed: Arc<dyn ChangeFeed>,
}

impl PostgresDocumentStore {
    pub fn new(db: DbConn, feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            db,
            clock: Arc::new(ServerClock::new()),
            feed,
        }
    }

    pub async fn connect(
        config: &DatabaseConfig,
        feed: Arc<dyn ChangeFeed>,
    ) -> Result<Self, StoreError> {
        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false)
            .to_owned();

        let db = Database::connect(opts)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        tracing::info!(pool = config.max_connections, "Document database connected");

        Ok(Self::new(db, feed))
    }

    fn stamp(&self, mut fields: Fields) -> Fields {
        resolve_server_values(&mut fields, &self.clock.now_string());
        fields
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let row = DocumentEntity::find_by_id(path.to_string())
            .one(&self.db)
            .await
            .map_err(query_err)?;
        row.map(Document::try_from).transpose()
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let rows = DocumentEntity::find()
            .filter(document::Column::Collection.eq(query.collection.as_str()))
            .filter(filter_condition(query))
            .order_by_asc(document::Column::DocId)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            match Document::try_from(row) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable row"),
            }
        }
        Ok(query.apply(docs))
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, StoreError> {
        let path = collection.doc(&new_document_id())?;
        DocumentEntity::insert(document::active_model(&path, self.stamp(fields)))
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;
        notify(self.feed.as_ref(), &path).await;
        tracing::debug!(path = %path, "Document added");
        Ok(path)
    }

    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        DocumentEntity::insert(document::active_model(path, self.stamp(fields)))
            .on_conflict(
                OnConflict::column(document::Column::Path)
                    .update_columns([document::Column::Data, document::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;
        notify(self.feed.as_ref(), path).await;
        Ok(())
    }

    async fn create(&self, path: &DocumentPath, fields: Fields) -> Result<bool, StoreError> {
        let inserted = DocumentEntity::insert(document::active_model(path, self.stamp(fields)))
            .on_conflict(
                OnConflict::column(document::Column::Path)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;

        let created = inserted > 0;
        if created {
            notify(self.feed.as_ref(), path).await;
        }
        Ok(created)
    }

    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(query_err)?;

        // Row lock so concurrent merges apply one after the other.
        let row = DocumentEntity::find_by_id(path.to_string())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(query_err)?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;

        let mut merged = Document::try_from(row.clone())?.fields;
        merged.extend(self.stamp(fields));

        let mut active: document::ActiveModel = row.into();
        active.data = Set(serde_json::Value::Object(merged));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await.map_err(query_err)?;

        txn.commit().await.map_err(query_err)?;
        notify(self.feed.as_ref(), path).await;
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<bool, StoreError> {
        let result = DocumentEntity::delete_by_id(path.to_string())
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        let removed = result.rows_affected > 0;
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
