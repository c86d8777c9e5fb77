use std::sync::Arc;

use futures::StreamExt;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::{Value, json};

use pixgram_core::document::Fields;
use pixgram_core::paths;
use pixgram_core::ports::{ChangeFeed, DocumentStore};
use pixgram_core::query::{Direction, Query};

use crate::feed::InMemoryChangeFeed;
use crate::store::PostgresDocumentStore;
use crate::store::entity::document;

fn row(path: &str, data: serde_json::Value) -> document::Model {
    let now = chrono::Utc::now();
    let (collection, doc_id) = path.rsplit_once('/').unwrap();
    document::Model {
        path: path.to_owned(),
        collection: collection.to_owned(),
        doc_id: doc_id.to_owned(),
        data,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn feed() -> Arc<InMemoryChangeFeed> {
    Arc::new(InMemoryChangeFeed::default())
}

#[tokio::test]
async fn test_get_document_by_path() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row(
            "posts/p1",
            json!({"caption": "Sunset", "email": "ada@example.com"}),
        )]])
        .into_connection();

    let store = PostgresDocumentStore::new(db, feed());
    let doc = store.get(&paths::post("p1").unwrap()).await.unwrap().unwrap();

    assert_eq!(doc.id, "p1");
    assert_eq!(doc.get("caption"), Some(&json!("Sunset")));
}

#[tokio::test]
async fn test_query_applies_order_and_skips_non_objects() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            row("posts/a", json!({"timestamp": "2026-01-01T00:00:00.000001Z"})),
            row("posts/b", json!({"timestamp": "2026-01-01T00:00:00.000002Z"})),
            row("posts/c", json!("not an object")),
        ]])
        .into_connection();

    let store = PostgresDocumentStore::new(db, feed());
    let query = Query::collection(paths::posts()).order_by("timestamp", Direction::Desc);
    let ids: Vec<String> = store
        .query(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();

    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn test_create_reports_conflict() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let store = PostgresDocumentStore::new(db, feed());
    let path = paths::like("p1", "ada@example.com").unwrap();

    assert!(store.create(&path, Fields::new()).await.unwrap());
    assert!(!store.create(&path, Fields::new()).await.unwrap());
}

#[tokio::test]
async fn test_delete_publishes_change() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let feed = feed();
    let mut changes = feed.watch("posts/p1/likes").await.unwrap();
    let store = PostgresDocumentStore::new(db, feed);

    let path = paths::like("p1", "ada@example.com").unwrap();
    assert!(store.delete(&path).await.unwrap());

    assert_eq!(
        changes.next().await.as_deref(),
        Some("posts/p1/likes/ada@example.com")
    );
}

#[tokio::test]
async fn test_equality_filters_run_in_the_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row(
            "posts/a",
            json!({"email": "ada@example.com", "timestamp": "2026-01-01T00:00:00.000001Z"}),
        )]])
        .into_connection();

    let store = PostgresDocumentStore::new(db.clone(), feed());
    let query = Query::collection(paths::posts())
        .where_eq("email", "ada@example.com")
        .order_by("timestamp", Direction::Desc);
    assert_eq!(store.query(&query).await.unwrap().len(), 1);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains(" -> "), "filter not in SQL: {log}");
}

#[tokio::test]
async fn test_update_locks_the_row_before_merging() {
    let before = row("users/ada", json!({"bio": "a", "profileImage": "u"}));
    let after = row("users/ada", json!({"bio": "b", "profileImage": "u"}));
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![before], vec![after]])
        .into_connection();

    let store = PostgresDocumentStore::new(db.clone(), feed());
    let mut fields = Fields::new();
    fields.insert("bio".to_string(), Value::from("b"));
    store.update(&paths::user("ada").unwrap(), fields).await.unwrap();

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("FOR UPDATE"), "row not locked: {log}");
    assert!(log.contains("profileImage"), "merge dropped fields: {log}");
}
