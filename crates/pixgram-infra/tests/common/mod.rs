#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pixgram_core::domain::{PostDraft, SessionUser};
use pixgram_core::paths::BlobKey;
use pixgram_core::ports::{BlobError, BlobPayload, BlobStore, DocumentStore, StoredBlob};
use pixgram_infra::{InMemoryBlobStore, InMemoryChangeFeed, InMemoryDocumentStore};

pub const BASE_URL: &str = "http://pixgram.test";

pub struct Fixture {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<InMemoryBlobStore>,
}

impl Fixture {
    pub fn new() -> Self {
        let feed = Arc::new(InMemoryChangeFeed::default());
        Self {
            store: Arc::new(InMemoryDocumentStore::new(feed)),
            blobs: Arc::new(InMemoryBlobStore::new(BASE_URL)),
        }
    }

    pub fn blob_store(&self) -> Arc<dyn BlobStore> {
        self.blobs.clone()
    }
}

pub fn user(name: &str, email: &str) -> SessionUser {
    SessionUser {
        name: name.to_string(),
        email: email.to_string(),
        image: Some(format!("https://avatars.test/{email}")),
        username: name.split(' ').collect::<String>().to_lowercase(),
        uid: format!("uid-{email}"),
    }
}

pub fn ada() -> SessionUser {
    user("Ada Lovelace", "ada@example.com")
}

pub fn bob() -> SessionUser {
    user("Bob", "bob@example.com")
}

pub fn png(tag: u8) -> BlobPayload {
    BlobPayload::Bytes {
        data: vec![0x89, b'P', b'N', b'G', tag],
        content_type: None,
    }
}

pub fn draft(caption: &str, images: usize) -> PostDraft {
    PostDraft {
        caption: caption.to_string(),
        images: (0..images).map(|i| png(i as u8)).collect(),
        ..Default::default()
    }
}

/// Fail the test instead of hanging when a push never arrives.
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out waiting for a live update")
}

/// Blob store that rejects one image index and delegates the rest.
pub struct FailingBlobStore {
    pub inner: InMemoryBlobStore,
    pub fail_suffix: String,
}

impl FailingBlobStore {
    pub fn failing_index(index: usize) -> Self {
        Self {
            inner: InMemoryBlobStore::new(BASE_URL),
            fail_suffix: format!("/{index}"),
        }
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, key: &BlobKey, payload: BlobPayload) -> Result<(), BlobError> {
        if key.as_str().ends_with(&self.fail_suffix) {
            return Err(BlobError::Io("disk full".to_string()));
        }
        self.inner.put(key, payload).await
    }

    async fn url(&self, key: &BlobKey) -> Result<String, BlobError> {
        self.inner.url(key).await
    }

    async fn get(&self, key: &BlobKey) -> Result<Option<StoredBlob>, BlobError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, BlobError> {
        self.inner.delete(key).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, BlobError> {
        self.inner.delete_prefix(prefix).await
    }
}
