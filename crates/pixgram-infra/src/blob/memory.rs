//! In-memory blob store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use pixgram_core::paths::BlobKey;
use pixgram_core::ports::{BlobError, BlobPayload, BlobStore, StoredBlob};

use super::media_url;

/// In-memory blob store. Clones share the same objects.
#[derive(Clone)]
pub struct InMemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredBlob>>>,
    versions: Arc<AtomicU64>,
    base_url: String,
}

impl InMemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            versions: Arc::new(AtomicU64::new(0)),
            base_url: base_url.into(),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &BlobKey, payload: BlobPayload) -> Result<(), BlobError> {
        let decoded = payload.decode()?;
        let version = self.versions.fetch_add(1, Ordering::Relaxed) + 1;
        let size = decoded.data.len();

        self.objects.write().await.insert(
            key.to_string(),
            StoredBlob {
                data: decoded.data,
                content_type: decoded.content_type,
                version: version.to_string(),
            },
        );
        tracing::debug!(key = %key, size, "Blob stored");
        Ok(())
    }

    async fn url(&self, key: &BlobKey) -> Result<String, BlobError> {
        let objects = self.objects.read().await;
        let blob = objects
            .get(key.as_str())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))?;
        Ok(media_url(&self.base_url, key.as_str(), &blob.version))
    }

    async fn get(&self, key: &BlobKey) -> Result<Option<StoredBlob>, BlobError> {
        Ok(self.objects.read().await.get(key.as_str()).cloned())
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, BlobError> {
        Ok(self.objects.write().await.remove(key.as_str()).is_some())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, BlobError> {
        let mut objects = self.objects.write().await;
        let before = objects.len();
        objects.retain(|key, _| !key.starts_with(prefix));
        Ok(before - objects.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> BlobPayload {
        BlobPayload::Bytes {
            data: vec![0x89, b'P', b'N', b'G'],
            content_type: None,
        }
    }

    #[tokio::test]
    async fn test_upload_returns_versioned_url() {
        let store = InMemoryBlobStore::new("http://localhost:8080/");
        let key = BlobKey::post_image("p1", 0);

        let first = store.upload(&key, png()).await.unwrap();
        let second = store.upload(&key, png()).await.unwrap();

        assert!(first.starts_with("http://localhost:8080/media/posts/p1/0?v="));
        assert_ne!(first, second);
        assert_eq!(store.get(&key).await.unwrap().unwrap().content_type, "image/png");
    }

    #[tokio::test]
    async fn test_url_of_missing_object() {
        let store = InMemoryBlobStore::new("http://localhost");
        let err = store.url(&BlobKey::post_image("p1", 0)).await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_prefix_only_touches_one_post() {
        let store = InMemoryBlobStore::new("http://localhost");
        for (post, index) in [("p1", 0), ("p1", 1), ("p10", 0)] {
            store.put(&BlobKey::post_image(post, index), png()).await.unwrap();
        }

        assert_eq!(store.delete_prefix(&BlobKey::post_prefix("p1")).await.unwrap(), 2);
        assert_eq!(store.len().await, 1);
    }
}
