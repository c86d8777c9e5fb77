//! Filesystem blob store.
//!
//! Objects live at `{root}/{key}`. Each one has a JSON sidecar at
//! `{root}/.meta/{key}.json` holding the declared content type and the
//! version handed out when it was written.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use pixgram_core::paths::BlobKey;
use pixgram_core::ports::{BlobError, BlobPayload, BlobStore, StoredBlob};

use super::media_url;

const META_DIR: &str = ".meta";

fn io_err(e: std::io::Error) -> BlobError {
    BlobError::Io(e.to_string())
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobMeta {
    content_type: String,
    version: String,
}

pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
    last_version: AtomicU64,
}

impl LocalBlobStore {
    pub async fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> Result<Self, BlobError> {
        let root = root.into();
        fs::create_dir_all(root.join(META_DIR)).await.map_err(io_err)?;
        tracing::info!(root = %root.display(), "Filesystem blob store ready");
        Ok(Self {
            root,
            base_url: base_url.into(),
            last_version: AtomicU64::new(0),
        })
    }

    fn path_of(&self, key: &BlobKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn meta_path_of(&self, key: &BlobKey) -> PathBuf {
        self.root.join(META_DIR).join(format!("{}.json", key.as_str()))
    }

    /// Wall clock nanoseconds, bumped past the last version handed out.
    fn next_version(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let previous = self
            .last_version
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        format!("{:x}", now.max(previous + 1))
    }

    async fn meta_of(&self, key: &BlobKey) -> Result<Option<BlobMeta>, BlobError> {
        let raw = match fs::read(self.meta_path_of(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| BlobError::Io(format!("corrupt metadata for {key}: {e}")))
    }

    /// Every stored key, as `/`-separated paths relative to the root.
    async fn keys(&self) -> Result<Vec<String>, BlobError> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];
        let meta_root = self.root.join(META_DIR);

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(io_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
                let path = entry.path();
                if path == meta_root {
                    continue;
                }
                if entry.file_type().await.map_err(io_err)?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key: Vec<_> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    keys.push(key.join("/"));
                }
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &BlobKey, payload: BlobPayload) -> Result<(), BlobError> {
        let decoded = payload.decode()?;
        let path = self.path_of(key);
        let meta_path = self.meta_path_of(key);
        for dir in [path.parent(), meta_path.parent()].into_iter().flatten() {
            fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        let meta = BlobMeta {
            content_type: decoded.content_type,
            version: self.next_version(),
        };
        let meta_json = serde_json::to_vec(&meta).map_err(|e| BlobError::Io(e.to_string()))?;

        fs::write(&path, &decoded.data).await.map_err(io_err)?;
        fs::write(&meta_path, meta_json).await.map_err(io_err)?;
        tracing::debug!(key = %key, size = decoded.data.len(), version = %meta.version, "Blob written");
        Ok(())
    }

    async fn url(&self, key: &BlobKey) -> Result<String, BlobError> {
        let meta = self
            .meta_of(key)
            .await?
            .ok_or_else(|| BlobError::NotFound(key.to_string()))?;
        Ok(media_url(&self.base_url, key.as_str(), &meta.version))
    }

    async fn get(&self, key: &BlobKey) -> Result<Option<StoredBlob>, BlobError> {
        let Some(meta) = self.meta_of(key).await? else {
            return Ok(None);
        };
        let data = match fs::read(self.path_of(key)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };
        Ok(Some(StoredBlob {
            data,
            content_type: meta.content_type,
            version: meta.version,
        }))
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, BlobError> {
        match fs::remove_file(self.meta_path_of(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(e)),
        }
        match fs::remove_file(self.path_of(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, BlobError> {
        let mut removed = 0;
        for key in self.keys().await? {
            if !key.starts_with(prefix) {
                continue;
            }
            if let Some(key) = BlobKey::parse(&key) {
                if self.delete(&key).await? {
                    removed += 1;
                }
            }
        }
        tracing::debug!(prefix = %prefix, removed, "Blobs removed");
        Ok(removed)
    }
}
