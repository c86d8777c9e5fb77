//! Blob store port.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::paths::BlobKey;

/// Upload body: raw bytes or a `data:` URL as produced by a browser file reader.
#[derive(Debug, Clone, PartialEq)]
pub enum BlobPayload {
    Bytes {
        data: Vec<u8>,
        content_type: Option<String>,
    },
    DataUrl(String),
}

/// A payload reduced to bytes plus a content type.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBlob {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl BlobPayload {
    pub fn decode(self) -> Result<DecodedBlob, BlobError> {
        match self {
            BlobPayload::Bytes { data, content_type } => {
                let content_type =
                    content_type.unwrap_or_else(|| sniff_content_type(&data).to_string());
                Ok(DecodedBlob { data, content_type })
            }
            BlobPayload::DataUrl(url) => decode_data_url(&url),
        }
    }
}

fn decode_data_url(url: &str) -> Result<DecodedBlob, BlobError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| BlobError::InvalidPayload("not a data URL".to_string()))?;
    let (meta, body) = rest
        .split_once(',')
        .ok_or_else(|| BlobError::InvalidPayload("data URL has no ',' separator".to_string()))?;

    let (meta, is_base64) = match meta.strip_suffix(";base64") {
        Some(m) => (m, true),
        None => (meta, false),
    };

    let data = if is_base64 {
        STANDARD
            .decode(body.trim())
            .map_err(|e| BlobError::InvalidPayload(format!("bad base64: {e}")))?
    } else {
        body.as_bytes().to_vec()
    };

    let mime = meta.split(';').next().unwrap_or_default().trim();
    let content_type = if mime.is_empty() {
        sniff_content_type(&data).to_string()
    } else {
        mime.to_string()
    };

    Ok(DecodedBlob { data, content_type })
}

/// Guess an image content type from magic bytes.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    match data {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub content_type: String,
    /// Changes on every overwrite; part of the retrievable URL.
    pub version: String,
}

/// Blob store trait - abstraction over object storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object, replacing any previous one under the key.
    async fn put(&self, key: &BlobKey, payload: BlobPayload) -> Result<(), BlobError>;

    /// Retrievable URL for a stored object.
    async fn url(&self, key: &BlobKey) -> Result<String, BlobError>;

    /// Read an object back.
    async fn get(&self, key: &BlobKey) -> Result<Option<StoredBlob>, BlobError>;

    /// Delete an object. Returns `true` if it existed.
    async fn delete(&self, key: &BlobKey) -> Result<bool, BlobError>;

    /// Delete every object whose key starts with `prefix`. Returns the count.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, BlobError>;

    /// Store an object and resolve its URL.
    async fn upload(&self, key: &BlobKey, payload: BlobPayload) -> Result<String, BlobError> {
        self.put(key, payload).await?;
        self.url(key).await
    }
}

/// Blob store errors.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
