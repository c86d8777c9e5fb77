//! Blob store implementations.

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;

/// `{base}/media/{key}?v={version}`
pub(crate) fn media_url(base_url: &str, key: &str, version: &str) -> String {
    format!("{}/media/{key}?v={version}", base_url.trim_end_matches('/'))
}
