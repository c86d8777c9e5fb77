//! Cleanup of posts whose images never arrived.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::Post;
use crate::error::DomainError;
use crate::paths::{self, BlobKey};
use crate::ports::{BlobStore, DocumentStore};
use crate::query::Query;

/// Deletes post documents that still carry no image after a grace period,
/// along with any blobs stored under the post.
#[derive(Clone)]
pub struct OrphanSweeper {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    grace: Duration,
}

impl OrphanSweeper {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>, grace: Duration) -> Self {
        Self {
            store,
            blobs,
            grace,
        }
    }

    /// Run one sweep at `now`. Returns the number of posts removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let cutoff = now - self.grace;
        let docs = self.store.query(&Query::collection(paths::posts())).await?;

        let mut removed = 0;
        for doc in docs {
            let Ok(post) = doc.decode::<Post>() else {
                continue;
            };
            if !post.is_missing_images() || !created_before(&post, cutoff) {
                continue;
            }

            self.blobs
                .delete_prefix(&BlobKey::post_prefix(&post.id))
                .await?;
            if self.store.delete(&doc.path).await? {
                removed += 1;
                tracing::info!(post_id = %post.id, "Removed orphaned post");
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Orphan sweep finished");
        }
        Ok(removed)
    }
}

fn created_before(post: &Post, cutoff: DateTime<Utc>) -> bool {
    post.timestamp
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .is_some_and(|t| t.with_timezone(&Utc) < cutoff)
}
