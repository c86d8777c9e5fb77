//! Like toggling.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::document::{server_timestamp, to_fields};
use crate::domain::SessionUser;
use crate::error::StoreError;
use crate::paths;
use crate::ports::DocumentStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeDocument<'a> {
    username: &'a str,
    user_email: &'a str,
    timestamp: Value,
}

/// One like per (post, user): the document keyed by the user's email either
/// exists or it does not.
///
/// Both writes are idempotent. Two toggles racing on a stale `has_liked`
/// can cancel each other out, but can never leave a duplicate behind.
#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn DocumentStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fresh read of the keyed like document.
    pub async fn has_liked(&self, post_id: &str, email: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(&paths::like(post_id, email)?).await?.is_some())
    }

    /// Create the like if absent. Returns `true` if this call wrote it.
    pub async fn like(&self, post_id: &str, user: &SessionUser) -> Result<bool, StoreError> {
        let fields = to_fields(&LikeDocument {
            username: user.author_name(),
            user_email: &user.email,
            timestamp: server_timestamp(),
        })?;
        let created = self
            .store
            .create(&paths::like(post_id, &user.email)?, fields)
            .await?;
        tracing::debug!(post_id = %post_id, created, "Like written");
        Ok(created)
    }

    /// Delete the like if present. Returns `true` if it existed.
    pub async fn unlike(&self, post_id: &str, email: &str) -> Result<bool, StoreError> {
        let removed = self.store.delete(&paths::like(post_id, email)?).await?;
        tracing::debug!(post_id = %post_id, removed, "Like removed");
        Ok(removed)
    }

    /// Flip the like state the caller believes is current. Returns the
    /// state the caller asked for.
    pub async fn toggle(
        &self,
        post_id: &str,
        user: &SessionUser,
        has_liked: bool,
    ) -> Result<bool, StoreError> {
        if has_liked {
            self.unlike(post_id, &user.email).await?;
            Ok(false)
        } else {
            self.like(post_id, user).await?;
            Ok(true)
        }
    }
}
