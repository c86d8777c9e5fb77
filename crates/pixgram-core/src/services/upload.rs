//! Post creation: document first, then images, then the URL patch.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::{Value, json};

use crate::document::{Fields, server_timestamp, to_fields};
use crate::domain::{PostDraft, SessionUser, extract_hashtags, normalize_tagged_users};
use crate::error::DomainError;
use crate::paths::{self, BlobKey, DocumentPath};
use crate::ports::{BlobStore, DocumentStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPostDocument<'a> {
    username: &'a str,
    email: &'a str,
    profile_img: Option<&'a str>,
    caption: &'a str,
    location: &'a str,
    hashtags: Vec<String>,
    tagged_users: Vec<String>,
    timestamp: Value,
}

/// Runs the three upload steps. They are not atomic: when step two or
/// three fails the sequencer removes what it already wrote before
/// reporting the error.
#[derive(Clone)]
pub struct UploadSequencer {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl UploadSequencer {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Create a post from a draft. Returns the new post id.
    pub async fn upload_post(
        &self,
        user: &SessionUser,
        draft: PostDraft,
    ) -> Result<String, DomainError> {
        if draft.images.is_empty() {
            return Err(DomainError::Validation(
                "Select at least one image".to_string(),
            ));
        }

        let fields = to_fields(&NewPostDocument {
            username: user.author_name(),
            email: &user.email,
            profile_img: user.image.as_deref(),
            caption: &draft.caption,
            location: &draft.location,
            hashtags: extract_hashtags([draft.hashtags.as_str(), draft.caption.as_str()]),
            tagged_users: normalize_tagged_users(&draft.tagged_users),
            timestamp: server_timestamp(),
        })?;
        let post_path = self.store.add(&paths::posts(), fields).await?;
        let post_id = post_path.id().to_string();
        tracing::info!(post_id = %post_id, images = draft.images.len(), "Post document created");

        match self.attach_images(&post_path, draft).await {
            Ok(count) => {
                tracing::info!(post_id = %post_id, images = count, "Post uploaded");
                Ok(post_id)
            }
            Err(e) => {
                tracing::error!(post_id = %post_id, error = %e, "Post upload failed, discarding");
                self.discard(&post_path).await;
                Err(e)
            }
        }
    }

    async fn attach_images(
        &self,
        post_path: &DocumentPath,
        draft: PostDraft,
    ) -> Result<usize, DomainError> {
        let post_id = post_path.id();
        let uploads = draft.images.into_iter().enumerate().map(|(index, payload)| {
            let blobs = Arc::clone(&self.blobs);
            let key = BlobKey::post_image(post_id, index);
            async move { blobs.upload(&key, payload).await }
        });
        // try_join_all keeps input order regardless of completion order.
        let urls = try_join_all(uploads).await?;
        let count = urls.len();

        let mut patch = Fields::new();
        patch.insert("images".to_string(), json!(urls));
        self.store.update(post_path, patch).await?;
        Ok(count)
    }

    async fn discard(&self, post_path: &DocumentPath) {
        let prefix = BlobKey::post_prefix(post_path.id());
        if let Err(e) = self.blobs.delete_prefix(&prefix).await {
            tracing::warn!(prefix = %prefix, error = %e, "Failed to remove uploaded images");
        }
        if let Err(e) = self.store.delete(post_path).await {
            tracing::warn!(path = %post_path, error = %e, "Failed to remove post document");
        }
    }
}
