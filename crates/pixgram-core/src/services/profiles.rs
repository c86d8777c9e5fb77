//! Profile bootstrap and edits.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::document::{Fields, server_timestamp, to_fields};
use crate::domain::{ProfileUpdate, SessionUser, UserProfile};
use crate::error::DomainError;
use crate::paths::{self, BlobKey};
use crate::ports::{BlobStore, DocumentStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewProfileDocument<'a> {
    username: &'a str,
    email: &'a str,
    profile_image: Option<&'a str>,
    bio: &'a str,
    followers: Vec<String>,
    following: Vec<String>,
    timestamp: Value,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<UserProfile>, DomainError> {
        let doc = self.store.get(&paths::user(user_id)?).await?;
        Ok(doc.map(|d| d.decode()).transpose()?)
    }

    /// Load a profile, creating it when its owner visits for the first time.
    pub async fn ensure(
        &self,
        user_id: &str,
        viewer: Option<&SessionUser>,
    ) -> Result<Option<UserProfile>, DomainError> {
        if let Some(profile) = self.find(user_id).await? {
            return Ok(Some(profile));
        }

        let Some(owner) = viewer.filter(|v| v.email == user_id) else {
            return Ok(None);
        };

        let fields = to_fields(&NewProfileDocument {
            username: &owner.name,
            email: &owner.email,
            profile_image: owner.image.as_deref(),
            bio: "",
            followers: Vec::new(),
            following: Vec::new(),
            timestamp: server_timestamp(),
        })?;
        let created = self.store.create(&paths::user(user_id)?, fields).await?;
        if created {
            tracing::info!(user_id = %user_id, "Profile created");
        }

        self.find(user_id).await
    }

    /// Apply bio and optional image edits to the viewer's own profile.
    /// Returns the fields that were written.
    pub async fn update(
        &self,
        user_id: &str,
        viewer: &SessionUser,
        update: ProfileUpdate,
    ) -> Result<Fields, DomainError> {
        if viewer.email != user_id {
            return Err(DomainError::Forbidden(
                "Profiles can only be edited by their owner".to_string(),
            ));
        }
        self.ensure(user_id, Some(viewer)).await?;

        let mut updates = Fields::new();
        updates.insert("bio".to_string(), json!(update.bio));

        if let Some(image) = update.image {
            let url = self
                .blobs
                .upload(&BlobKey::profile_image(user_id), image)
                .await?;
            updates.insert("profileImage".to_string(), json!(url));
        }

        self.store.update(&paths::user(user_id)?, updates.clone()).await?;
        tracing::info!(user_id = %user_id, fields = updates.len(), "Profile updated");
        Ok(updates)
    }
}
