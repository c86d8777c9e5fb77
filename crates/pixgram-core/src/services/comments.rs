//! Comment submission.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::document::{server_timestamp, to_fields};
use crate::domain::{Comment, SessionUser};
use crate::error::DomainError;
use crate::paths;
use crate::ports::DocumentStore;
use crate::query::{Direction, Query};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentDocument<'a> {
    comment: &'a str,
    username: &'a str,
    user_image: Option<&'a str>,
    timestamp: Value,
}

/// Newest first.
pub fn comments_query(post_id: &str) -> Result<Query, DomainError> {
    Ok(Query::collection(paths::comments(post_id)?).order_by("timestamp", Direction::Desc))
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append a comment. Returns the new comment's id.
    pub async fn add(
        &self,
        post_id: &str,
        user: &SessionUser,
        text: &str,
    ) -> Result<String, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("Comment cannot be empty".to_string()));
        }

        let fields = to_fields(&CommentDocument {
            comment: text,
            username: user.author_name(),
            user_image: user.image.as_deref(),
            timestamp: server_timestamp(),
        })?;
        let path = self.store.add(&paths::comments(post_id)?, fields).await?;
        tracing::debug!(post_id = %post_id, comment_id = %path.id(), "Comment added");
        Ok(path.id().to_string())
    }

    /// One-shot read, newest first.
    pub async fn list(&self, post_id: &str) -> Result<Vec<Comment>, DomainError> {
        let docs = self.store.query(&comments_query(post_id)?).await?;
        Ok(docs.iter().filter_map(|d| d.decode().ok()).collect())
    }
}
