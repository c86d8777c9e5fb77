//! Post detail: comments, likes and the viewer's like state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::PostCard;
use crate::domain::{Comment, Like, Post, SessionUser};
use crate::error::DomainError;
use crate::live::{self, Disposer};
use crate::paths;
use crate::ports::DocumentStore;
use crate::query::Query;
use crate::services::{CommentService, LikeService, comments_query};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailState {
    pub post: PostCard,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub like_count: usize,
    pub comment_count: usize,
    /// Derived from the live like list, never re-queried.
    pub has_liked: bool,
    /// Without a session the like and comment affordances are hidden.
    pub can_interact: bool,
    pub comments_loaded: bool,
    pub likes_loaded: bool,
}

impl PostDetailState {
    pub fn loaded(&self) -> bool {
        self.comments_loaded && self.likes_loaded
    }
}

pub struct PostView {
    post_id: String,
    viewer: Option<SessionUser>,
    state: watch::Receiver<PostDetailState>,
    likes: LikeService,
    comments: CommentService,
    _comments_live: Disposer,
    _likes_live: Disposer,
}

impl PostView {
    /// Load the post document and mount the view.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        post_id: &str,
        viewer: Option<SessionUser>,
    ) -> Result<Self, DomainError> {
        let doc = store
            .get(&paths::post(post_id)?)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "post",
                id: post_id.to_string(),
            })?;
        let post: Post = doc.decode()?;
        Self::mount(store, post, viewer).await
    }

    pub async fn mount(
        store: Arc<dyn DocumentStore>,
        post: Post,
        viewer: Option<SessionUser>,
    ) -> Result<Self, DomainError> {
        let post_id = post.id.clone();
        let (tx, state) = watch::channel(PostDetailState {
            post: PostCard::from(post),
            can_interact: viewer.is_some(),
            ..Default::default()
        });
        let tx = Arc::new(tx);

        let comments_tx = Arc::clone(&tx);
        let comments_live = live::watch_records(
            store.as_ref(),
            comments_query(&post_id)?,
            move |comments: Vec<Comment>| {
                comments_tx.send_modify(|s| {
                    s.comment_count = comments.len();
                    s.comments = comments;
                    s.comments_loaded = true;
                });
            },
        )
        .await?;

        let viewer_email = viewer.as_ref().map(|v| v.email.clone());
        let likes_tx = Arc::clone(&tx);
        let likes_live = live::watch_records(
            store.as_ref(),
            Query::collection(paths::likes(&post_id)?),
            move |likes: Vec<Like>| {
                likes_tx.send_modify(|s| {
                    s.has_liked = viewer_email
                        .as_deref()
                        .is_some_and(|email| likes.iter().any(|l| l.is_by(email)));
                    s.like_count = likes.len();
                    s.likes = likes;
                    s.likes_loaded = true;
                });
            },
        )
        .await?;

        tracing::debug!(post_id = %post_id, "Post view mounted");
        Ok(Self {
            post_id,
            viewer,
            state,
            likes: LikeService::new(Arc::clone(&store)),
            comments: CommentService::new(store),
            _comments_live: comments_live,
            _likes_live: likes_live,
        })
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn state(&self) -> PostDetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PostDetailState> {
        self.state.clone()
    }

    /// Wait until both live queries delivered a first snapshot.
    pub async fn loaded(&mut self) -> PostDetailState {
        let loaded = self
            .state
            .wait_for(PostDetailState::loaded)
            .await
            .map(|s| s.clone());
        loaded.unwrap_or_else(|_| self.state())
    }

    /// Wait until `predicate` holds for the current state.
    pub async fn wait_until(
        &mut self,
        predicate: impl FnMut(&PostDetailState) -> bool,
    ) -> PostDetailState {
        let matched = self.state.wait_for(predicate).await.map(|s| s.clone());
        matched.unwrap_or_else(|_| self.state())
    }

    /// Like or unlike based on the current `has_liked`. The next likes
    /// snapshot, not this call, updates the view.
    pub async fn toggle_like(&self) -> Result<bool, DomainError> {
        let viewer = self.viewer.as_ref().ok_or(DomainError::Unauthorized)?;
        let has_liked = self.state.borrow().has_liked;
        Ok(self.likes.toggle(&self.post_id, viewer, has_liked).await?)
    }

    pub async fn send_comment(&self, text: &str) -> Result<String, DomainError> {
        let viewer = self.viewer.as_ref().ok_or(DomainError::Unauthorized)?;
        self.comments.add(&self.post_id, viewer, text).await
    }

    pub fn unmount(self) {
        tracing::debug!(post_id = %self.post_id, "Post view unmounted");
    }
}
