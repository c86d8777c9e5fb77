//! Home feed.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::Post;
use crate::error::DomainError;
use crate::live::{self, Disposer};
use crate::paths;
use crate::ports::DocumentStore;
use crate::query::{Direction, Query};

/// A post as rendered in a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    pub id: String,
    pub username: String,
    pub email: String,
    pub user_img: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub caption: String,
    pub location: String,
    pub hashtags: Vec<String>,
    pub tagged_users: Vec<String>,
    pub timestamp: Option<String>,
}

impl From<Post> for PostCard {
    fn from(post: Post) -> Self {
        let image = post.display_image().map(String::from);
        let images = post.all_images();
        Self {
            id: post.id,
            username: post.username,
            email: post.email,
            user_img: post.profile_img,
            image,
            images,
            caption: post.caption,
            location: post.location,
            hashtags: post.hashtags,
            tagged_users: post.tagged_users,
            timestamp: post.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedState {
    pub posts: Vec<PostCard>,
    /// False until the first snapshot arrives.
    pub loaded: bool,
}

impl FeedState {
    fn from_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into_iter().map(PostCard::from).collect(),
            loaded: true,
        }
    }
}

/// Every post, newest first.
pub fn feed_query() -> Query {
    Query::collection(paths::posts()).order_by("timestamp", Direction::Desc)
}

pub struct FeedView {
    state: watch::Receiver<FeedState>,
    _posts: Disposer,
}

impl FeedView {
    pub async fn mount(store: Arc<dyn DocumentStore>) -> Result<Self, DomainError> {
        let (tx, state) = watch::channel(FeedState::default());
        let posts = live::watch_records(store.as_ref(), feed_query(), move |posts: Vec<Post>| {
            tx.send_replace(FeedState::from_posts(posts));
        })
        .await?;
        tracing::debug!("Feed mounted");

        Ok(Self {
            state,
            _posts: posts,
        })
    }

    /// One-shot read without a live query.
    pub async fn load(store: &dyn DocumentStore) -> Result<FeedState, DomainError> {
        let docs = store.query(&feed_query()).await?;
        let posts = crate::document::Snapshot::new(docs).decode_lossy();
        Ok(FeedState::from_posts(posts))
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Wait for the first snapshot.
    pub async fn loaded(&mut self) -> FeedState {
        let loaded = self.state.wait_for(|s| s.loaded).await.map(|s| s.clone());
        loaded.unwrap_or_else(|_| self.state())
    }

    pub async fn wait_until(&mut self, predicate: impl FnMut(&FeedState) -> bool) -> FeedState {
        let matched = self.state.wait_for(predicate).await.map(|s| s.clone());
        matched.unwrap_or_else(|_| self.state())
    }

    pub fn unmount(self) {
        tracing::debug!("Feed unmounted");
    }
}
