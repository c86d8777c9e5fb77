//! Profile page: header, the user's posts and per-post counters.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use super::PostCard;
use crate::document::Snapshot;
use crate::domain::{Post, ProfileUpdate, SessionUser, UserProfile};
use crate::error::DomainError;
use crate::live::{self, Disposer};
use crate::paths;
use crate::ports::{BlobStore, DocumentStore, Subscription};
use crate::query::{Direction, Query};
use crate::services::{ProfileService, comments_query};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostStats {
    pub likes: usize,
    pub comments: usize,
    #[serde(skip)]
    likes_loaded: bool,
    #[serde(skip)]
    comments_loaded: bool,
}

impl PostStats {
    pub fn loaded(&self) -> bool {
        self.likes_loaded && self.comments_loaded
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileState {
    pub user_id: String,
    pub profile: Option<UserProfile>,
    pub username: String,
    pub profile_image: Option<String>,
    pub bio_display: String,
    pub followers: usize,
    pub following: usize,
    pub posts: Vec<PostCard>,
    pub post_count: usize,
    /// Keyed by post id; only posts currently listed have an entry.
    pub stats: BTreeMap<String, PostStats>,
    pub is_own_profile: bool,
    pub loaded: bool,
}

impl ProfileState {
    fn new(user_id: &str, profile: Option<UserProfile>, viewer: Option<&SessionUser>) -> Self {
        let mut state = Self {
            user_id: user_id.to_string(),
            is_own_profile: viewer.is_some_and(|v| v.email == user_id),
            ..Default::default()
        };
        state.set_profile(profile);
        state
    }

    fn set_profile(&mut self, profile: Option<UserProfile>) {
        match &profile {
            Some(p) => {
                self.username = p.username.clone();
                self.profile_image = p.profile_image.clone();
                self.bio_display = p.bio_display().to_string();
                self.followers = p.followers.len();
                self.following = p.following.len();
            }
            None => {
                self.bio_display = UserProfile::EMPTY_BIO.to_string();
            }
        }
        self.profile = profile;
        self.fill_header_from_posts();
    }

    /// Without a profile document the header borrows the author fields of
    /// the user's newest post.
    fn fill_header_from_posts(&mut self) {
        let Some(newest) = self.posts.first() else {
            return;
        };
        if self.username.is_empty() {
            self.username = newest.username.clone();
        }
        if self.profile_image.is_none() {
            self.profile_image = newest.user_img.clone();
        }
    }

    fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts.into_iter().map(PostCard::from).collect();
        self.post_count = self.posts.len();
        let posts = &self.posts;
        self.stats.retain(|id, _| posts.iter().any(|p| &p.id == id));
        self.fill_header_from_posts();
        self.loaded = true;
    }

    fn lists(&self, post_id: &str) -> bool {
        self.posts.iter().any(|p| p.id == post_id)
    }

    /// Posts loaded and every listed post has both counters.
    pub fn stats_loaded(&self) -> bool {
        self.loaded
            && self
                .posts
                .iter()
                .all(|p| self.stats.get(&p.id).is_some_and(PostStats::loaded))
    }
}

/// A user's posts, newest first.
pub fn user_posts_query(user_id: &str) -> Query {
    Query::collection(paths::posts())
        .where_eq("email", user_id)
        .order_by("timestamp", Direction::Desc)
}

pub struct ProfileView {
    user_id: String,
    viewer: Option<SessionUser>,
    profiles: ProfileService,
    state: watch::Receiver<ProfileState>,
    tx: Arc<watch::Sender<ProfileState>>,
    _driver: Disposer,
}

impl ProfileView {
    /// Ensure the profile exists (for its owner), then follow the user's
    /// posts and their like and comment counts.
    pub async fn mount(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        user_id: &str,
        viewer: Option<SessionUser>,
    ) -> Result<Self, DomainError> {
        let profiles = ProfileService::new(Arc::clone(&store), blobs);
        let profile = profiles.ensure(user_id, viewer.as_ref()).await?;

        let (tx, state) = watch::channel(ProfileState::new(user_id, profile, viewer.as_ref()));
        let tx = Arc::new(tx);

        let posts = store.subscribe(user_posts_query(user_id)).await?;
        let task = tokio::spawn(drive_posts(store, posts, Arc::clone(&tx)));
        tracing::debug!(user_id = %user_id, "Profile view mounted");

        Ok(Self {
            user_id: user_id.to_string(),
            viewer,
            profiles,
            state,
            tx,
            _driver: Disposer::for_task(format!("profile:{user_id}"), task),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.clone()
    }

    /// Wait for the posts and every listed post's counters.
    pub async fn loaded(&mut self) -> ProfileState {
        self.wait_until(ProfileState::stats_loaded).await
    }

    pub async fn wait_until(
        &mut self,
        predicate: impl FnMut(&ProfileState) -> bool,
    ) -> ProfileState {
        let matched = self.state.wait_for(predicate).await.map(|s| s.clone());
        matched.unwrap_or_else(|_| self.state())
    }

    /// Save bio and image edits and patch the header with what was written.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<(), DomainError> {
        let viewer = self.viewer.as_ref().ok_or(DomainError::Unauthorized)?;
        let applied = self.profiles.update(&self.user_id, viewer, update).await?;

        let profile = self.profiles.find(&self.user_id).await?;
        self.tx.send_modify(|s| {
            s.set_profile(profile);
            if let Some(Value::String(url)) = applied.get("profileImage") {
                s.profile_image = Some(url.clone());
            }
        });
        Ok(())
    }

    pub fn unmount(self) {
        tracing::debug!(user_id = %self.user_id, "Profile view unmounted");
    }
}

type StatsLive = (Disposer, Disposer);

async fn drive_posts(
    store: Arc<dyn DocumentStore>,
    mut posts: Subscription,
    tx: Arc<watch::Sender<ProfileState>>,
) {
    let mut live_stats: HashMap<String, StatsLive> = HashMap::new();

    while let Some(snapshot) = posts.next().await {
        let listed: Vec<Post> = snapshot.decode_lossy();
        let ids: Vec<String> = listed.iter().map(|p| p.id.clone()).collect();
        tx.send_modify(|s| s.set_posts(listed));

        live_stats.retain(|id, _| ids.contains(id));
        for id in ids {
            if live_stats.contains_key(&id) {
                continue;
            }
            match watch_stats(store.as_ref(), &id, &tx).await {
                Ok(stats) => {
                    live_stats.insert(id, stats);
                }
                Err(e) => {
                    tracing::error!(post_id = %id, error = %e, "Failed to watch post stats");
                }
            }
        }
    }
}

async fn watch_stats(
    store: &dyn DocumentStore,
    post_id: &str,
    tx: &Arc<watch::Sender<ProfileState>>,
) -> Result<StatsLive, DomainError> {
    let likes_tx = Arc::clone(tx);
    let likes_id = post_id.to_string();
    let likes = live::watch(
        store,
        Query::collection(paths::likes(post_id)?),
        move |snapshot: Snapshot| {
            likes_tx.send_if_modified(|s| {
                if !s.lists(&likes_id) {
                    return false;
                }
                let entry = s.stats.entry(likes_id.clone()).or_default();
                entry.likes = snapshot.len();
                entry.likes_loaded = true;
                true
            });
        },
    )
    .await?;

    let comments_tx = Arc::clone(tx);
    let comments_id = post_id.to_string();
    let comments = live::watch(store, comments_query(post_id)?, move |snapshot: Snapshot| {
        comments_tx.send_if_modified(|s| {
            if !s.lists(&comments_id) {
                return false;
            }
            let entry = s.stats.entry(comments_id.clone()).or_default();
            entry.comments = snapshot.len();
            entry.comments_loaded = true;
            true
        });
    })
    .await?;

    Ok((likes, comments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(bio: &str) -> UserProfile {
        UserProfile {
            id: "ada@example.com".to_string(),
            username: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            bio: bio.to_string(),
            followers: vec!["bob@example.com".to_string()],
            ..Default::default()
        }
    }

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            profile_img: Some("avatar".to_string()),
            image: Some(format!("{id}.png")),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_uses_bio_fallback() {
        let state = ProfileState::new("ada@example.com", Some(profile("  ")), None);
        assert_eq!(state.bio_display, "No bio yet");
        assert_eq!(state.followers, 1);
        assert!(!state.is_own_profile);
    }

    #[test]
    fn test_missing_profile_borrows_author_from_posts() {
        let mut state = ProfileState::new("ada@example.com", None, None);
        state.set_posts(vec![post("p1")]);
        assert_eq!(state.username, "ada");
        assert_eq!(state.profile_image.as_deref(), Some("avatar"));
    }

    #[test]
    fn test_stats_dropped_when_post_leaves() {
        let mut state = ProfileState::new("ada@example.com", None, None);
        state.set_posts(vec![post("p1"), post("p2")]);
        state.stats.insert("p1".to_string(), PostStats::default());
        state.stats.insert("p2".to_string(), PostStats::default());

        state.set_posts(vec![post("p2")]);
        assert_eq!(state.post_count, 1);
        assert!(!state.stats.contains_key("p1"));
        assert!(state.stats.contains_key("p2"));
    }

    #[test]
    fn test_stats_loaded_requires_both_counters() {
        let mut state = ProfileState::new("ada@example.com", None, None);
        state.set_posts(vec![post("p1")]);
        assert!(!state.stats_loaded());

        let entry = state.stats.entry("p1".to_string()).or_default();
        entry.likes_loaded = true;
        assert!(!state.stats_loaded());
        let entry = state.stats.entry("p1".to_string()).or_default();
        entry.comments_loaded = true;
        assert!(state.stats_loaded());
    }
}
