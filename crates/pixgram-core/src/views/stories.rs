//! Story strip above the feed.

use std::collections::HashSet;

use serde::Serialize;

use super::FeedState;
use crate::domain::SessionUser;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub username: String,
    pub image: Option<String>,
    pub is_viewer: bool,
}

/// The viewer's own bubble first, then each other author in the feed once,
/// in feed order.
pub fn stories(viewer: Option<&SessionUser>, feed: &FeedState) -> Vec<Story> {
    let mut seen = HashSet::new();
    let mut strip = Vec::new();

    if let Some(viewer) = viewer {
        seen.insert(viewer.email.as_str());
        strip.push(Story {
            username: viewer.author_name().to_string(),
            image: viewer.image.clone(),
            is_viewer: true,
        });
    }

    for post in &feed.posts {
        if post.email.is_empty() || !seen.insert(post.email.as_str()) {
            continue;
        }
        strip.push(Story {
            username: post.username.clone(),
            image: post.user_img.clone(),
            is_viewer: false,
        });
    }

    strip
}
