//! View models.
//!
//! A view owns its live queries and publishes derived state through a
//! `tokio::sync::watch` channel. Dropping the view disposes every live query
//! it holds.

mod feed;
mod post;
mod profile;
mod stories;

pub use feed::{FeedState, FeedView, PostCard, feed_query};
pub use post::{PostDetailState, PostView};
pub use profile::{PostStats, ProfileState, ProfileView, user_posts_query};
pub use stories::{Story, stories};
