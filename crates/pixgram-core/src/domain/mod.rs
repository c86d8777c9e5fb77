//! Domain entities - the documents views render and services write.

mod comment;
mod like;
mod post;
mod profile;
mod session;
mod text;

pub use comment::Comment;
pub use like::Like;
pub use post::{Post, PostDraft};
pub use profile::{ProfileUpdate, UserProfile};
pub use session::{ProviderIdentity, SessionUser};
pub use text::{extract_hashtags, normalize_tagged_users};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
