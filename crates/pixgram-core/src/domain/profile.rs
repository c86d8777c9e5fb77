use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::ports::BlobPayload;

/// Profile document under `users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl UserProfile {
    pub const EMPTY_BIO: &'static str = "No bio yet";

    pub fn bio_display(&self) -> &str {
        if self.bio.trim().is_empty() {
            Self::EMPTY_BIO
        } else {
            &self.bio
        }
    }
}

/// Edits submitted from the profile dialog.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: String,
    pub image: Option<BlobPayload>,
}
