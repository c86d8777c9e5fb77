use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Like under `posts/{id}/likes`, keyed by the liker's email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    /// Document id, which is the liker's email.
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Like {
    pub fn is_by(&self, email: &str) -> bool {
        self.id == email
    }
}
