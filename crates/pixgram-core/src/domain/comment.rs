use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Comment under `posts/{id}/comments`. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
