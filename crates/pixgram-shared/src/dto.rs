//! Data Transfer Objects - request/response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Exchange an OAuth ID token for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub id_token: String,
}

/// The signed-in user as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUserResponse {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub username: String,
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUserResponse,
}

/// New post from the upload dialog. Images are `data:` URLs in selection order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub location: String,
    /// Space separated, e.g. `"#sun #sea"`.
    #[serde(default)]
    pub hashtags: String,
    #[serde(default)]
    pub tagged_users: Vec<String>,
    pub images: Vec<String>,
}

/// Id of a newly created document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: String,
    /// Optional `data:` URL replacing the profile picture.
    #[serde(default)]
    pub image: Option<String>,
}

/// Fields written by a profile update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}
