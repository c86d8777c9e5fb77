use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::ports::BlobPayload;

/// Post document under `posts/{id}`.
///
/// Older documents carry a single `image` URL, newer ones an `images` list;
/// both shapes decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub profile_img: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tagged_users: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Post {
    /// The image shown in grids and cards: the legacy `image` when present,
    /// otherwise the first of `images`.
    pub fn display_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or_else(|| self.images.as_ref().and_then(|i| i.first()).map(String::as_str))
    }

    /// All image URLs in display order.
    pub fn all_images(&self) -> Vec<String> {
        match (&self.images, &self.image) {
            (Some(images), _) if !images.is_empty() => images.clone(),
            (_, Some(image)) => vec![image.clone()],
            _ => Vec::new(),
        }
    }

    /// True when neither image shape has been written yet.
    pub fn is_missing_images(&self) -> bool {
        self.image.is_none() && self.images.as_ref().is_none_or(|i| i.is_empty())
    }
}

/// What a user submits from the upload dialog.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub caption: String,
    pub location: String,
    /// Raw, space separated hashtag input.
    pub hashtags: String,
    pub tagged_users: Vec<String>,
    /// Selected files in selection order.
    pub images: Vec<BlobPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Post {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_display_image_falls_back_to_first_of_images() {
        let post = decode(json!({"id": "p", "images": ["u0", "u1"]}));
        assert_eq!(post.display_image(), Some("u0"));
    }

    #[test]
    fn test_legacy_image_is_preferred_when_present() {
        let post = decode(json!({"id": "p", "image": "legacy", "images": ["u0"]}));
        assert_eq!(post.display_image(), Some("legacy"));
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let post = decode(json!({"id": "p", "caption": null, "hashtags": null}));
        assert_eq!(post.caption, "");
        assert!(post.hashtags.is_empty());
        assert!(post.is_missing_images());
        assert_eq!(post.display_image(), None);
    }

    #[test]
    fn test_empty_images_list_counts_as_missing() {
        let post = decode(json!({"id": "p", "images": []}));
        assert!(post.is_missing_images());
        assert!(post.all_images().is_empty());
    }
}
