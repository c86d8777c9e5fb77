//! Collection, document and blob addressing.
//!
//! Paths alternate collection and document segments:
//! `posts`, `posts/{id}`, `posts/{id}/likes`, `posts/{id}/likes/{email}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Path of a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath(String);

/// Path of a single document (even number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath(String);

fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

fn check_id(id: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() || id.contains('/') {
        return Err(StoreError::InvalidPath(format!("invalid document id '{id}'")));
    }
    Ok(())
}

impl CollectionPath {
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let parts = segments(path)?;
        if parts.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{path}' names a document, not a collection"
            )));
        }
        Ok(Self(path.to_string()))
    }

    /// The document with `id` inside this collection.
    pub fn doc(&self, id: &str) -> Result<DocumentPath, StoreError> {
        check_id(id)?;
        Ok(DocumentPath(format!("{}/{}", self.0, id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocumentPath {
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let parts = segments(path)?;
        if parts.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{path}' names a collection, not a document"
            )));
        }
        Ok(Self(path.to_string()))
    }

    /// Last segment.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Collection holding this document.
    pub fn parent(&self) -> CollectionPath {
        let cut = self.0.rfind('/').unwrap_or(0);
        CollectionPath(self.0[..cut].to_string())
    }

    /// A sub-collection nested under this document.
    pub fn collection(&self, name: &str) -> Result<CollectionPath, StoreError> {
        check_id(name)?;
        Ok(CollectionPath(format!("{}/{}", self.0, name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_conversions {
    ($ty:ident) => {
        impl TryFrom<String> for $ty {
            type Error = StoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_conversions!(CollectionPath);
string_conversions!(DocumentPath);

pub fn posts() -> CollectionPath {
    CollectionPath("posts".to_string())
}

pub fn post(post_id: &str) -> Result<DocumentPath, StoreError> {
    posts().doc(post_id)
}

pub fn likes(post_id: &str) -> Result<CollectionPath, StoreError> {
    post(post_id)?.collection("likes")
}

pub fn like(post_id: &str, email: &str) -> Result<DocumentPath, StoreError> {
    likes(post_id)?.doc(email)
}

pub fn comments(post_id: &str) -> Result<CollectionPath, StoreError> {
    post(post_id)?.collection("comments")
}

pub fn users() -> CollectionPath {
    CollectionPath("users".to_string())
}

pub fn user(user_id: &str) -> Result<DocumentPath, StoreError> {
    users().doc(user_id)
}

/// Object key inside the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    pub fn parse(key: &str) -> Option<Self> {
        let valid = !key.is_empty()
            && key
                .split('/')
                .all(|s| !s.is_empty() && s != "." && s != "..");
        valid.then(|| Self(key.to_string()))
    }

    /// `posts/{postId}/{index}`
    pub fn post_image(post_id: &str, index: usize) -> Self {
        Self(format!("posts/{post_id}/{index}"))
    }

    /// `users/{userId}/profile`
    pub fn profile_image(user_id: &str) -> Self {
        Self(format!("users/{user_id}/profile"))
    }

    /// Prefix covering every image of a post.
    pub fn post_prefix(post_id: &str) -> String {
        format!("posts/{post_id}/")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_paths() {
        let like = like("p1", "ada@example.com").unwrap();
        assert_eq!(like.as_str(), "posts/p1/likes/ada@example.com");
        assert_eq!(like.id(), "ada@example.com");
        assert_eq!(like.parent().as_str(), "posts/p1/likes");
        assert_eq!(comments("p1").unwrap().as_str(), "posts/p1/comments");
    }

    #[test]
    fn test_rejects_wrong_arity() {
        assert!(CollectionPath::parse("posts/p1").is_err());
        assert!(DocumentPath::parse("posts").is_err());
        assert!(DocumentPath::parse("posts//likes/x").is_err());
    }

    #[test]
    fn test_rejects_slash_in_id() {
        assert!(posts().doc("a/b").is_err());
        assert!(posts().doc("  ").is_err());
    }

    #[test]
    fn test_blob_keys() {
        assert_eq!(BlobKey::post_image("p1", 2).as_str(), "posts/p1/2");
        assert_eq!(BlobKey::profile_image("u").as_str(), "users/u/profile");
        assert!(BlobKey::parse("posts/../secret").is_none());
        assert!(BlobKey::parse("posts/p1/0").is_some());
    }
}
