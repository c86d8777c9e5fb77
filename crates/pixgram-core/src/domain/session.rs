use serde::{Deserialize, Serialize};

/// Identity asserted by the OAuth provider's ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Token subject.
    pub sub: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

/// The authenticated user as every view and service sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    /// Display name without spaces, lowercased.
    pub username: String,
    /// Provider subject.
    pub uid: String,
}

impl SessionUser {
    pub fn from_provider(identity: ProviderIdentity) -> Self {
        let username = derive_username(&identity.name);
        Self {
            name: identity.name,
            email: identity.email,
            image: identity.image,
            username,
            uid: identity.sub,
        }
    }

    /// Username for authored documents, falling back to the display name.
    pub fn author_name(&self) -> &str {
        if self.username.is_empty() {
            &self.name
        } else {
            &self.username
        }
    }
}

fn derive_username(name: &str) -> String {
    name.split(' ').collect::<String>().to_lowercase()
}
