//! Session ports.

use crate::domain::{ProviderIdentity, SessionUser};

/// A freshly minted session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Verifies ID tokens handed over by the OAuth provider after sign-in.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, id_token: &str) -> Result<ProviderIdentity, AuthError>;
}

/// Issues and validates this service's own session tokens.
pub trait SessionTokenService: Send + Sync {
    fn issue(&self, user: &SessionUser) -> Result<IssuedToken, AuthError>;

    fn validate(&self, token: &str) -> Result<SessionUser, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
