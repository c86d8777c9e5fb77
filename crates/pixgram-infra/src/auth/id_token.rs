//! Verification of the ID token the OAuth provider returns after sign-in.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use pixgram_core::domain::ProviderIdentity;
use pixgram_core::ports::{AuthError, IdentityVerifier};

use super::{DEFAULT_SECRET, warn_on_default_secret};

/// OAuth client registration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub issuer: String,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        let client_secret =
            std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        warn_on_default_secret(&client_secret, "GOOGLE_CLIENT_SECRET");

        Self {
            client_id: std::env::var("GOOGLE_CLIENT_ID")
                .unwrap_or_else(|_| "pixgram-local".to_string()),
            client_secret,
            issuer: std::env::var("OAUTH_ISSUER")
                .unwrap_or_else(|_| "https://accounts.google.com".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Checks HS256 ID tokens signed with the client secret, bound to this
/// client id and the configured issuer.
pub struct OAuthIdTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl OAuthIdTokenVerifier {
    pub fn new(config: OAuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.client_id]);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.client_secret.as_bytes()),
            validation,
        }
    }

    pub fn from_env() -> Self {
        Self::new(OAuthConfig::from_env())
    }
}

impl IdentityVerifier for OAuthIdTokenVerifier {
    fn verify(&self, id_token: &str) -> Result<ProviderIdentity, AuthError> {
        let token_data = decode::<IdTokenClaims>(id_token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;
        if claims.email.trim().is_empty() {
            return Err(AuthError::InvalidToken("ID token carries no email".to_string()));
        }

        // Providers may omit the display name; the mailbox stands in.
        let name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| claims.email.split('@').next().unwrap_or_default().to_string());

        Ok(ProviderIdentity {
            sub: claims.sub,
            name,
            email: claims.email,
            image: claims.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-1".to_string(),
            client_secret: "client-secret".to_string(),
            issuer: "https://accounts.example.com".to_string(),
        }
    }

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(aud: &str) -> serde_json::Value {
        json!({
            "sub": "1234",
            "email": "ada@example.com",
            "name": "Ada Lovelace",
            "picture": "https://example.com/ada.png",
            "aud": aud,
            "iss": "https://accounts.example.com",
            "exp": (Utc::now() + TimeDelta::minutes(5)).timestamp(),
        })
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = OAuthIdTokenVerifier::new(config());
        let identity = verifier.verify(&sign(claims("client-1"), "client-secret")).unwrap();

        assert_eq!(identity.sub, "1234");
        assert_eq!(identity.name, "Ada Lovelace");
        assert_eq!(identity.image.as_deref(), Some("https://example.com/ada.png"));
    }

    #[test]
    fn test_rejects_other_audience() {
        let verifier = OAuthIdTokenVerifier::new(config());
        let result = verifier.verify(&sign(claims("client-2"), "client-secret"));
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_rejects_wrong_signature() {
        let verifier = OAuthIdTokenVerifier::new(config());
        assert!(verifier.verify(&sign(claims("client-1"), "other")).is_err());
    }

    #[test]
    fn test_missing_name_falls_back_to_mailbox() {
        let verifier = OAuthIdTokenVerifier::new(config());
        let mut claims = claims("client-1");
        claims["name"] = serde_json::Value::Null;

        let identity = verifier.verify(&sign(claims, "client-secret")).unwrap();
        assert_eq!(identity.name, "ada");
    }
}
