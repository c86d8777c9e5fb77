//! Session tokens issued after sign-in.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use pixgram_core::domain::SessionUser;
use pixgram_core::ports::{AuthError, IssuedToken, SessionTokenService};

use super::{DEFAULT_SECRET, warn_on_default_secret};

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "pixgram-api".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SESSION_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        warn_on_default_secret(&secret, "SESSION_SECRET");

        Self {
            secret,
            expiration_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "pixgram-api".to_string()),
        }
    }
}

/// The session user travels inside the token; no server-side session table.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // provider subject
    name: String,
    email: String,
    picture: Option<String>,
    username: String,
    exp: i64,
    iat: i64,
    iss: String,
}

pub struct JwtSessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtSessionService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    pub fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

impl SessionTokenService for JwtSessionService {
    fn issue(&self, user: &SessionUser) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user.uid.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.image.clone(),
            username: user.username.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.expiration_seconds(),
        })
    }

    fn validate(&self, token: &str) -> Result<SessionUser, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = token_data.claims;
        Ok(SessionUser {
            name: claims.name,
            email: claims.email,
            image: claims.picture,
            username: claims.username,
            uid: claims.sub,
        })
    }
}
