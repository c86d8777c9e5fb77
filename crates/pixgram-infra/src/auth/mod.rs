//! Session and sign-in implementations.

mod id_token;
mod jwt;

pub use id_token::{OAuthConfig, OAuthIdTokenVerifier};
pub use jwt::{JwtConfig, JwtSessionService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// Complain loudly when a signing secret was left at its default.
fn warn_on_default_secret(secret: &str, variable: &str) {
    if secret != DEFAULT_SECRET {
        return;
    }
    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production" || v == "prod")
        .unwrap_or(false);

    if is_production {
        tracing::error!(
            variable,
            "SECURITY: Using the default secret in production! Set it in the environment."
        );
    } else {
        tracing::warn!(variable, "Using the default secret. Set it for production use.");
    }
}
