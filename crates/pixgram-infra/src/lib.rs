//! # Pixgram Infrastructure
//!
//! Concrete implementations of the ports defined in `pixgram-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory adapters only
//! - `postgres` - PostgreSQL document store via SeaORM
//! - `auth` - JWT session tokens and OAuth ID-token verification
//! - `redis` - Redis change feed

pub mod blob;
pub mod feed;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use blob::{InMemoryBlobStore, LocalBlobStore};
pub use feed::InMemoryChangeFeed;
pub use store::InMemoryDocumentStore;

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtSessionService, OAuthConfig, OAuthIdTokenVerifier};

// Re-exports - Hosted
#[cfg(feature = "postgres")]
pub use store::{DatabaseConfig, PostgresDocumentStore};
#[cfg(feature = "redis")]
pub use feed::{RedisChangeFeed, RedisConfig};
