//! Application state - shared across all handlers.

use std::sync::Arc;

use pixgram_core::ports::{
    BlobStore, ChangeFeed, DocumentStore, IdentityVerifier, SessionTokenService,
};
use pixgram_infra::{
    InMemoryBlobStore, InMemoryChangeFeed, InMemoryDocumentStore, JwtSessionService,
    LocalBlobStore, OAuthIdTokenVerifier,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub sessions: Arc<dyn SessionTokenService>,
    pub identities: Arc<dyn IdentityVerifier>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Hosted adapters that fail to connect fall back to their in-memory
    /// counterparts so the server still starts.
    pub async fn new(config: &AppConfig) -> Self {
        let feed = build_feed(config).await;
        let store = build_store(config, feed).await;
        let blobs = build_blobs(config).await;

        tracing::info!("Application state initialized");

        Self {
            store,
            blobs,
            sessions: Arc::new(JwtSessionService::from_env()),
            identities: Arc::new(OAuthIdTokenVerifier::from_env()),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Fully in-process state.
    #[cfg(test)]
    pub fn in_memory(
        public_base_url: &str,
        session: pixgram_infra::JwtConfig,
        oauth: pixgram_infra::OAuthConfig,
    ) -> Self {
        let feed: Arc<dyn ChangeFeed> = Arc::new(InMemoryChangeFeed::default());
        Self {
            store: Arc::new(InMemoryDocumentStore::new(feed)),
            blobs: Arc::new(InMemoryBlobStore::new(public_base_url)),
            sessions: Arc::new(JwtSessionService::new(session)),
            identities: Arc::new(OAuthIdTokenVerifier::new(oauth)),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

#[cfg(feature = "redis")]
async fn build_feed(config: &AppConfig) -> Arc<dyn ChangeFeed> {
    use pixgram_infra::{RedisChangeFeed, RedisConfig};

    let Some(url) = &config.redis_url else {
        tracing::info!("REDIS_URL not set. Live queries use in-process notifications.");
        return Arc::new(InMemoryChangeFeed::default());
    };

    let redis = RedisConfig {
        url: url.clone(),
        connect_timeout: config.redis_connect_timeout,
    };
    match RedisChangeFeed::new(redis).await {
        Ok(feed) => Arc::new(feed),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis. Using in-process notifications.");
            Arc::new(InMemoryChangeFeed::default())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_feed(_config: &AppConfig) -> Arc<dyn ChangeFeed> {
    Arc::new(InMemoryChangeFeed::default())
}

#[cfg(feature = "postgres")]
async fn build_store(config: &AppConfig, feed: Arc<dyn ChangeFeed>) -> Arc<dyn DocumentStore> {
    use pixgram_infra::{DatabaseConfig, PostgresDocumentStore};

    let Some(settings) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Arc::new(InMemoryDocumentStore::new(feed));
    };

    let db = DatabaseConfig {
        url: settings.url.clone(),
        max_connections: settings.max_connections,
        min_connections: settings.min_connections,
    };
    match PostgresDocumentStore::connect(&db, Arc::clone(&feed)).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            Arc::new(InMemoryDocumentStore::new(feed))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store(_config: &AppConfig, feed: Arc<dyn ChangeFeed>) -> Arc<dyn DocumentStore> {
    tracing::info!("Running without postgres feature - using in-memory document store");
    Arc::new(InMemoryDocumentStore::new(feed))
}

async fn build_blobs(config: &AppConfig) -> Arc<dyn BlobStore> {
    let Some(dir) = &config.blob_store_dir else {
        tracing::warn!("BLOB_STORE_DIR not set. Uploaded images are kept in memory.");
        return Arc::new(InMemoryBlobStore::new(config.public_base_url.clone()));
    };

    match LocalBlobStore::new(dir.clone(), config.public_base_url.clone()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "Failed to open blob directory. Using in-memory blobs.");
            Arc::new(InMemoryBlobStore::new(config.public_base_url.clone()))
        }
    }
}
