//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Document database settings. Absent means the in-memory store.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Origin used when building media URLs.
    pub public_base_url: String,
    pub database: Option<DatabaseSettings>,
    /// Redis change feed. Absent means in-process notifications.
    pub redis_url: Option<String>,
    pub redis_connect_timeout: Duration,
    /// Filesystem blob root. Absent means in-memory blobs.
    pub blob_store_dir: Option<PathBuf>,
    /// Largest accepted JSON body; uploads carry images inline.
    pub max_upload_bytes: usize,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed("PORT", 8080);

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
        });

        Self {
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://{host}:{port}")),
            host,
            port,
            database,
            redis_url: env::var("REDIS_URL").ok(),
            redis_connect_timeout: Duration::from_secs(parsed("REDIS_CONNECT_TIMEOUT_SECS", 5)),
            blob_store_dir: env::var("BLOB_STORE_DIR").ok().map(PathBuf::from),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 25 * 1024 * 1024),
        }
    }
}
