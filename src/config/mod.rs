//! Configuration module for the brand sync engine.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Endpoint and key for the remote relational store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
}

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote store endpoint and key; `None` keeps the engine in local-only mode
    pub remote: Option<RemoteSettings>,
    /// Path to the SQLite file backing the local cache
    pub cache_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let remote = remote_from_parts(
            env::var("BRANDSYNC_REMOTE_URL").ok(),
            env::var("BRANDSYNC_REMOTE_KEY").ok(),
        );

        let cache_path = env::var("BRANDSYNC_CACHE_PATH")
            .unwrap_or_else(|_| "./data/cache.sqlite".to_string())
            .into();

        let log_level = env::var("BRANDSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("BRANDSYNC_LOG_JSON")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            remote,
            cache_path,
            log_level,
            log_json,
        }
    }

    /// Configuration with no remote store, caching at `cache_path`.
    pub fn local_only(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            remote: None,
            cache_path: cache_path.into(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    /// Whether both the remote endpoint and key are present.
    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }
}

fn remote_from_parts(url: Option<String>, api_key: Option<String>) -> Option<RemoteSettings> {
    let url = url.filter(|u| !u.trim().is_empty())?;
    let api_key = api_key.filter(|k| !k.trim().is_empty())?;
    Some(RemoteSettings { url, api_key })
}
