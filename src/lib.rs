//! Brand Sync
//!
//! Offline-first synchronization of brands, keyword workspaces, ad campaigns
//! and knowledge-base documents between a local key/value cache and a remote
//! relational store.

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod remote;
pub mod settings;
pub mod sync;

pub use cache::{KeyValueStore, LocalCache, MemoryStore, SqliteStore};
pub use config::{Config, RemoteSettings};
pub use errors::{RemoteError, RemoteResult};
pub use remote::{RemoteCollection, RemoteStore, SessionProbe};
pub use settings::Settings;
pub use sync::{
    BrandSync, ConnectivityOracle, DeletePolicy, DocumentSync, LocalOnlyReason, PushSummary,
    StorageContext, SyncOutcome, SyncReport, WorkspaceSync,
};

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_ok() {
        tracing::debug!("Logging initialized at level {}", config.log_level);
    }
}

/// Open the SQLite-backed cache at the configured path and build a context.
///
/// `remote` is ignored unless `config` carries remote settings.
///
/// Cache writes reach disk through a background task on the current runtime.
/// Await [`SqliteStore::flush`] on the returned handle before the runtime
/// shuts down; writes still queued when it stops are lost.
pub async fn open_context(
    config: &Config,
    remote: Option<RemoteStore>,
) -> Result<(StorageContext, Arc<SqliteStore>), sqlx::Error> {
    let store = Arc::new(SqliteStore::open(&config.cache_path).await?);
    let cache = LocalCache::new(store.clone());
    tracing::info!("Local cache opened at {:?}", config.cache_path);
    Ok((StorageContext::new(config, cache, remote), store))
}

#[cfg(test)]
mod tests;
