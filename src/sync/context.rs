//! Explicit storage context threaded into every coordinator call.

use crate::cache::LocalCache;
use crate::config::Config;
use crate::remote::RemoteStore;

use super::{ConnectivityOracle, LocalOnlyReason};

/// The local cache, the optional remote store, and the oracle deciding
/// between them. Built once at startup and passed by reference.
#[derive(Clone)]
pub struct StorageContext {
    cache: LocalCache,
    remote: Option<RemoteStore>,
    oracle: ConnectivityOracle,
}

impl StorageContext {
    /// The remote store is used only when `config` carries remote settings.
    pub fn new(config: &Config, cache: LocalCache, remote: Option<RemoteStore>) -> Self {
        let remote = if config.remote_configured() {
            remote
        } else {
            if remote.is_some() {
                tracing::warn!("Remote store supplied without endpoint settings; ignoring it");
            }
            None
        };
        let oracle = ConnectivityOracle::new(remote.as_ref().map(|r| r.session.clone()));

        Self {
            cache,
            remote,
            oracle,
        }
    }

    /// A context that never consults a remote store.
    pub fn local_only(cache: LocalCache) -> Self {
        Self {
            cache,
            remote: None,
            oracle: ConnectivityOracle::offline(),
        }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn oracle(&self) -> &ConnectivityOracle {
        &self.oracle
    }

    /// Ask the oracle and hand back the remote store when it may be used.
    pub async fn connect(&self) -> Result<&RemoteStore, LocalOnlyReason> {
        self.oracle.check().await?;
        self.remote.as_ref().ok_or(LocalOnlyReason::NotConfigured)
    }
}
