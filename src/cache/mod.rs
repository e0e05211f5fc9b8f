//! Local cache: a synchronous key/value store that always works.
//!
//! [`KeyValueStore`] is the raw store of JSON values. [`LocalCache`] wraps it
//! with typed whole-collection reads and writes. Neither side ever reports a
//! failure to the caller: missing or unreadable values come back as the
//! caller's default, and storage errors are logged and swallowed.

pub mod keys;
mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Raw persistent key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str);
}

/// Typed adapter over a [`KeyValueStore`].
///
/// Callers read a whole collection, change an in-memory copy and write the
/// whole collection back; there are no partial updates.
#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A cache backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read `key`, yielding `default` when the key is missing or its value
    /// does not decode as `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.store.get(key) else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(key, "Discarding unreadable cache entry: {}", err);
                default
            }
        }
    }

    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key, T::default())
    }

    /// Replace the value stored at `key`.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(encoded) => self.store.set(key, encoded),
            Err(err) => tracing::error!(key, "Failed to encode cache entry: {}", err),
        }
    }

    pub fn remove(&self, key: &str) {
        self.store.remove(key);
    }
}
