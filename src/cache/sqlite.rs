//! SQLite-backed persistent key/value store.
//!
//! Reads are served from an in-memory snapshot loaded at open, so they stay
//! synchronous. Writes update the snapshot immediately and are persisted in
//! order by a single background writer task.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::sync::{mpsc, oneshot};

use super::KeyValueStore;

enum WriteOp {
    Put { key: String, value: String },
    Delete { key: String },
    Flush(oneshot::Sender<()>),
}

/// Persistent [`KeyValueStore`] stored in a single SQLite table.
pub struct SqliteStore {
    snapshot: RwLock<HashMap<String, Value>>,
    writes: mpsc::UnboundedSender<WriteOp>,
}

impl SqliteStore {
    /// Open (or create) the cache file and load its contents.
    ///
    /// Must be called from within a Tokio runtime; the writer task is spawned
    /// onto it.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let pool = init_pool(path).await?;

        let rows = sqlx::query("SELECT key, value FROM kv")
            .fetch_all(&pool)
            .await?;

        let mut snapshot = HashMap::with_capacity(rows.len());
        for row in rows {
            let key: String = row.get("key");
            let raw: String = row.get("value");
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    snapshot.insert(key, value);
                }
                Err(err) => tracing::warn!(key, "Skipping corrupt cache row: {}", err),
            }
        }
        tracing::debug!("Loaded {} cache entries from {:?}", snapshot.len(), path);

        let (writes, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(pool, rx));

        Ok(Self {
            snapshot: RwLock::new(snapshot),
            writes,
        })
    }

    /// Wait until every write issued so far has reached the database.
    ///
    /// The writer task dies with its runtime, so call this before shutdown.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.writes.send(WriteOp::Flush(done)).is_ok() {
            wait.await.ok();
        }
    }

    fn enqueue(&self, op: WriteOp) {
        if self.writes.send(op).is_err() {
            tracing::error!("Cache writer has stopped; change kept in memory only");
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.snapshot.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let raw = value.to_string();
        self.snapshot.write().insert(key.to_string(), value);
        self.enqueue(WriteOp::Put {
            key: key.to_string(),
            value: raw,
        });
    }

    fn remove(&self, key: &str) {
        self.snapshot.write().remove(key);
        self.enqueue(WriteOp::Delete {
            key: key.to_string(),
        });
    }
}

/// Initialize the connection pool and create the table.
async fn init_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    // One connection keeps writes strictly ordered
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

async fn run_writer(pool: SqlitePool, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    while let Some(op) = rx.recv().await {
        let result = match op {
            WriteOp::Put { key, value } => {
                sqlx::query(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                )
                .bind(&key)
                .bind(&value)
                .bind(Utc::now().to_rfc3339())
                .execute(&pool)
                .await
            }
            WriteOp::Delete { key } => {
                sqlx::query("DELETE FROM kv WHERE key = ?")
                    .bind(&key)
                    .execute(&pool)
                    .await
            }
            WriteOp::Flush(done) => {
                done.send(()).ok();
                continue;
            }
        };

        if let Err(err) = result {
            tracing::error!("Cache write failed: {:?}", err);
        }
    }

    pool.close().await;
}
