//! Path-addressed JSON document store.
//!
//! Records live in a tree addressed by `/`-separated paths such as
//! `users/<uid>/habits/<id>`. Backends are pluggable: [`memory::MemoryStore`]
//! keeps the tree in process, [`postgres::PgStore`] keeps one JSONB document
//! per user in Postgres. Both share path handling ([`path`]), tree edits
//! ([`tree`]) and change notification ([`notify`]).

pub mod memory;
pub mod notify;
pub mod path;
pub mod paths;
pub mod postgres;
pub mod tree;

use std::sync::Arc;

use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use notify::Subscription;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Receives the full value at the watched path (`None` once it is gone).
pub type ChangeCallback = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Value at `path`, or `None` if nothing is stored there.
    async fn read_path(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Merge `partial` into the node at `path`.
    ///
    /// When both the stored node and `partial` are objects, the keys of
    /// `partial` replace the stored ones and `null` keys are removed;
    /// otherwise the node is replaced outright.
    async fn upsert(&self, path: &str, partial: Value) -> StoreResult<()>;

    /// Remove the node at `path`. Removing a missing node succeeds.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Call `callback` now with the current value at `path`, then after every
    /// write touching `path`, one of its ancestors, or one of its descendants.
    /// The registration lasts as long as the returned [`Subscription`].
    async fn on_change(&self, path: &str, callback: ChangeCallback) -> StoreResult<Subscription>;

    /// Children of the object at `path`; `None` if absent or not an object.
    async fn read_all(&self, path: &str) -> StoreResult<Option<Map<String, Value>>> {
        Ok(match self.read_path(path).await? {
            Some(Value::Object(children)) => Some(children),
            _ => None,
        })
    }

    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
