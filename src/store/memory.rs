use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::notify::Subscribers;
use super::{path, tree, ChangeCallback, RecordStore, StoreResult, Subscription};

/// Whole tree held in memory. Used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tree: Arc<RwLock<Value>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn notify(&self, changed: &[&str]) {
        for (watched, callback) in self.subscribers.affected(changed) {
            let value = self.read_path(&watched).await.ok().flatten();
            callback(value.as_ref());
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn read_path(&self, path: &str) -> StoreResult<Option<Value>> {
        let segments = path::segments(path)?;
        let doc = self.tree.read().await;
        Ok(tree::get(&doc, &segments).cloned())
    }

    async fn upsert(&self, path: &str, partial: Value) -> StoreResult<()> {
        let segments = path::segments(path)?;
        {
            let mut doc = self.tree.write().await;
            tree::merge(&mut doc, &segments, partial);
        }
        tracing::debug!(path = %path, "Record upserted");
        self.notify(&segments).await;
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let segments = path::segments(path)?;
        let removed = {
            let mut doc = self.tree.write().await;
            tree::remove(&mut doc, &segments)
        };
        if removed {
            tracing::debug!(path = %path, "Record deleted");
            self.notify(&segments).await;
        }
        Ok(())
    }

    async fn on_change(&self, path: &str, callback: ChangeCallback) -> StoreResult<Subscription> {
        let segments = path::segments(path)?;
        let subscription = self.subscribers.register(&segments, callback.clone());
        let current = self.read_path(path).await?;
        callback(current.as_ref());
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder() -> (ChangeCallback, Arc<Mutex<Vec<Option<Value>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ChangeCallback = Arc::new(move |value: Option<&Value>| {
            sink.lock().unwrap().push(value.cloned());
        });
        (callback, seen)
    }

    #[tokio::test]
    async fn test_read_all_returns_children() {
        let store = MemoryStore::new();
        store.upsert("users/u1/habits/h1", json!({ "name": "Run" })).await.unwrap();
        store.upsert("users/u1/habits/h2", json!({ "name": "Read" })).await.unwrap();

        let habits = store.read_all("users/u1/habits").await.unwrap().unwrap();
        assert_eq!(habits.len(), 2);
        assert_eq!(habits["h2"]["name"], "Read");
        assert!(store.read_all("users/u1/moods").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_merges_fields() {
        let store = MemoryStore::new();
        store
            .upsert("users/u1/habits/h1", json!({ "name": "Run", "completedToday": false }))
            .await
            .unwrap();
        store
            .upsert("users/u1/habits/h1", json!({ "completedToday": true }))
            .await
            .unwrap();
        let habit = store.read_path("users/u1/habits/h1").await.unwrap().unwrap();
        assert_eq!(habit, json!({ "name": "Run", "completedToday": true }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete("users/u1/moods/2024-01-01").await.unwrap();
        assert!(store.read_path("users/u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_path_is_rejected() {
        let store = MemoryStore::new();
        assert!(store.upsert("users//habits", json!({})).await.is_err());
        assert!(store.read_path("").await.is_err());
    }

    #[tokio::test]
    async fn test_on_change_fires_immediately_then_on_writes() {
        let store = MemoryStore::new();
        let (callback, seen) = recorder();
        let subscription = store.on_change("users/u1/habits", callback).await.unwrap();

        store.upsert("users/u1/habits/h1", json!({ "name": "Run" })).await.unwrap();
        store.upsert("users/u1/moods/2024-01-01", json!({ "mood": "😊" })).await.unwrap();
        store.delete("users/u1/habits/h1").await.unwrap();

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 3, "initial + upsert + delete, mood write ignored");
            assert_eq!(seen[0], None);
            assert_eq!(seen[1], Some(json!({ "h1": { "name": "Run" } })));
            assert_eq!(seen[2], None);
        }

        drop(subscription);
        assert!(store.subscribers.is_empty());
        store.upsert("users/u1/habits/h2", json!({ "name": "Read" })).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_parent_write_notifies_child_watchers() {
        let store = MemoryStore::new();
        let (callback, seen) = recorder();
        let _subscription = store.on_change("users/u1/stats", callback).await.unwrap();
        store
            .upsert("users/u1", json!({ "stats": { "currentStreak": 2 } }))
            .await
            .unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().cloned().flatten(), Some(json!({ "currentStreak": 2 })));
    }
}
