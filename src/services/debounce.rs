use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use super::wellness::WellnessService;

/// Per-user throttle for the recompute that follows every mutation.
///
/// The first mutation for a user schedules one recompute `delay` after it;
/// mutations arriving before it runs are folded into it without pushing it
/// back. A mutation that lands while the recompute is already reading
/// schedules a fresh one.
#[derive(Clone)]
pub struct RecomputeDebouncer {
    pending: Arc<Mutex<HashSet<String>>>,
    delay: Duration,
    service: WellnessService,
}

impl RecomputeDebouncer {
    pub fn new(service: WellnessService, delay: Duration) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashSet::new())),
            delay,
            service,
        }
    }

    /// Returns `true` if this call scheduled a recompute, `false` if it joined one.
    pub async fn schedule(&self, uid: &str) -> bool {
        if !self.pending.lock().await.insert(uid.to_string()) {
            tracing::debug!(user_id = %uid, "Recompute already pending");
            return false;
        }

        let this = self.clone();
        let uid = uid.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(this.delay).await;
            this.pending.lock().await.remove(&uid);
            if let Err(e) = this.service.recompute(&uid, Utc::now()).await {
                tracing::warn!(user_id = %uid, error = %e, "Debounced recompute failed");
            }
        });
        true
    }

    pub async fn is_pending(&self, uid: &str) -> bool {
        self.pending.lock().await.contains(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RecordStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_burst_is_coalesced_into_one_recompute() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert("users/u1/habits/h1", json!({ "name": "Run", "completedToday": true }))
            .await
            .unwrap();
        let debouncer =
            RecomputeDebouncer::new(WellnessService::new(store.clone()), Duration::from_millis(20));

        assert!(debouncer.schedule("u1").await);
        for _ in 0..9 {
            assert!(!debouncer.schedule("u1").await);
        }
        assert!(debouncer.is_pending("u1").await);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!debouncer.is_pending("u1").await);

        let scores = store.read_all("users/u1/wellnessScores").await.unwrap().unwrap();
        assert_eq!(scores.len(), 1);
        let score = scores.values().next().unwrap();
        // habit 50 + streak 4
        assert_eq!(score["score"], 54);
    }

    #[tokio::test]
    async fn test_users_are_debounced_separately() {
        let store = Arc::new(MemoryStore::new());
        let debouncer =
            RecomputeDebouncer::new(WellnessService::new(store), Duration::from_millis(20));
        assert!(debouncer.schedule("u1").await);
        assert!(debouncer.schedule("u2").await);
    }
}
