use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use super::path::overlaps;
use super::ChangeCallback;

#[derive(Default)]
struct Table {
    next_id: u64,
    entries: HashMap<u64, (Vec<String>, ChangeCallback)>,
}

/// Change listeners registered against store paths.
#[derive(Clone, Default)]
pub struct Subscribers {
    table: Arc<Mutex<Table>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, segments: &[&str], callback: ChangeCallback) -> Subscription {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.next_id += 1;
        let id = table.next_id;
        table.entries.insert(
            id,
            (segments.iter().map(|s| s.to_string()).collect(), callback),
        );
        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Listeners whose path overlaps `changed`, as `(path, callback)` pairs.
    /// The lock is released before any callback runs.
    pub fn affected(&self, changed: &[&str]) -> Vec<(String, ChangeCallback)> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table
            .entries
            .values()
            .filter(|(watched, _)| overlaps(watched, changed))
            .map(|(watched, callback)| (watched.join("/"), callback.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a change listener registered; dropping it unregisters.
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<Table>>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .entries
                .remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
