use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::KvStore;

/// Process-local store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
    writes: Mutex<Vec<String>>,
    yielding: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that yields to the scheduler after every read and before
    /// every write, so concurrent callers interleave like they would
    /// against a real database.
    pub fn yielding() -> Self {
        Self {
            yielding: true,
            ..Self::default()
        }
    }

    async fn pause(&self) {
        if self.yielding {
            tokio::task::yield_now().await;
        }
    }

    /// Keys in write order, one entry per `set` call.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let value = self.entries.lock().unwrap().get(key).cloned();
        self.pause().await;
        Ok(value)
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        self.pause().await;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        self.writes.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, KvStore};

    async fn unserialized_increment(store: &dyn KvStore) {
        let count: u64 = db::load(store, "count").await.unwrap().unwrap_or(0);
        db::save(store, "count", &(count + 1)).await.unwrap();
    }

    #[tokio::test]
    async fn yielding_store_interleaves_concurrent_callers() {
        let store = MemoryStore::yielding();
        tokio::join!(
            unserialized_increment(&store),
            unserialized_increment(&store)
        );
        // Both callers read 0 before either wrote.
        let count: u64 = db::load(&store, "count").await.unwrap().unwrap();
        assert_eq!(count, 1);
    }
}
