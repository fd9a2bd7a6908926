//! In-process name store
//!
//! Holds namespaces in memory and can be told to fail or stall, which lets
//! callers exercise rollback, refresh atomicity and timeout handling.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{NameStore, Namespace, StoreError};

#[derive(Default)]
pub struct MemoryNameStore {
    data: RwLock<HashMap<Namespace, HashMap<String, String>>>,
    failing_reads: RwLock<HashSet<Namespace>>,
    failing_writes: RwLock<HashSet<Namespace>>,
    delay: RwLock<Option<Duration>>,
    writes: AtomicUsize,
}

impl MemoryNameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw stored value directly, bypassing failure injection
    pub async fn seed(&self, namespace: Namespace, name: &str, value: &str) {
        self.data
            .write()
            .await
            .entry(namespace)
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    /// Current contents of a namespace
    pub async fn snapshot(&self, namespace: Namespace) -> HashMap<String, String> {
        self.data
            .read()
            .await
            .get(&namespace)
            .cloned()
            .unwrap_or_default()
    }

    /// Make reads of `namespace` fail (or succeed again)
    pub async fn fail_reads(&self, namespace: Namespace, failing: bool) {
        let mut set = self.failing_reads.write().await;
        if failing {
            set.insert(namespace);
        } else {
            set.remove(&namespace);
        }
    }

    /// Make writes to `namespace` fail (or succeed again)
    pub async fn fail_writes(&self, namespace: Namespace, failing: bool) {
        let mut set = self.failing_writes.write().await;
        if failing {
            set.insert(namespace);
        } else {
            set.remove(&namespace);
        }
    }

    /// Stall every call by `delay` before it is served
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Number of `set_field` calls served, failed or not
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn stall(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl NameStore for MemoryNameStore {
    async fn read_all(&self, namespace: Namespace) -> Result<HashMap<String, String>, StoreError> {
        self.stall().await;

        if self.failing_reads.read().await.contains(&namespace) {
            return Err(StoreError::Unavailable(format!("read of {} refused", namespace)));
        }

        Ok(self.snapshot(namespace).await)
    }

    async fn set_field(&self, namespace: Namespace, name: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.stall().await;

        if self.failing_writes.read().await.contains(&namespace) {
            return Err(StoreError::Rejected(format!(
                "write of {}.{} refused",
                namespace, name
            )));
        }

        self.seed(namespace, name, value).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_failure_switches() {
        let store = MemoryNameStore::new();

        store.set_field(Namespace::LastNames, "Doe", "T:T").await.unwrap();
        assert_eq!(store.read_all(Namespace::LastNames).await.unwrap().len(), 1);

        store.fail_writes(Namespace::LastNames, true).await;
        assert!(store.set_field(Namespace::LastNames, "Roe", "R:R").await.is_err());
        assert_eq!(store.write_count(), 2);

        store.fail_reads(Namespace::LastNames, true).await;
        assert!(store.read_all(Namespace::LastNames).await.is_err());

        store.fail_reads(Namespace::LastNames, false).await;
        let fields = store.read_all(Namespace::LastNames).await.unwrap();
        assert!(fields.contains_key("Doe"));
        assert!(!fields.contains_key("Roe"));
    }
}
