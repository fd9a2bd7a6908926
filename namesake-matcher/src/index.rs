//! In-memory name index
//!
//! Four buckets, (first | last) × (production | development), each mapping a
//! known name to its cached phonetic code.
//!
//! Every bucket has two locks:
//! - `entries`: guards the map itself; matchers hold it for reading
//! - `writer`: serialises whole write sections (snapshot, mutate, persist,
//!   commit or roll back) so two writers never interleave on one bucket
//!
//! Writers that need several buckets take their writer gates in
//! [`NameIndex::buckets`] order.

use std::collections::BTreeMap;
use std::fmt;

use namesake_common::Environment;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};

use crate::phonetic::PhoneticCode;

/// Which half of a personal name a bucket holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    First,
    Last,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::First => f.write_str("first"),
            Category::Last => f.write_str("last"),
        }
    }
}

pub type BucketMap = BTreeMap<String, PhoneticCode>;

/// One name collection
#[derive(Debug, Default)]
pub struct Bucket {
    entries: RwLock<BucketMap>,
    writer: Mutex<()>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, name: &str) -> Option<PhoneticCode> {
        self.entries.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.entries.read().await.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> BucketMap {
        self.entries.read().await.clone()
    }

    /// Shared read access for enumeration
    pub async fn read(&self) -> RwLockReadGuard<'_, BucketMap> {
        self.entries.read().await
    }

    /// Enter this bucket's exclusive write section
    pub(crate) async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    pub(crate) async fn insert(&self, name: &str, code: PhoneticCode) {
        self.entries.write().await.insert(name.to_string(), code);
    }

    /// Put back the value observed before a failed write; `None` removes the key
    pub(crate) async fn restore(&self, name: &str, prior: Option<PhoneticCode>) {
        let mut entries = self.entries.write().await;
        match prior {
            Some(code) => {
                entries.insert(name.to_string(), code);
            }
            None => {
                entries.remove(name);
            }
        }
    }

    pub(crate) async fn replace_all(&self, entries: BucketMap) {
        *self.entries.write().await = entries;
    }
}

/// Entry counts of one environment's bucket pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CorpusSizes {
    pub first: usize,
    pub last: usize,
}

/// The four name buckets
#[derive(Debug, Default)]
pub struct NameIndex {
    first_names: Bucket,
    last_names: Bucket,
    first_names_dev: Bucket,
    last_names_dev: Bucket,
}

impl NameIndex {
    /// Four empty buckets
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, category: Category, environment: Environment) -> &Bucket {
        match (category, environment) {
            (Category::First, Environment::Production) => &self.first_names,
            (Category::Last, Environment::Production) => &self.last_names,
            (Category::First, Environment::Development) => &self.first_names_dev,
            (Category::Last, Environment::Development) => &self.last_names_dev,
        }
    }

    /// All buckets in canonical lock order
    pub fn buckets(&self) -> [(Category, Environment, &Bucket); 4] {
        [
            (Category::First, Environment::Production, &self.first_names),
            (Category::Last, Environment::Production, &self.last_names),
            (Category::First, Environment::Development, &self.first_names_dev),
            (Category::Last, Environment::Development, &self.last_names_dev),
        ]
    }

    pub async fn sizes(&self, environment: Environment) -> CorpusSizes {
        CorpusSizes {
            first: self.bucket(Category::First, environment).len().await,
            last: self.bucket(Category::Last, environment).len().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buckets_are_independent() {
        let index = NameIndex::new();
        index
            .bucket(Category::First, Environment::Production)
            .insert("Ann", PhoneticCode::new("AN", "AN"))
            .await;

        assert!(index.bucket(Category::First, Environment::Production).contains("Ann").await);
        assert!(!index.bucket(Category::Last, Environment::Production).contains("Ann").await);
        assert!(!index.bucket(Category::First, Environment::Development).contains("Ann").await);
        assert_eq!(
            index.sizes(Environment::Production).await,
            CorpusSizes { first: 1, last: 0 }
        );
    }

    #[tokio::test]
    async fn test_restore_absent_removes_key() {
        let bucket = Bucket::new();
        bucket.insert("Doe", PhoneticCode::new("T", "T")).await;

        bucket.restore("Doe", None).await;

        assert!(!bucket.contains("Doe").await);
    }

    #[tokio::test]
    async fn test_restore_prior_value() {
        let bucket = Bucket::new();
        let prior = PhoneticCode::new("OLD", "OLD");
        bucket.insert("Doe", PhoneticCode::new("NEW", "NEW")).await;

        bucket.restore("Doe", Some(prior.clone())).await;

        assert_eq!(bucket.get("Doe").await, Some(prior));
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let bucket = Bucket::new();
        bucket.insert("smith", PhoneticCode::new("SM0", "XMT")).await;
        assert!(!bucket.contains("Smith").await);
    }
}
