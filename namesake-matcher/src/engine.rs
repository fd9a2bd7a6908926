//! Name matching engine
//!
//! Owns the [`NameIndex`] and keeps it in step with the persistent store:
//! - `refresh` reloads all four buckets, all or nothing
//! - `add_name` updates the index optimistically, writes through, and rolls
//!   the bucket entry back if the write fails
//! - `match_name` / `match_names` read the index only
//!
//! The environment is passed explicitly on every call; the engine holds no
//! ambient notion of which buckets are active.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use namesake_common::api::{MatchQuery, MatchResult, NameField};
use namesake_common::config::{StartupConfig, TomlConfig};
use namesake_common::Environment;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::classifier::MatchClassifier;
use crate::error::MatcherError;
use crate::index::{Bucket, BucketMap, Category, CorpusSizes, NameIndex};
use crate::phonetic::PhoneticCode;
use crate::store::{NameStore, Namespace, StoreError};

/// Startup refresh retry behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl From<&StartupConfig> for RetryPolicy {
    fn from(config: &StartupConfig) -> Self {
        Self {
            attempts: config.refresh_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Bucket sizes after a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RefreshSummary {
    pub production: CorpusSizes,
    pub development: CorpusSizes,
}

/// Resolves once the corpus has been loaded
#[derive(Debug, Clone)]
pub struct ReadySignal {
    rx: watch::Receiver<bool>,
}

impl ReadySignal {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until ready; `false` if the engine was dropped first
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|ready| *ready).await.is_ok()
    }
}

pub struct MatchingEngine {
    index: NameIndex,
    store: Arc<dyn NameStore>,
    classifier: MatchClassifier,
    store_timeout: Duration,
    ready: watch::Sender<bool>,
}

impl MatchingEngine {
    pub fn new(
        index: NameIndex,
        store: Arc<dyn NameStore>,
        classifier: MatchClassifier,
        store_timeout: Duration,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            index,
            store,
            classifier,
            store_timeout,
            ready,
        }
    }

    /// Engine with an empty index, configured from the bootstrap file
    pub fn from_config(config: &TomlConfig, store: Arc<dyn NameStore>) -> Self {
        Self::new(
            NameIndex::new(),
            store,
            MatchClassifier::from_config(&config.matching),
            Duration::from_millis(config.store.timeout_ms),
        )
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    pub fn ready_signal(&self) -> ReadySignal {
        ReadySignal {
            rx: self.ready.subscribe(),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub async fn corpus_sizes(&self, environment: Environment) -> CorpusSizes {
        self.index.sizes(environment).await
    }

    /// Reload all four buckets from the store
    ///
    /// Either every bucket is replaced or, if any read fails, none is.
    pub async fn refresh(&self) -> Result<RefreshSummary, StoreError> {
        info!("Refreshing name index from store");

        let buckets = self.index.buckets();
        let mut _gates = Vec::with_capacity(buckets.len());
        for (_, _, bucket) in &buckets {
            _gates.push(bucket.lock_writer().await);
        }

        let (first, last, first_dev, last_dev) = tokio::join!(
            self.read_namespace(Namespace::FirstNames),
            self.read_namespace(Namespace::LastNames),
            self.read_namespace(Namespace::FirstNamesDev),
            self.read_namespace(Namespace::LastNamesDev),
        );

        let decoded = match (first, last, first_dev, last_dev) {
            (Ok(a), Ok(b), Ok(c), Ok(d)) => [a, b, c, d],
            (a, b, c, d) => {
                let err = [a.err(), b.err(), c.err(), d.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .unwrap_or_else(|| StoreError::Unavailable("refresh failed".to_string()));
                error!(error = %err, "Refresh aborted, name index left unchanged");
                return Err(err);
            }
        };

        for ((category, environment, bucket), entries) in buckets.iter().zip(decoded) {
            debug!(%category, %environment, names = entries.len(), "Bucket reloaded");
            bucket.replace_all(entries).await;
        }

        let summary = RefreshSummary {
            production: self.index.sizes(Environment::Production).await,
            development: self.index.sizes(Environment::Development).await,
        };
        self.ready.send_replace(true);

        info!(
            production_first = summary.production.first,
            production_last = summary.production.last,
            development_first = summary.development.first,
            development_last = summary.development.last,
            "Name index refresh complete"
        );
        Ok(summary)
    }

    /// Initial load: refresh, retrying per `policy`, then signal readiness
    pub async fn initialize(&self, policy: RetryPolicy) -> Result<RefreshSummary, StoreError> {
        let attempts = policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.refresh().await {
                Ok(summary) => {
                    info!(attempt, "Name matching engine ready");
                    return Ok(summary);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        attempt,
                        attempts,
                        error = %e,
                        "Initial refresh failed, retrying in {:?}",
                        policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempts, error = %e, "Initial refresh failed, giving up");
                    return Err(e);
                }
            }
        }
    }

    /// Add a (first, last) name to the active buckets of `environment`
    ///
    /// Both halves are written through independently, and both are attempted
    /// even if the other fails. A failed half is reverted in memory; the first
    /// failure (first name before last name) is returned.
    pub async fn add_name(
        &self,
        environment: Environment,
        first: &str,
        last: &str,
    ) -> Result<(), MatcherError> {
        validate_name(NameField::First, first)?;
        validate_name(NameField::Last, last)?;

        let (first_result, last_result) = tokio::join!(
            self.add_to_bucket(Category::First, environment, first),
            self.add_to_bucket(Category::Last, environment, last),
        );

        match (first_result, last_result) {
            (Ok(()), Ok(())) => {
                info!(%environment, first, last, "Added name");
                Ok(())
            }
            (Err(source), last_result) => {
                if let Err(last_err) = last_result {
                    warn!(last, error = %last_err, "Last name write also failed");
                }
                Err(MatcherError::AddFailed {
                    field: NameField::First,
                    name: first.to_string(),
                    source,
                })
            }
            (Ok(()), Err(source)) => Err(MatcherError::AddFailed {
                field: NameField::Last,
                name: last.to_string(),
                source,
            }),
        }
    }

    async fn add_to_bucket(
        &self,
        category: Category,
        environment: Environment,
        name: &str,
    ) -> Result<(), StoreError> {
        let bucket: &Bucket = self.index.bucket(category, environment);
        let _writer = bucket.lock_writer().await;

        let prior = bucket.get(name).await;
        let code = self.classifier.encoder().encode(name);
        bucket.insert(name, code.clone()).await;

        let namespace = Namespace::for_bucket(category, environment);
        let stored = code.to_stored();
        let result = self
            .bounded("write", self.store.set_field(namespace, name, &stored))
            .await;

        if let Err(e) = &result {
            warn!(
                %category,
                %environment,
                name,
                error = %e,
                "Error adding {} name, reverting in-memory value",
                category
            );
            bucket.restore(name, prior).await;
        }
        result
    }

    /// Match one query against the active buckets of `environment`
    pub async fn match_name(&self, environment: Environment, query: &MatchQuery) -> MatchResult {
        let first = self
            .match_in_bucket(self.index.bucket(Category::First, environment), &query.first)
            .await;
        let last = self
            .match_in_bucket(self.index.bucket(Category::Last, environment), &query.last)
            .await;

        MatchResult {
            original: query.clone(),
            first,
            last,
        }
    }

    /// Match each query independently, preserving input order
    pub async fn match_names(
        &self,
        environment: Environment,
        queries: &[MatchQuery],
    ) -> Vec<MatchResult> {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            results.push(self.match_name(environment, query).await);
        }
        results
    }

    async fn match_in_bucket(&self, bucket: &Bucket, name: &str) -> Vec<String> {
        if name.trim().is_empty() {
            return Vec::new();
        }

        let query = self.classifier.encode_query(name);
        let entries = bucket.read().await;
        entries
            .iter()
            .filter(|(candidate, code)| {
                match self.classifier.classify(&query, candidate, code) {
                    Some(tier) => {
                        debug!(query = name, candidate = candidate.as_str(), ?tier, "Match");
                        true
                    }
                    None => false,
                }
            })
            .map(|(candidate, _)| candidate.clone())
            .collect()
    }

    /// Release the store's resources
    pub async fn close(&self) {
        self.store.close().await;
    }

    async fn read_namespace(&self, namespace: Namespace) -> Result<BucketMap, StoreError> {
        let fields = self.bounded("read", self.store.read_all(namespace)).await?;
        Ok(fields
            .into_iter()
            .map(|(name, value)| {
                let code = PhoneticCode::from_stored(&value);
                (name, code)
            })
            .collect())
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                after: self.store_timeout,
            }),
        }
    }
}

fn validate_name(field: NameField, name: &str) -> Result<(), MatcherError> {
    if name.trim().is_empty() {
        return Err(MatcherError::Encoding {
            field,
            reason: "name is empty".to_string(),
        });
    }
    Ok(())
}
