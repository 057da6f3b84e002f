//! Read-through cache with a staleness window.
//!
//! Entries live in the shared [`PersistentStore`] under the caller's key, shaped
//! `{"timestamp": <epoch-ms>, "data": <response body>}`. Each refresh overwrites the
//! whole entry; concurrent refreshes of one key race and the last write wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use syncspace_store::PersistentStore;
use tracing::{debug, warn};

use crate::flight::{FetchFuture, SingleFlight};
use crate::{Clock, FetchError};

/// A persisted fetch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Storage key. Not part of the stored document.
    #[serde(skip)]
    pub key: String,
    /// Epoch milliseconds at which the payload arrived.
    #[serde(rename = "timestamp")]
    pub fetched_at: i64,
    #[serde(rename = "data")]
    pub payload: Value,
}

impl CacheEntry {
    #[must_use]
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.fetched_at
    }

    /// Fresh while strictly younger than `max_age`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64, max_age: Duration) -> bool {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        self.age_ms(now_ms) < max_age_ms
    }
}

/// Outcome of one resolution cycle. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheResult {
    pub data: Option<Value>,
    pub error: Option<FetchError>,
    pub loading: bool,
}

impl CacheResult {
    #[must_use]
    pub fn loading() -> Self {
        Self {
            data: None,
            error: None,
            loading: true,
        }
    }

    #[must_use]
    pub fn ready(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
            loading: false,
        }
    }

    #[must_use]
    pub fn failed(error: FetchError) -> Self {
        Self {
            data: None,
            error: Some(error),
            loading: false,
        }
    }
}

#[derive(Clone)]
pub struct TimeBoundedCache {
    store: PersistentStore,
    clock: Arc<dyn Clock>,
    flights: Option<Arc<SingleFlight>>,
}

impl std::fmt::Debug for TimeBoundedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeBoundedCache")
            .field("single_flight", &self.flights.is_some())
            .finish_non_exhaustive()
    }
}

impl TimeBoundedCache {
    #[must_use]
    pub fn new(store: PersistentStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            flights: None,
        }
    }

    /// Share one in-flight fetch between concurrent misses on the same key.
    /// Off by default: overlapping calls otherwise each hit the network.
    #[must_use]
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(|| Arc::new(SingleFlight::default()));
        self
    }

    #[must_use]
    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// The stored entry for `key`, whatever its age.
    #[must_use]
    pub fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        self.store.try_read::<CacheEntry>(key).map(|mut entry| {
            entry.key = key.to_string();
            entry
        })
    }

    /// Serve the stored entry if it is fresh, otherwise fetch and write through.
    pub async fn resolve<F, Fut>(&self, fetch: F, key: &str, max_age: Duration) -> CacheResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
    {
        let now = self.clock.now_ms();
        match self.read_entry(key) {
            Some(entry) if entry.is_fresh(now, max_age) => {
                debug!(key, age_ms = entry.age_ms(now), "Cache hit");
                return CacheResult::ready(entry.payload);
            }
            Some(entry) => debug!(key, age_ms = entry.age_ms(now), "Cache entry stale"),
            None => debug!(key, "Cache miss"),
        }

        self.fetch_through(fetch, key).await
    }

    /// Fetch unconditionally, writing through on success only.
    pub async fn refetch<F, Fut>(&self, fetch: F, key: &str) -> CacheResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
    {
        debug!(key, "Forced refetch");
        self.fetch_through(fetch, key).await
    }

    async fn fetch_through<F, Fut>(&self, fetch: F, key: &str) -> CacheResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
    {
        let result = match &self.flights {
            Some(flights) => {
                flights
                    .run(key, || self.write_through(key, fetch()))
                    .await
            }
            None => self.write_through(key, fetch()).await,
        };

        match result {
            Ok(data) => CacheResult::ready(data),
            Err(e) => {
                warn!(key, "Failed to fetch data: {e}");
                CacheResult::failed(e)
            }
        }
    }

    /// Wrap `fetch` so a success is persisted, stamped at arrival time.
    fn write_through<Fut>(&self, key: &str, fetch: Fut) -> FetchFuture
    where
        Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
    {
        let store = self.store.clone();
        let clock = Arc::clone(&self.clock);
        let key = key.to_string();

        async move {
            let result = fetch.await;
            if let Ok(payload) = &result {
                let entry = CacheEntry {
                    key: key.clone(),
                    fetched_at: clock.now_ms(),
                    payload: payload.clone(),
                };
                store.write(&key, &entry);
            }
            result
        }
        .boxed()
    }
}
