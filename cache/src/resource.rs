//! A cached remote resource with observable state.
//!
//! Panels hold a [`CachedResource`] instead of awaiting the cache directly: the
//! loading flag is visible while a fetch is outstanding, and a torn-down panel
//! simply stops listening (late results are discarded, not cancelled).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::{CacheResult, FetchError, TimeBoundedCache};

/// Anything that can produce a fresh JSON document on demand.
pub trait JsonSource: Send + Sync + 'static {
    fn fetch(&self) -> BoxFuture<'static, Result<Value, FetchError>>;
}

impl<F> JsonSource for F
where
    F: Fn() -> BoxFuture<'static, Result<Value, FetchError>> + Send + Sync + 'static,
{
    fn fetch(&self) -> BoxFuture<'static, Result<Value, FetchError>> {
        self()
    }
}

struct Inner {
    cache: TimeBoundedCache,
    source: Box<dyn JsonSource>,
    key: String,
    max_age: Duration,
    state: Mutex<CacheResult>,
    /// Bumped by every load or refetch; only the newest request publishes.
    generation: AtomicU64,
    closed: AtomicBool,
}

#[derive(Clone)]
pub struct CachedResource {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CachedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedResource")
            .field("key", &self.inner.key)
            .field("max_age", &self.inner.max_age)
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

impl CachedResource {
    /// Starts in the loading state; nothing is fetched until [`load`](Self::load).
    pub fn new(
        cache: TimeBoundedCache,
        source: impl JsonSource,
        key: impl Into<String>,
        max_age: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                source: Box::new(source),
                key: key.into(),
                max_age,
                state: Mutex::new(CacheResult::loading()),
                generation: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CacheResult {
        self.lock_state().clone()
    }

    /// Resolve through the cache, honoring the staleness window.
    pub async fn load(&self) -> CacheResult {
        let generation = self.begin();
        let inner = &self.inner;
        let result = inner
            .cache
            .resolve(|| inner.source.fetch(), &inner.key, inner.max_age)
            .await;
        self.publish(generation, result)
    }

    /// Fetch unconditionally.
    pub async fn refetch(&self) -> CacheResult {
        let generation = self.begin();
        let inner = &self.inner;
        let result = inner
            .cache
            .refetch(|| inner.source.fetch(), &inner.key)
            .await;
        self.publish(generation, result)
    }

    /// Stop accepting results. Fetches already in flight run to completion
    /// (and still write through) but no longer change this resource's state.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Enter the loading state. Previously loaded data stays visible until
    /// the new result replaces it.
    fn begin(&self) -> u64 {
        let mut state = self.lock_state();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.is_closed() {
            state.loading = true;
            state.error = None;
        }
        generation
    }

    fn publish(&self, generation: u64, result: CacheResult) -> CacheResult {
        if self.is_closed() {
            debug!(key = %self.inner.key, "Discarding result for closed resource");
            return result;
        }
        let mut state = self.lock_state();
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(key = %self.inner.key, "Discarding result superseded by a newer request");
            return result;
        }
        *state = result.clone();
        result
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheResult> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
