//! Single-flight: concurrent misses on one key share a single fetch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde_json::Value;
use tracing::debug;

use crate::FetchError;

pub(crate) type FetchFuture = BoxFuture<'static, Result<Value, FetchError>>;

#[derive(Default)]
pub(crate) struct SingleFlight {
    next_id: AtomicU64,
    /// key -> (flight id, shared fetch). The id keeps a finished flight from
    /// evicting a newer one started under the same key.
    inflight: Mutex<HashMap<String, (u64, Shared<FetchFuture>)>>,
}

impl SingleFlight {
    /// Join the flight for `key`, starting it with `start` if none is running.
    /// `start` is only invoked by the caller that becomes the leader.
    pub(crate) async fn run(
        &self,
        key: &str,
        start: impl FnOnce() -> FetchFuture,
    ) -> Result<Value, FetchError> {
        let (id, flight) = {
            let mut inflight = self.lock();
            if let Some((id, flight)) = inflight.get(key) {
                debug!(key, "Joining in-flight fetch");
                (*id, flight.clone())
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let flight = start().shared();
                inflight.insert(key.to_string(), (id, flight.clone()));
                (id, flight)
            }
        };

        let result = flight.await;

        let mut inflight = self.lock();
        if inflight.get(key).is_some_and(|(current, _)| *current == id) {
            inflight.remove(key);
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (u64, Shared<FetchFuture>)>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
