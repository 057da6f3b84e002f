use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::debug;

use crate::CachedResource;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periodically forces a refetch of a resource.
///
/// The timer owns its task: dropping it (or calling [`cancel`](Self::cancel))
/// aborts the loop so no recurring work outlives the panel that started it.
#[derive(Debug)]
pub struct RefreshTimer {
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    /// Must be called from within a tokio runtime. The first refetch happens one
    /// full `period` after spawning. A zero period is raised to one millisecond.
    #[must_use]
    pub fn spawn(resource: CachedResource, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticks = interval_at(start, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if resource.is_closed() {
                    break;
                }
                debug!(key = resource.key(), "Periodic refetch");
                resource.refetch().await;
            }
        });
        Self { handle }
    }

    pub fn cancel(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
