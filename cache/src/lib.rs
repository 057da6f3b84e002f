//! Time-bounded read-through caching of remote JSON for SyncSpace panels.
//!
//! # Resolution
//!
//! [`TimeBoundedCache::resolve`] serves a persisted [`CacheEntry`] while it is younger
//! than the staleness window. Otherwise it runs the fetch, writes the result through
//! to the [`PersistentStore`](syncspace_store::PersistentStore) as a whole-entry
//! overwrite, and returns it. Failed fetches leave the stored entry untouched and are
//! reported in [`CacheResult::error`]; serving fallback content is the caller's call.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `cache` | [`TimeBoundedCache`] and the persisted [`CacheEntry`] |
//! | `resource` | [`CachedResource`], observable loading/data/error state with teardown |
//! | `refresh` | [`RefreshTimer`], periodic refetch aborted on drop |
//! | `flight` | Opt-in single-flight sharing of concurrent misses |
//! | `http` | [`HttpJsonSource`], GET-and-decode over `reqwest` |
//! | `feeds` | Quote and news views with static fallback content |
//! | `clock` | Injectable wall clock |

mod cache;
mod clock;
mod error;
mod feeds;
mod flight;
mod http;
mod refresh;
mod resource;

pub use cache::{CacheEntry, CacheResult, TimeBoundedCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::FetchError;
pub use feeds::{
    NewsFeed, NewsView, Provenance, QuoteFeed, QuoteView, news_from_result, quote_from_result,
};
pub use http::HttpJsonSource;
pub use refresh::RefreshTimer;
pub use resource::{CachedResource, JsonSource};
