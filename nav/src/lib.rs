//! Keeps the active section consistent between explicit navigation and
//! passive scrolling.
//!
//! [`ViewportObserver`] turns raw region visibility into a single focused
//! section. [`NavigationSynchronizer`] arbitrates between those reports and
//! user navigation, ignoring reports while a programmatic scroll it started
//! is still in motion.
//!
//! Neither type reads a clock: every transition takes the current
//! [`Instant`](std::time::Instant) from the caller.

mod synchronizer;
mod viewport;

pub use synchronizer::{
    AnchorScroller, LayoutMode, NavigationSynchronizer, SuppressionRelease, SynchronizerOptions,
};
pub use viewport::{
    ObserverOptions, RegionSample, ViewportObserver, VisibilitySource, select_focus,
};
