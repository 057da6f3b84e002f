//! The active-section state machine.
//!
//! ```text
//!            user_navigates (anchor scrolled)
//!   Idle ─────────────────────────────────────► Suppressed
//!    ▲                                              │
//!    └──────── suppression_expires / deadline ──────┘
//! ```
//!
//! Viewport reports are accepted only while idle, optionally coalesced by a
//! trailing debounce that [`poll`](NavigationSynchronizer::poll) commits. The
//! last report turned away while suppressed is held and replayed when the
//! suppression lifts, since a viewport at rest reports nothing new.

use std::time::{Duration, Instant};

use serde::Deserialize;
use syncspace_types::{
    NavigationPhase, NavigationState, SectionCatalog, SectionError, SectionId,
};
use tracing::{debug, warn};

/// Moves the document so a section's region is in view.
pub trait AnchorScroller {
    /// Start scrolling to `anchor`. Returns `false` when no such region exists.
    fn scroll_into_view(&mut self, anchor: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// All panels on one page; navigation scrolls.
    #[default]
    Scrolling,
    /// One panel at a time; nothing scrolls and there is nothing to spy on.
    Paged,
}

/// When a navigation's suppression lifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionRelease {
    /// A fixed guess at the scroll animation's duration.
    Timeout(Duration),
    /// Once no scroll movement has been seen for `quiet`, and no later than `max`.
    Settle { quiet: Duration, max: Duration },
}

impl Default for SuppressionRelease {
    fn default() -> Self {
        Self::Timeout(Duration::from_millis(1000))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynchronizerOptions {
    pub layout: LayoutMode,
    pub release: SuppressionRelease,
    /// Zero commits reports immediately.
    pub debounce: Duration,
}

impl Default for SynchronizerOptions {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Scrolling,
            release: SuppressionRelease::default(),
            debounce: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Suppression {
    started: Instant,
    last_movement: Instant,
}

#[derive(Debug, Clone)]
struct PendingReport {
    section: SectionId,
    due: Instant,
}

#[derive(Debug)]
pub struct NavigationSynchronizer {
    catalog: SectionCatalog,
    options: SynchronizerOptions,
    active: SectionId,
    suppression: Option<Suppression>,
    pending: Option<PendingReport>,
    deferred: Option<PendingReport>,
}

impl NavigationSynchronizer {
    /// Starts idle on the catalog's first section.
    #[must_use]
    pub fn new(catalog: SectionCatalog, options: SynchronizerOptions) -> Self {
        let active = catalog.first().id().clone();
        Self {
            catalog,
            options,
            active,
            suppression: None,
            pending: None,
            deferred: None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn options(&self) -> &SynchronizerOptions {
        &self.options
    }

    #[must_use]
    pub fn active(&self) -> &SectionId {
        &self.active
    }

    #[must_use]
    pub fn state(&self) -> NavigationState {
        NavigationState {
            active_section: self.active.clone(),
            phase: if self.suppression.is_some() {
                NavigationPhase::Suppressed
            } else {
                NavigationPhase::Idle
            },
            suppression_expires_at: self.suppression.map(|s| self.deadline(s)),
        }
    }

    /// Explicit navigation. The active section changes immediately, whether or
    /// not its anchor exists. A pending viewport report is dropped.
    pub fn user_navigates(
        &mut self,
        section: &str,
        now: Instant,
        scroller: &mut dyn AnchorScroller,
    ) -> Result<&SectionId, SectionError> {
        let id = self.catalog.resolve(section)?.id().clone();
        self.expire(now);
        self.pending = None;
        self.deferred = None;
        self.set_active(id, "user");

        if self.options.layout == LayoutMode::Paged {
            return Ok(&self.active);
        }
        if scroller.scroll_into_view(self.active.anchor()) {
            self.suppression = Some(Suppression {
                started: now,
                last_movement: now,
            });
            debug!(section = %self.active, "Suppressing viewport reports");
        } else {
            debug!(anchor = self.active.anchor(), "Anchor not found; not scrolling");
        }
        Ok(&self.active)
    }

    /// A passive report from the viewport observer, in either name form.
    /// Returns whether it was accepted (committed or queued).
    pub fn viewport_reports(&mut self, section: &str, now: Instant) -> bool {
        self.expire(now);
        if self.options.layout == LayoutMode::Paged {
            return false;
        }
        let id = match self.catalog.resolve(section) {
            Ok(found) => found.id().clone(),
            Err(e) => {
                warn!("Ignoring viewport report: {e}");
                return false;
            }
        };
        let report = PendingReport {
            section: id,
            due: now + self.options.debounce,
        };

        if self.suppression.is_some() {
            debug!(section, "Viewport report held while suppressed");
            self.deferred = Some(report);
            return false;
        }
        self.accept(report);
        true
    }

    /// Scroll movement while suppressed. Only matters under
    /// [`SuppressionRelease::Settle`].
    pub fn scroll_observed(&mut self, now: Instant) {
        if let Some(suppression) = self.suppression.as_mut() {
            suppression.last_movement = suppression.last_movement.max(now);
        }
    }

    /// `Suppressed -> Idle`, regardless of the deadline. A report held back
    /// during the suppression goes through the usual debounce.
    pub fn suppression_expires(&mut self) {
        if self.suppression.take().is_some() {
            debug!(section = %self.active, "Suppression lifted");
        }
        if let Some(report) = self.deferred.take() {
            self.accept(report);
        }
    }

    /// Apply every deadline that has passed by `now`. Returns the new active
    /// section if a viewport report was committed and changed it.
    pub fn poll(&mut self, now: Instant) -> Option<&SectionId> {
        let before = self.active.clone();
        self.expire(now);
        if self.pending.as_ref().is_some_and(|p| p.due <= now)
            && let Some(report) = self.pending.take()
        {
            self.set_active(report.section, "viewport");
        }
        (self.active != before).then_some(&self.active)
    }

    /// The earliest instant at which [`poll`](Self::poll) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let suppression = self.suppression.map(|s| self.deadline(s));
        let pending = self.pending.as_ref().map(|p| p.due);
        match (suppression, pending) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn deadline(&self, suppression: Suppression) -> Instant {
        match self.options.release {
            SuppressionRelease::Timeout(duration) => suppression.started + duration,
            SuppressionRelease::Settle { quiet, max } => {
                (suppression.last_movement + quiet).min(suppression.started + max)
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if let Some(suppression) = self.suppression
            && self.deadline(suppression) <= now
        {
            self.suppression_expires();
        }
    }

    fn accept(&mut self, report: PendingReport) {
        if self.options.debounce.is_zero() {
            self.set_active(report.section, "viewport");
        } else {
            self.pending = Some(report);
        }
    }

    fn set_active(&mut self, id: SectionId, cause: &'static str) {
        if id != self.active {
            debug!(from = %self.active, to = %id, cause, "Active section changed");
        }
        self.active = id;
    }
}
