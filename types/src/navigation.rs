//! Navigation state shared between the synchronizer and its renderers.

use std::time::Instant;

use crate::SectionId;

/// One region's visibility as reported by a single observation pass.
///
/// Ephemeral: produced per observation callback and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusObservation {
    pub section: SectionId,
    /// Fraction of the region currently visible, in `[0, 1]`.
    pub intersection_ratio: f64,
    /// Absolute distance in pixels between the region's vertical center and the
    /// viewport's vertical center.
    pub distance_from_center: f64,
}

impl FocusObservation {
    #[must_use]
    pub fn new(section: SectionId, intersection_ratio: f64, distance_from_center: f64) -> Self {
        Self {
            section,
            intersection_ratio: intersection_ratio.clamp(0.0, 1.0),
            distance_from_center: distance_from_center.abs(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.intersection_ratio > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPhase {
    /// Passive: viewport reports are accepted.
    #[default]
    Idle,
    /// A programmatic scroll is in motion: viewport reports are discarded.
    Suppressed,
}

/// Snapshot of the synchronizer's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub active_section: SectionId,
    pub phase: NavigationPhase,
    /// When the current suppression lifts at the latest. `None` while idle.
    pub suppression_expires_at: Option<Instant>,
}

impl NavigationState {
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.phase == NavigationPhase::Suppressed
    }
}
