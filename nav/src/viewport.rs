//! Scroll-spy: which of several regions is most prominently visible.

use std::cmp::Ordering;
use std::collections::HashMap;

use syncspace_types::{FocusObservation, SectionId};
use tracing::{debug, trace};

/// One region's geometry and visibility, relative to the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSample {
    pub section: SectionId,
    /// Visible fraction of the region.
    pub ratio: f64,
    /// Distance from the viewport's top edge to the region's top edge.
    pub top: f64,
    pub height: f64,
}

impl RegionSample {
    #[must_use]
    pub fn new(section: SectionId, ratio: f64, top: f64, height: f64) -> Self {
        Self {
            section,
            ratio,
            top,
            height,
        }
    }

    #[must_use]
    pub fn observation(&self, viewport_height: f64) -> FocusObservation {
        let center = self.top + self.height / 2.0;
        FocusObservation::new(
            self.section.clone(),
            self.ratio,
            center - viewport_height / 2.0,
        )
    }
}

/// Anything that can report per-region visibility on a recurring basis.
pub trait VisibilitySource {
    /// Replace the watched set. Only these anchors are reported afterwards.
    fn subscribe(&mut self, anchors: &[&str]);

    fn viewport_height(&self) -> f64;

    /// Samples gathered since the previous call.
    fn take_batch(&mut self) -> Vec<RegionSample>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Ascending ratios in `[0, 1]`. A sample is only acted on when it moves
    /// its region across one of these.
    pub thresholds: Vec<f64>,
}

impl ObserverOptions {
    /// `steps` evenly spaced thresholds from 0 to 1 inclusive.
    #[must_use]
    pub fn evenly_spaced(steps: u32) -> Self {
        let steps = steps.max(2);
        let last = f64::from(steps - 1);
        Self {
            thresholds: (0..steps).map(|i| f64::from(i) / last).collect(),
        }
    }

    fn bucket(&self, ratio: f64) -> usize {
        if ratio <= 0.0 {
            return 0;
        }
        1 + self
            .thresholds
            .iter()
            .filter(|&&t| t > 0.0 && ratio >= t)
            .count()
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::evenly_spaced(21)
    }
}

/// Highest ratio wins; equal ratios go to the region nearest the viewport center.
/// Regions with a zero ratio never win. Remaining ties keep the earliest.
pub fn select_focus<'a>(
    observations: impl IntoIterator<Item = &'a FocusObservation>,
) -> Option<&'a FocusObservation> {
    observations
        .into_iter()
        .filter(|o| o.is_visible())
        .fold(None, |best: Option<&FocusObservation>, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                let better = match candidate
                    .intersection_ratio
                    .total_cmp(&current.intersection_ratio)
                {
                    Ordering::Greater => true,
                    Ordering::Equal => {
                        candidate.distance_from_center < current.distance_from_center
                    }
                    Ordering::Less => false,
                };
                Some(if better { candidate } else { current })
            }
        })
}

#[derive(Debug, Clone)]
struct Tracked {
    observation: FocusObservation,
    bucket: usize,
}

#[derive(Debug)]
pub struct ViewportObserver<S> {
    source: S,
    options: ObserverOptions,
    sections: Vec<SectionId>,
    latest: HashMap<SectionId, Tracked>,
    active: Option<SectionId>,
}

impl<S: VisibilitySource> ViewportObserver<S> {
    pub fn new(source: S, options: ObserverOptions) -> Self {
        Self {
            source,
            options,
            sections: Vec::new(),
            latest: HashMap::new(),
            active: None,
        }
    }

    /// Watch exactly `sections`. Re-subscribes only when the set changes.
    pub fn set_sections(&mut self, sections: impl IntoIterator<Item = SectionId>) {
        let sections: Vec<SectionId> = sections.into_iter().collect();
        if sections == self.sections {
            return;
        }
        self.latest.retain(|id, _| sections.contains(id));
        let anchors: Vec<&str> = sections.iter().map(SectionId::anchor).collect();
        self.source.subscribe(&anchors);
        debug!(count = sections.len(), "Viewport observer resubscribed");
        self.sections = sections;
    }

    #[must_use]
    pub fn active(&self) -> Option<&SectionId> {
        self.active.as_ref()
    }

    /// Drain the source and return the active section's display name.
    /// `None` until some region has been visible.
    pub fn observe(&mut self) -> Option<String> {
        let batch = self.source.take_batch();
        let viewport_height = self.source.viewport_height();
        self.observe_batch(&batch, viewport_height)
    }

    pub fn observe_batch(
        &mut self,
        batch: &[RegionSample],
        viewport_height: f64,
    ) -> Option<String> {
        let mut crossed = false;
        for sample in batch {
            if !self.sections.contains(&sample.section) {
                trace!(section = %sample.section, "Ignoring sample for unwatched region");
                continue;
            }
            let observation = sample.observation(viewport_height);
            let bucket = self.options.bucket(observation.intersection_ratio);
            let previous = self.latest.get(&sample.section).map(|t| t.bucket);
            if previous != Some(bucket) {
                crossed = true;
            }
            self.latest.insert(
                sample.section.clone(),
                Tracked {
                    observation,
                    bucket,
                },
            );
        }

        if crossed {
            let ordered = self
                .sections
                .iter()
                .filter_map(|id| self.latest.get(id))
                .map(|t| &t.observation);
            if let Some(winner) = select_focus(ordered) {
                self.active = Some(winner.section.clone());
            }
        }
        self.active.as_ref().map(SectionId::display_name)
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSource {
        subscriptions: Vec<Vec<String>>,
        pending: Vec<RegionSample>,
    }

    impl VisibilitySource for FakeSource {
        fn subscribe(&mut self, anchors: &[&str]) {
            self.subscriptions
                .push(anchors.iter().map(ToString::to_string).collect());
        }

        fn viewport_height(&self) -> f64 {
            800.0
        }

        fn take_batch(&mut self) -> Vec<RegionSample> {
            std::mem::take(&mut self.pending)
        }
    }

    fn id(raw: &str) -> SectionId {
        SectionId::parse(raw).unwrap()
    }

    fn observer(names: &[&str]) -> ViewportObserver<FakeSource> {
        let mut observer = ViewportObserver::new(FakeSource::default(), ObserverOptions::default());
        observer.set_sections(names.iter().copied().map(id));
        observer
    }

    /// A region whose center sits `offset` pixels from the 800px viewport's center.
    fn sample(name: &str, ratio: f64, offset: f64) -> RegionSample {
        RegionSample::new(id(name), ratio, 400.0 + offset - 100.0, 200.0)
    }

    #[test]
    fn highest_ratio_wins() {
        let mut observer = observer(&["a", "b"]);
        let active = observer.observe_batch(&[sample("a", 0.3, 0.0), sample("b", 0.9, 300.0)], 800.0);
        assert_eq!(active.as_deref(), Some("B"));
    }

    #[test]
    fn equal_ratios_prefer_the_region_nearest_center() {
        let mut observer = observer(&["a", "b"]);
        let active =
            observer.observe_batch(&[sample("a", 0.5, 10.0), sample("b", 0.5, -100.0)], 800.0);
        assert_eq!(active.as_deref(), Some("A"));
    }

    #[test]
    fn nothing_visible_keeps_previous_answer() {
        let mut observer = observer(&["a", "b"]);
        observer.observe_batch(&[sample("a", 0.6, 0.0)], 800.0);
        let active =
            observer.observe_batch(&[sample("a", 0.0, 0.0), sample("b", 0.0, 0.0)], 800.0);
        assert_eq!(active.as_deref(), Some("A"));
    }

    #[test]
    fn none_before_anything_was_visible() {
        let mut observer = observer(&["a"]);
        assert_eq!(observer.observe_batch(&[sample("a", 0.0, 0.0)], 800.0), None);
    }

    #[test]
    fn latest_ratio_of_quiet_regions_still_counts() {
        let mut observer = observer(&["a", "b"]);
        observer.observe_batch(&[sample("a", 0.7, 0.0), sample("b", 0.2, 300.0)], 800.0);
        // Only b reports; a is still at 0.7.
        let active = observer.observe_batch(&[sample("b", 0.5, 200.0)], 800.0);
        assert_eq!(active.as_deref(), Some("A"));
        let active = observer.observe_batch(&[sample("b", 0.9, 50.0)], 800.0);
        assert_eq!(active.as_deref(), Some("B"));
    }

    #[test]
    fn movement_within_one_threshold_step_is_ignored() {
        let mut observer = observer(&["a", "b"]);
        observer.observe_batch(&[sample("a", 0.51, 0.0), sample("b", 0.50, 0.0)], 800.0);
        assert_eq!(observer.active(), Some(&id("a")));
        // b overtakes a but stays inside the same 0.05 step, so nothing fires.
        let active = observer.observe_batch(&[sample("b", 0.53, 0.0)], 800.0);
        assert_eq!(active.as_deref(), Some("A"));
    }

    #[test]
    fn fine_grained_thresholds_by_default() {
        let options = ObserverOptions::default();
        assert_eq!(options.thresholds.len(), 21);
        assert!((options.thresholds[1] - 0.05).abs() < 1e-9);
        assert_ne!(options.bucket(0.3), options.bucket(0.4));
    }

    #[test]
    fn unwatched_regions_are_ignored() {
        let mut observer = observer(&["a"]);
        let active = observer.observe_batch(&[sample("z", 1.0, 0.0)], 800.0);
        assert_eq!(active, None);
    }

    #[test]
    fn resubscribes_only_when_the_set_changes() {
        let mut observer = observer(&["a", "b"]);
        observer.set_sections([id("a"), id("b")]);
        observer.set_sections([id("a")]);
        assert_eq!(
            observer.source_mut().subscriptions,
            vec![vec!["a".to_string(), "b".to_string()], vec!["a".to_string()]]
        );
    }

    #[test]
    fn observe_drains_the_source() {
        let mut observer = observer(&["mood", "news"]);
        observer.source_mut().pending = vec![sample("news", 0.8, 0.0)];
        assert_eq!(observer.observe().as_deref(), Some("News"));
        assert!(observer.source_mut().pending.is_empty());
    }
}
