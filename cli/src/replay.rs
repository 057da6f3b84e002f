//! `syncspace nav`: drive the synchronizer through a scripted session on a
//! virtual clock and print the active section after every step.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use syncspace_nav::{
    AnchorScroller, NavigationSynchronizer, ObserverOptions, RegionSample, ViewportObserver,
    VisibilitySource,
};
use syncspace_types::{NavigationState, SectionId};
use tracing::warn;

use crate::commands::{NavStep, Sighting};

const VIEWPORT_HEIGHT: f64 = 800.0;
const REGION_HEIGHT: f64 = 400.0;

/// Every section's anchor is present on the single scrolling page.
struct PageScroller {
    anchors: Vec<String>,
}

impl AnchorScroller for PageScroller {
    fn scroll_into_view(&mut self, anchor: &str) -> bool {
        self.anchors.iter().any(|a| a == anchor)
    }
}

/// Visibility reports fed from `seen:` steps.
#[derive(Default)]
struct ScriptedViewport {
    watched: Vec<String>,
    pending: Vec<RegionSample>,
}

impl VisibilitySource for ScriptedViewport {
    fn subscribe(&mut self, anchors: &[&str]) {
        self.watched = anchors.iter().map(ToString::to_string).collect();
    }

    fn viewport_height(&self) -> f64 {
        VIEWPORT_HEIGHT
    }

    fn take_batch(&mut self) -> Vec<RegionSample> {
        std::mem::take(&mut self.pending)
    }
}

impl ScriptedViewport {
    fn push(&mut self, sighting: &Sighting) {
        let section = match SectionId::parse(&sighting.section) {
            Ok(id) if self.watched.iter().any(|a| a == id.anchor()) => id,
            Ok(id) => {
                warn!(section = %id, "No such region on the page");
                return;
            }
            Err(e) => {
                warn!("Ignoring sighting: {e}");
                return;
            }
        };
        let top = VIEWPORT_HEIGHT / 2.0 + sighting.offset - REGION_HEIGHT / 2.0;
        self.pending.push(RegionSample::new(
            section,
            sighting.ratio,
            top,
            REGION_HEIGHT,
        ));
    }
}

fn millis(d: Duration) -> u128 {
    d.as_millis()
}

fn describe(state: &NavigationState, start: Instant) -> String {
    let mut line = format!("active={}", state.active_section.display_name());
    if let Some(until) = state.suppression_expires_at {
        line.push_str(&format!(
            " suppressed-until=+{}ms",
            millis(until.saturating_duration_since(start))
        ));
    }
    line
}

pub(crate) fn run(
    sync: &mut NavigationSynchronizer,
    steps: &[NavStep],
    out: &mut impl Write,
) -> io::Result<()> {
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;

    let mut scroller = PageScroller {
        anchors: sync.catalog().ids().map(|id| id.anchor().to_string()).collect(),
    };
    let mut observer = ViewportObserver::new(ScriptedViewport::default(), ObserverOptions::default());
    observer.set_sections(sync.catalog().ids().cloned());

    writeln!(out, "+0ms start {}", describe(&sync.state(), start))?;
    for step in steps {
        let now = start + elapsed;
        let label = match step {
            NavStep::Navigate(section) => match sync.user_navigates(section, now, &mut scroller) {
                Ok(_) => format!("navigate {section}"),
                Err(e) => format!("navigate {section} rejected: {e}"),
            },
            NavStep::Seen(sightings) => {
                for sighting in sightings {
                    observer.source_mut().push(sighting);
                }
                match observer.observe() {
                    Some(focused) => {
                        let accepted = sync.viewport_reports(&focused, now);
                        let verdict = if accepted { "accepted" } else { "ignored" };
                        format!("seen {focused} {verdict}")
                    }
                    None => "seen nothing".to_string(),
                }
            }
            NavStep::Scroll => {
                sync.scroll_observed(now);
                "scroll".to_string()
            }
            NavStep::Wait(duration) => {
                elapsed += *duration;
                sync.poll(start + elapsed);
                format!("wait {}ms", millis(*duration))
            }
        };
        writeln!(
            out,
            "+{}ms {label} {}",
            millis(elapsed),
            describe(&sync.state(), start)
        )?;
    }
    Ok(())
}
