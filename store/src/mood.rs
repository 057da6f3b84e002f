//! Daily mood log and the weekly tally shown by the mood panel.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use syncspace_types::{MOODS, Mood, MoodEntry};
use tracing::debug;

use crate::{PersistentStore, keys};

type MoodHistory = BTreeMap<String, Vec<MoodEntry>>;

/// Calendar date key, e.g. `"Sat Oct 17 2026"`.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Per-mood counts over the last seven days, in [`MOODS`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodStats {
    counts: Vec<(&'static str, u32)>,
}

impl MoodStats {
    #[must_use]
    pub fn count(&self, label: &str) -> u32 {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0, |(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.counts.iter().copied()
    }

    /// Largest count, never below 1 so bar widths can divide by it.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct MoodLog {
    store: PersistentStore,
}

impl MoodLog {
    #[must_use]
    pub fn new(store: PersistentStore) -> Self {
        Self { store }
    }

    /// Append `mood` under `today`'s date.
    pub fn log(&self, mood: Mood, today: NaiveDate, timestamp_ms: i64) -> MoodEntry {
        let entry = MoodEntry::new(mood, timestamp_ms);
        let mut history: MoodHistory = self.store.read_or_default(keys::MOODS);
        history
            .entry(date_key(today))
            .or_default()
            .push(entry.clone());
        self.store.write(keys::MOODS, &history);
        debug!(label = mood.label, "Logged mood");
        entry
    }

    #[must_use]
    pub fn entries_on(&self, date: NaiveDate) -> Vec<MoodEntry> {
        let mut history: MoodHistory = self.store.read_or_default(keys::MOODS);
        history.remove(&date_key(date)).unwrap_or_default()
    }

    /// Count each known mood over the seven days ending on `today`, inclusive.
    /// Labels not in [`MOODS`] are ignored.
    #[must_use]
    pub fn weekly_stats(&self, today: NaiveDate) -> MoodStats {
        let history: MoodHistory = self.store.read_or_default(keys::MOODS);
        let mut counts: Vec<(&'static str, u32)> = MOODS.iter().map(|m| (m.label, 0)).collect();

        for offset in 0..7 {
            let Some(day) = today.checked_sub_days(Days::new(offset)) else {
                break;
            };
            let Some(entries) = history.get(&date_key(day)) else {
                continue;
            };
            for entry in entries {
                if let Some(slot) = counts.iter_mut().find(|(l, _)| *l == entry.label) {
                    slot.1 += 1;
                }
            }
        }

        MoodStats { counts }
    }
}
