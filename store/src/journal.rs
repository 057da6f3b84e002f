use chrono::{DateTime, Utc};
use syncspace_types::{JournalEntry, Mood};

use crate::{PersistentStore, RecordList, keys};

/// Mood check-ins with written notes.
#[derive(Debug, Clone)]
pub struct Journal {
    entries: RecordList<JournalEntry>,
}

impl Journal {
    #[must_use]
    pub fn new(store: PersistentStore) -> Self {
        Self {
            entries: RecordList::new(store, keys::JOURNAL_ENTRIES),
        }
    }

    pub fn add(&self, mood: Mood, note: &str, now: DateTime<Utc>) -> JournalEntry {
        let entry = JournalEntry::new(mood, note, now);
        self.entries.update(|entries| entries.push(entry.clone()));
        entry
    }

    /// Remove the entry written at `timestamp`. Timestamps identify entries.
    pub fn remove(&self, timestamp: DateTime<Utc>) -> bool {
        self.entries.update(|entries| {
            let before = entries.len();
            entries.retain(|e| e.timestamp != timestamp);
            entries.len() != before
        })
    }

    /// Newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.newest_first(|e| e.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn entries_newest_first_and_removable() {
        let journal = Journal::new(PersistentStore::new(Arc::new(MemoryBackend::new())));
        let calm = Mood::by_label("Calm").unwrap();
        journal.add(calm, "slow morning", at(100));
        journal.add(calm, "", at(300));
        journal.add(calm, "walk", at(200));

        let notes: Vec<_> = journal
            .entries()
            .iter()
            .map(|e| e.note().to_string())
            .collect();
        assert_eq!(
            notes,
            vec![JournalEntry::EMPTY_NOTE, "walk", "slow morning"]
        );

        assert!(journal.remove(at(200)));
        assert!(!journal.remove(at(200)));
        assert_eq!(journal.entries().len(), 2);
    }
}
