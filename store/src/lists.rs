use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::PersistentStore;

/// An ordered list of records stored as one JSON array under a single key.
///
/// Every mutation is a read-modify-write of the whole array; there is no
/// coordination with other writers of the same key (last write wins).
#[derive(Debug, Clone)]
pub struct RecordList<T> {
    store: PersistentStore,
    key: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> RecordList<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(store: PersistentStore, key: &'static str) -> Self {
        Self {
            store,
            key,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Records in insertion order. A corrupt array reads as empty; a corrupt
    /// record inside a valid array is skipped.
    #[must_use]
    pub fn load(&self) -> Vec<T> {
        let raw: Vec<Value> = self.store.read_or_default(self.key);
        raw.into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key = self.key, "Skipping unreadable record: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn save(&self, records: &[T]) {
        self.store.write(self.key, records);
    }

    /// Load, mutate, and write back. Returns whatever `f` returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut records = self.load();
        let out = f(&mut records);
        self.save(&records);
        out
    }

    /// Records sorted newest first by `stamp`. Ties keep insertion order.
    pub fn newest_first<K: Ord>(&self, stamp: impl Fn(&T) -> K) -> Vec<T> {
        let mut records = self.load();
        records.sort_by(|a, b| stamp(b).cmp(&stamp(a)));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use std::sync::Arc;

    fn list() -> RecordList<(String, u32)> {
        let store = PersistentStore::new(Arc::new(MemoryBackend::new()));
        RecordList::new(store, "pairs")
    }

    #[test]
    fn update_persists_changes() {
        let list = list();
        let len = list.update(|records| {
            records.push(("a".into(), 1));
            records.push(("b".into(), 3));
            records.len()
        });
        assert_eq!(len, 2);
        assert_eq!(list.load().len(), 2);
    }

    #[test]
    fn bad_record_does_not_wipe_the_list() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_raw("pairs", r#"[["a",1],{"broken":true},["b",2]]"#);
        let list: RecordList<(String, u32)> =
            RecordList::new(PersistentStore::new(backend.clone()), "pairs");

        assert_eq!(list.load(), vec![("a".into(), 1), ("b".into(), 2)]);
        list.update(|records| records.push(("c".into(), 3)));
        assert_eq!(list.load().len(), 3);
        assert!(!backend.raw("pairs").unwrap().contains("broken"));
    }

    #[test]
    fn newest_first_sorts_descending() {
        let list = list();
        list.save(&[("a".into(), 1), ("b".into(), 3), ("c".into(), 2)]);
        let names: Vec<_> = list
            .newest_first(|r| r.1)
            .into_iter()
            .map(|r| r.0)
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
