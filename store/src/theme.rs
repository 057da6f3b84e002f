use crate::{PersistentStore, keys};

/// Persisted dark-mode preference. Falls back to the system preference until
/// the user has chosen.
#[derive(Debug, Clone)]
pub struct ThemePreference {
    store: PersistentStore,
}

impl ThemePreference {
    #[must_use]
    pub fn new(store: PersistentStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn dark_mode(&self, system_prefers_dark: bool) -> bool {
        self.store.read(keys::THEME, || system_prefers_dark)
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.store.write(keys::THEME, &dark);
    }

    /// Flip the effective preference and persist it. Returns the new value.
    pub fn toggle(&self, system_prefers_dark: bool) -> bool {
        let dark = !self.dark_mode(system_prefers_dark);
        self.set_dark_mode(dark);
        dark
    }
}
