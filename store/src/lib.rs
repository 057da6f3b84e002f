//! Persistence for SyncSpace.
//!
//! The store is a flat, process-wide key space of JSON documents. Keys are
//! namespaced by convention only (see [`keys`]); the store itself enforces nothing.
//!
//! - **`backend`**: the [`StorageBackend`] port plus in-memory and file-backed implementations
//! - **`persistent`**: [`PersistentStore`], typed JSON read/write that never fails the caller
//! - **`favorites`**, **`journal`**, **`mood`**, **`theme`**: the record stores behind each panel

mod backend;
mod favorites;
mod journal;
pub mod keys;
mod lists;
mod mood;
mod persistent;
mod theme;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use favorites::{ArticleToggle, FavoriteCounts, FavoriteItem, Favorites, FavoritesTab};
pub use journal::Journal;
pub use lists::RecordList;
pub use mood::{MoodLog, MoodStats, date_key};
pub use persistent::PersistentStore;
pub use theme::ThemePreference;
