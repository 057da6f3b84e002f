//! Core domain types for SyncSpace.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod content;
mod navigation;
mod records;
mod section;

pub use content::{NewsArticle, NewsSource, Quote, SAMPLE_NEWS, SAMPLE_QUOTES};
pub use navigation::{FocusObservation, NavigationPhase, NavigationState};
pub use records::{FavoriteArticle, FavoriteQuote, JournalEntry, MOODS, Mood, MoodEntry};
pub use section::{Section, SectionCatalog, SectionError, SectionId};
