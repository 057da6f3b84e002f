//! Well-known storage keys.

pub const THEME: &str = "syncspace_theme";
pub const MOODS: &str = "syncspace_moods";
pub const FAVORITE_QUOTES: &str = "favorite_quotes";
pub const FAVORITE_NEWS: &str = "favorite_news";
pub const JOURNAL_ENTRIES: &str = "journal_entries";
pub const CACHED_QUOTE: &str = "cached_quote";
pub const CACHED_NEWS: &str = "cached_news";
