//! Records persisted by the favorites, journal, and mood panels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NewsArticle, Quote};

/// A selectable mood. The set is fixed; see [`MOODS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mood {
    pub emoji: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

pub const MOODS: [Mood; 5] = [
    Mood {
        emoji: "😊",
        label: "Happy",
        color: "from-yellow-400 to-orange-500",
    },
    Mood {
        emoji: "😔",
        label: "Sad",
        color: "from-blue-400 to-blue-600",
    },
    Mood {
        emoji: "😰",
        label: "Stressed",
        color: "from-red-400 to-red-600",
    },
    Mood {
        emoji: "😌",
        label: "Calm",
        color: "from-green-400 to-green-600",
    },
    Mood {
        emoji: "🤩",
        label: "Excited",
        color: "from-purple-400 to-pink-500",
    },
];

impl Mood {
    /// Case-insensitive lookup by label.
    #[must_use]
    pub fn by_label(label: &str) -> Option<Mood> {
        MOODS
            .iter()
            .copied()
            .find(|m| m.label.eq_ignore_ascii_case(label.trim()))
    }
}

/// One mood logged on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub emoji: String,
    pub label: String,
    pub color: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl MoodEntry {
    #[must_use]
    pub fn new(mood: Mood, timestamp_ms: i64) -> Self {
        Self {
            emoji: mood.emoji.to_string(),
            label: mood.label.to_string(),
            color: mood.color.to_string(),
            timestamp: timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "quote", rename_all = "camelCase")]
pub struct FavoriteQuote {
    pub text: String,
    pub author: String,
    pub saved_at: DateTime<Utc>,
}

impl FavoriteQuote {
    #[must_use]
    pub fn new(quote: &Quote, saved_at: DateTime<Utc>) -> Self {
        Self {
            text: quote.text.clone(),
            author: quote.author.clone(),
            saved_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "news", rename_all = "camelCase")]
pub struct FavoriteArticle {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub saved_at: DateTime<Utc>,
}

/// A mood check-in with an optional written note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub emoji: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JournalEntry {
    pub const EMPTY_NOTE: &'static str = "No journal entry written.";

    #[must_use]
    pub fn new(mood: Mood, note: &str, timestamp: DateTime<Utc>) -> Self {
        let note = note.trim();
        Self {
            emoji: mood.emoji.to_string(),
            label: mood.label.to_string(),
            journal: (!note.is_empty()).then(|| note.to_string()),
            timestamp,
        }
    }

    #[must_use]
    pub fn note(&self) -> &str {
        self.journal.as_deref().unwrap_or(Self::EMPTY_NOTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn mood_lookup_is_case_insensitive() {
        assert_eq!(Mood::by_label(" calm ").map(|m| m.emoji), Some("😌"));
        assert!(Mood::by_label("bored").is_none());
    }

    #[test]
    fn favorite_quote_wire_shape() {
        let fav = FavoriteQuote::new(&Quote::new("Q", "A"), at(0));
        let json = serde_json::to_value(&fav).unwrap();
        assert_eq!(json["type"], "quote");
        assert_eq!(json["savedAt"], "1970-01-01T00:00:00Z");
        assert_eq!(json["text"], "Q");
    }

    #[test]
    fn favorite_article_flattens_article() {
        let fav = FavoriteArticle {
            article: NewsArticle::samples().remove(0),
            saved_at: at(60),
        };
        let json = serde_json::to_value(&fav).unwrap();
        assert_eq!(json["type"], "news");
        assert_eq!(json["title"], "Revolutionary AI Breakthrough in 2024");
        assert_eq!(json["source"]["name"], "Tech Today");
        let back: FavoriteArticle = serde_json::from_value(json).unwrap();
        assert_eq!(back, fav);
    }

    #[test]
    fn blank_journal_note_is_absent() {
        let mood = Mood::by_label("Happy").unwrap();
        let entry = JournalEntry::new(mood, "   ", at(5));
        assert!(entry.journal.is_none());
        assert_eq!(entry.note(), JournalEntry::EMPTY_NOTE);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("journal").is_none());
    }
}
