//! Saved quotes and news articles.

use chrono::{DateTime, Utc};
use syncspace_types::{FavoriteArticle, FavoriteQuote, NewsArticle, Quote};
use tracing::debug;

use crate::{PersistentStore, RecordList, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesTab {
    #[default]
    All,
    Quotes,
    News,
}

impl FavoritesTab {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "quotes" | "quote" => Some(Self::Quotes),
            "news" => Some(Self::News),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteItem {
    Quote(FavoriteQuote),
    Article(FavoriteArticle),
}

impl FavoriteItem {
    #[must_use]
    pub fn saved_at(&self) -> DateTime<Utc> {
        match self {
            Self::Quote(q) => q.saved_at,
            Self::Article(a) => a.saved_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleToggle {
    Saved,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FavoriteCounts {
    pub all: usize,
    pub quotes: usize,
    pub news: usize,
}

#[derive(Debug, Clone)]
pub struct Favorites {
    quotes: RecordList<FavoriteQuote>,
    news: RecordList<FavoriteArticle>,
}

impl Favorites {
    #[must_use]
    pub fn new(store: PersistentStore) -> Self {
        Self {
            quotes: RecordList::new(store.clone(), keys::FAVORITE_QUOTES),
            news: RecordList::new(store, keys::FAVORITE_NEWS),
        }
    }

    /// Save a quote. Quotes are identified by text; saving one twice is a no-op.
    /// Returns whether the quote was newly saved.
    pub fn save_quote(&self, quote: &Quote, now: DateTime<Utc>) -> bool {
        self.quotes.update(|saved| {
            if saved.iter().any(|q| q.text == quote.text) {
                return false;
            }
            saved.push(FavoriteQuote::new(quote, now));
            debug!(author = %quote.author, "Saved favorite quote");
            true
        })
    }

    #[must_use]
    pub fn is_quote_saved(&self, text: &str) -> bool {
        self.quotes.load().iter().any(|q| q.text == text)
    }

    /// Save the article, or remove it if an article with the same title is saved.
    pub fn toggle_article(&self, article: &NewsArticle, now: DateTime<Utc>) -> ArticleToggle {
        self.news.update(|saved| {
            let before = saved.len();
            saved.retain(|a| a.article.title != article.title);
            if saved.len() == before {
                saved.push(FavoriteArticle {
                    article: article.clone(),
                    saved_at: now,
                });
                ArticleToggle::Saved
            } else {
                ArticleToggle::Removed
            }
        })
    }

    #[must_use]
    pub fn is_article_saved(&self, title: &str) -> bool {
        self.news.load().iter().any(|a| a.article.title == title)
    }

    pub fn remove_quote(&self, text: &str) -> bool {
        self.quotes.update(|saved| {
            let before = saved.len();
            saved.retain(|q| q.text != text);
            saved.len() != before
        })
    }

    pub fn remove_article(&self, title: &str) -> bool {
        self.news.update(|saved| {
            let before = saved.len();
            saved.retain(|a| a.article.title != title);
            saved.len() != before
        })
    }

    /// Items for a tab, newest `savedAt` first.
    #[must_use]
    pub fn list(&self, tab: FavoritesTab) -> Vec<FavoriteItem> {
        let quotes = || {
            self.quotes
                .newest_first(|q| q.saved_at)
                .into_iter()
                .map(FavoriteItem::Quote)
        };
        let news = || {
            self.news
                .newest_first(|a| a.saved_at)
                .into_iter()
                .map(FavoriteItem::Article)
        };

        match tab {
            FavoritesTab::Quotes => quotes().collect(),
            FavoritesTab::News => news().collect(),
            FavoritesTab::All => {
                let mut all: Vec<_> = quotes().chain(news()).collect();
                all.sort_by_key(|item| std::cmp::Reverse(item.saved_at()));
                all
            }
        }
    }

    #[must_use]
    pub fn counts(&self) -> FavoriteCounts {
        let quotes = self.quotes.load().len();
        let news = self.news.load().len();
        FavoriteCounts {
            all: quotes + news,
            quotes,
            news,
        }
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

    fn favorites() -> Favorites {
        Favorites::new(PersistentStore::new(Arc::new(MemoryBackend::new())))
    }

    #[test]
    fn saving_same_quote_twice_is_noop() {
        let favs = favorites();
        let quote = Quote::new("Be here now.", "Ram Dass");
        assert!(favs.save_quote(&quote, at(1)));
        assert!(!favs.save_quote(&quote, at(2)));
        assert_eq!(favs.counts().quotes, 1);
        assert!(favs.is_quote_saved("Be here now."));
    }

    #[test]
    fn article_toggle_saves_then_removes() {
        let favs = favorites();
        let article = NewsArticle::samples().remove(0);
        assert_eq!(favs.toggle_article(&article, at(1)), ArticleToggle::Saved);
        assert!(favs.is_article_saved(&article.title));
        assert_eq!(favs.toggle_article(&article, at(2)), ArticleToggle::Removed);
        assert!(!favs.is_article_saved(&article.title));
    }

    #[test]
    fn all_tab_merges_newest_first() {
        let favs = favorites();
        let mut news = NewsArticle::samples();
        favs.save_quote(&Quote::new("old", "a"), at(10));
        favs.toggle_article(&news.remove(0), at(30));
        favs.save_quote(&Quote::new("new", "b"), at(40));
        favs.toggle_article(&news.remove(0), at(20));

        let stamps: Vec<_> = favs
            .list(FavoritesTab::All)
            .iter()
            .map(|i| i.saved_at().timestamp())
            .collect();
        assert_eq!(stamps, vec![40, 30, 20, 10]);

        let quotes = favs.list(FavoritesTab::Quotes);
        assert!(matches!(&quotes[0], FavoriteItem::Quote(q) if q.text == "new"));
        assert_eq!(favs.list(FavoritesTab::News).len(), 2);
        assert_eq!(
            favs.counts(),
            FavoriteCounts {
                all: 4,
                quotes: 2,
                news: 2
            }
        );
    }

    #[test]
    fn saved_article_with_both_image_keys_survives_toggle() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_raw(
            keys::FAVORITE_NEWS,
            r##"[{"title":"Kept","description":"d","image":"https://i/a.png",
                "urlToImage":"https://i/a.png","source":{"name":"S"},"url":"#",
                "type":"news","savedAt":"2026-01-01T00:00:00Z"}]"##,
        );
        let favs = Favorites::new(PersistentStore::new(backend));
        assert!(favs.is_article_saved("Kept"));

        let other = NewsArticle::samples().remove(1);
        assert_eq!(favs.toggle_article(&other, at(5)), ArticleToggle::Saved);
        assert_eq!(favs.counts().news, 2);
    }

    #[test]
    fn remove_by_identity() {
        let favs = favorites();
        favs.save_quote(&Quote::new("x", "a"), at(1));
        assert!(favs.remove_quote("x"));
        assert!(!favs.remove_quote("x"));
        assert!(!favs.remove_article("missing"));
    }

    #[test]
    fn tab_parse() {
        assert_eq!(FavoritesTab::parse("News"), Some(FavoritesTab::News));
        assert_eq!(FavoritesTab::parse("bogus"), None);
    }
}
