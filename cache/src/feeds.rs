//! Quote and news panels' view of their cached resources.
//!
//! A failed or malformed fetch never reaches the user as an error: the feed
//! substitutes the static sample content and marks it as such.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use syncspace_store::keys;
use syncspace_types::{NewsArticle, Quote};
use tracing::{debug, warn};

use crate::{CacheResult, CachedResource, JsonSource, TimeBoundedCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteView {
    pub quote: Quote,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsView {
    pub articles: Vec<NewsArticle>,
    pub provenance: Provenance,
}

#[derive(Deserialize)]
struct QuoteBody {
    quote: String,
    author: String,
}

#[derive(Deserialize)]
struct NewsBody {
    articles: Vec<Value>,
}

fn sample_quote(index: usize) -> QuoteView {
    let samples = Quote::samples();
    QuoteView {
        quote: samples[index % samples.len()].clone(),
        provenance: Provenance::Sample,
    }
}

fn sample_news() -> NewsView {
    NewsView {
        articles: NewsArticle::samples(),
        provenance: Provenance::Sample,
    }
}

fn decode<T: for<'de> Deserialize<'de>>(data: &Value, what: &str) -> Option<T> {
    match T::deserialize(data) {
        Ok(body) => Some(body),
        Err(e) => {
            warn!("Unexpected {what} response shape: {e}");
            None
        }
    }
}

/// One malformed article is skipped rather than discarding the whole list.
fn article(raw: &Value) -> Option<NewsArticle> {
    NewsArticle::deserialize(raw)
        .inspect_err(|e| debug!("Skipping malformed article: {e}"))
        .ok()
}

/// `None` while loading or before anything has been requested.
/// `fallback_index` picks the sample quote (modulo the sample count).
#[must_use]
pub fn quote_from_result(result: &CacheResult, fallback_index: usize) -> Option<QuoteView> {
    if result.loading {
        return None;
    }
    if let Some(data) = &result.data {
        return Some(match decode::<QuoteBody>(data, "quote") {
            Some(body) => QuoteView {
                quote: Quote::new(body.quote, body.author),
                provenance: Provenance::Live,
            },
            None => sample_quote(fallback_index),
        });
    }
    result.error.as_ref().map(|_| sample_quote(fallback_index))
}

/// Articles without an image are dropped from live results.
#[must_use]
pub fn news_from_result(result: &CacheResult) -> Option<NewsView> {
    if result.loading {
        return None;
    }
    if let Some(data) = &result.data {
        return Some(match decode::<NewsBody>(data, "news") {
            Some(body) => NewsView {
                articles: body
                    .articles
                    .iter()
                    .filter_map(article)
                    .filter(NewsArticle::has_image)
                    .collect(),
                provenance: Provenance::Live,
            },
            None => sample_news(),
        });
    }
    result.error.as_ref().map(|_| sample_news())
}

#[derive(Debug, Clone)]
pub struct QuoteFeed {
    resource: CachedResource,
}

impl QuoteFeed {
    pub fn new(cache: TimeBoundedCache, source: impl JsonSource, max_age: Duration) -> Self {
        Self {
            resource: CachedResource::new(cache, source, keys::CACHED_QUOTE, max_age),
        }
    }

    #[must_use]
    pub fn resource(&self) -> &CachedResource {
        &self.resource
    }

    pub async fn load(&self, fallback_index: usize) -> Option<QuoteView> {
        quote_from_result(&self.resource.load().await, fallback_index)
    }

    pub async fn refresh(&self, fallback_index: usize) -> Option<QuoteView> {
        quote_from_result(&self.resource.refetch().await, fallback_index)
    }

    #[must_use]
    pub fn current(&self, fallback_index: usize) -> Option<QuoteView> {
        quote_from_result(&self.resource.state(), fallback_index)
    }
}

#[derive(Debug, Clone)]
pub struct NewsFeed {
    resource: CachedResource,
}

impl NewsFeed {
    pub fn new(cache: TimeBoundedCache, source: impl JsonSource, max_age: Duration) -> Self {
        Self {
            resource: CachedResource::new(cache, source, keys::CACHED_NEWS, max_age),
        }
    }

    #[must_use]
    pub fn resource(&self) -> &CachedResource {
        &self.resource
    }

    pub async fn load(&self) -> Option<NewsView> {
        news_from_result(&self.resource.load().await)
    }

    pub async fn refresh(&self) -> Option<NewsView> {
        news_from_result(&self.resource.refetch().await)
    }

    #[must_use]
    pub fn current(&self) -> Option<NewsView> {
        news_from_result(&self.resource.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use serde_json::json;

    #[test]
    fn live_quote_is_mapped() {
        let result = CacheResult::ready(json!({"id": 3, "quote": "Q", "author": "A"}));
        let view = quote_from_result(&result, 0).unwrap();
        assert_eq!(view.quote, Quote::new("Q", "A"));
        assert_eq!(view.provenance, Provenance::Live);
    }

    #[test]
    fn quote_error_falls_back_deterministically() {
        let result = CacheResult::failed(FetchError::Status(500));
        let first = quote_from_result(&result, 4).unwrap();
        let again = quote_from_result(&result, 4).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.provenance, Provenance::Sample);
        assert_eq!(first.quote, Quote::samples()[1]);
    }

    #[test]
    fn malformed_quote_falls_back() {
        let result = CacheResult::ready(json!({"text": "wrong field"}));
        assert_eq!(
            quote_from_result(&result, 0).unwrap().provenance,
            Provenance::Sample
        );
    }

    #[test]
    fn nothing_shown_while_loading() {
        assert!(quote_from_result(&CacheResult::loading(), 0).is_none());
        assert!(news_from_result(&CacheResult::loading()).is_none());
    }

    #[test]
    fn news_drops_imageless_articles() {
        let result = CacheResult::ready(json!({
            "totalArticles": 2,
            "articles": [
                {"title": "with", "description": "d", "image": "https://i/x.png",
                 "source": {"name": "S"}, "url": "https://a"},
                {"title": "without", "description": "d", "image": null,
                 "source": {"name": "S"}, "url": "https://b"}
            ]
        }));
        let view = news_from_result(&result).unwrap();
        assert_eq!(view.provenance, Provenance::Live);
        assert_eq!(view.articles.len(), 1);
        assert_eq!(view.articles[0].title, "with");
    }

    #[test]
    fn news_accepts_both_image_keys() {
        let result = CacheResult::ready(json!({
            "articles": [
                {"title": "both", "image": "https://i/live.png",
                 "urlToImage": "https://i/old.png", "url": "https://a"}
            ]
        }));
        let view = news_from_result(&result).unwrap();
        assert_eq!(view.provenance, Provenance::Live);
        assert_eq!(
            view.articles[0].url_to_image.as_deref(),
            Some("https://i/live.png")
        );
    }

    #[test]
    fn malformed_article_is_skipped_not_fatal() {
        let result = CacheResult::ready(json!({
            "articles": [
                {"title": "good", "image": "https://i/x.png", "url": "https://a"},
                {"title": null, "image": "https://i/y.png", "url": "https://b"},
                "not an article"
            ]
        }));
        let view = news_from_result(&result).unwrap();
        assert_eq!(view.provenance, Provenance::Live);
        let titles: Vec<_> = view.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["good"]);
    }

    #[test]
    fn news_error_uses_static_samples_in_order() {
        let result = CacheResult::failed(FetchError::Transport("down".into()));
        let view = news_from_result(&result).unwrap();
        assert_eq!(view.provenance, Provenance::Sample);
        assert_eq!(view.articles, NewsArticle::samples());
    }
}
