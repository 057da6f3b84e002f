//! Remote content shapes and their static fallbacks.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    #[must_use]
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewsSource {
    pub name: String,
}

/// A news article normalized for display.
///
/// Endpoints disagree on the image field (`image` vs `urlToImage`) and saved
/// favorites may carry both. `image` wins when present; the result is always
/// written back as `urlToImage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireArticle")]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url_to_image: Option<String>,
    pub source: NewsSource,
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArticle {
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    source: NewsSource,
    #[serde(default, deserialize_with = "null_as_default")]
    url: String,
}

impl From<WireArticle> for NewsArticle {
    fn from(wire: WireArticle) -> Self {
        Self {
            title: wire.title,
            description: wire.description,
            url_to_image: wire.image.or(wire.url_to_image),
            source: wire.source,
            url: wire.url,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Shown when the quote endpoint is unreachable. Order is stable.
pub const SAMPLE_QUOTES: [(&str, &str); 3] = [
    (
        "The only way to do great work is to love what you do.",
        "Steve Jobs",
    ),
    (
        "Innovation distinguishes between a leader and a follower.",
        "Steve Jobs",
    ),
    (
        "The future belongs to those who believe in the beauty of their dreams.",
        "Eleanor Roosevelt",
    ),
];

/// Shown when the news endpoint is unreachable. Order is stable.
///
/// Fields: title, description, image, source, url.
pub const SAMPLE_NEWS: [(&str, &str, &str, &str, &str); 2] = [
    (
        "Revolutionary AI Breakthrough in 2024",
        "Scientists achieve unprecedented advances in artificial intelligence.",
        "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=400&h=200&fit=crop",
        "Tech Today",
        "#",
    ),
    (
        "Quantum Computing Milestone Reached",
        "Major tech companies announce significant progress in quantum computing.",
        "https://images.unsplash.com/photo-1635070041078-e363dbe005cb?w=400&h=200&fit=crop",
        "Quantum Weekly",
        "#",
    ),
];

impl Quote {
    /// All sample quotes, in their fixed order.
    #[must_use]
    pub fn samples() -> Vec<Quote> {
        SAMPLE_QUOTES
            .iter()
            .map(|(text, author)| Quote::new(*text, *author))
            .collect()
    }
}

impl NewsArticle {
    /// All sample articles, in their fixed order.
    #[must_use]
    pub fn samples() -> Vec<NewsArticle> {
        SAMPLE_NEWS
            .iter()
            .map(|(title, description, image, source, url)| NewsArticle {
                title: (*title).to_string(),
                description: (*description).to_string(),
                url_to_image: Some((*image).to_string()),
                source: NewsSource {
                    name: (*source).to_string(),
                },
                url: (*url).to_string(),
            })
            .collect()
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.url_to_image
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_accepts_image_alias() {
        let article: NewsArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "description": "D",
            "image": "https://img.example/a.png",
            "source": { "name": "S" },
            "url": "https://example.com/a"
        }))
        .unwrap();
        assert_eq!(
            article.url_to_image.as_deref(),
            Some("https://img.example/a.png")
        );
        assert!(article.has_image());
    }

    #[test]
    fn article_without_image() {
        let article: NewsArticle =
            serde_json::from_value(serde_json::json!({ "title": "T" })).unwrap();
        assert!(!article.has_image());
        assert_eq!(article.source, NewsSource::default());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let article: NewsArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "description": null,
            "urlToImage": null,
            "url": null
        }))
        .unwrap();
        assert!(article.description.is_empty());
        assert!(article.url.is_empty());
        assert!(!article.has_image());
    }

    #[test]
    fn image_takes_precedence_over_url_to_image() {
        let article: NewsArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "image": "https://img.example/live.png",
            "urlToImage": "https://img.example/saved.png"
        }))
        .unwrap();
        assert_eq!(
            article.url_to_image.as_deref(),
            Some("https://img.example/live.png")
        );

        let saved = serde_json::to_value(&article).unwrap();
        assert!(saved.get("image").is_none());
        assert_eq!(saved["urlToImage"], "https://img.example/live.png");
    }

    #[test]
    fn null_image_falls_back_to_url_to_image() {
        let article: NewsArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "image": null,
            "urlToImage": "https://img.example/a.png"
        }))
        .unwrap();
        assert!(article.has_image());
    }

    #[test]
    fn samples_are_order_stable() {
        assert_eq!(Quote::samples(), Quote::samples());
        assert_eq!(Quote::samples()[2].author, "Eleanor Roosevelt");
        let news = NewsArticle::samples();
        assert_eq!(news[0].source.name, "Tech Today");
        assert!(news.iter().all(NewsArticle::has_image));
    }
}
