//! Integration tests for cached HTTP resources.
//!
//! These exercise the full path: HTTP GET → JSON decode → write-through to a
//! file-backed store → served from disk within the staleness window.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use syncspace_cache::{
    FetchError, HttpJsonSource, ManualClock, NewsFeed, Provenance, QuoteFeed, TimeBoundedCache,
};
use syncspace_store::{FileBackend, PersistentStore, keys};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer, route: &str) -> HttpJsonSource {
    let url = Url::parse(&format!("{}{route}", server.uri())).unwrap();
    HttpJsonSource::new(url, Duration::from_secs(5)).unwrap()
}

fn file_cache(dir: &TempDir, clock: Arc<ManualClock>) -> TimeBoundedCache {
    let backend = FileBackend::open(dir.path()).unwrap();
    TimeBoundedCache::new(PersistentStore::new(Arc::new(backend)), clock)
}

#[tokio::test]
async fn decodes_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quotes/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "quote": "Breathe.", "author": "Someone"
        })))
        .mount(&server)
        .await;

    let value = source(&server, "/quotes/random").get_json().await.unwrap();
    assert_eq!(value["quote"], "Breathe.");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = source(&server, "/quotes/random").get_json().await.unwrap_err();
    assert_eq!(err, FetchError::Status(503));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = source(&server, "/quotes/random").get_json().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn transport_error_does_not_echo_query_secrets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "articles": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/top?lang=en&apikey=SUPERSECRET", server.uri())).unwrap();
    let source = HttpJsonSource::new(url, Duration::from_millis(100)).unwrap();
    let err = source.get_json().await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    assert!(!err.to_string().contains("SUPERSECRET"), "{err}");
}

#[tokio::test]
async fn refused_connection_does_not_echo_query_secrets() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = Url::parse(&format!("http://127.0.0.1:{port}/top?apikey=SUPERSECRET")).unwrap();
    let source = HttpJsonSource::new(url, Duration::from_secs(5)).unwrap();
    let err = source.get_json().await.unwrap_err();

    assert!(!err.to_string().contains("SUPERSECRET"), "{err}");
}

#[tokio::test]
async fn second_load_within_window_stays_off_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quotes/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quote": "Stay present.", "author": "Anon"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000_000));
    let feed = QuoteFeed::new(
        file_cache(&dir, Arc::clone(&clock)),
        source(&server, "/quotes/random"),
        Duration::from_secs(120),
    );

    let first = feed.load(0).await.unwrap();
    assert_eq!(first.provenance, Provenance::Live);

    // A fresh process reading the same directory sees the persisted entry.
    clock.advance(Duration::from_secs(60));
    let reopened = file_cache(&dir, Arc::clone(&clock));
    let entry = reopened.read_entry(keys::CACHED_QUOTE).unwrap();
    assert_eq!(entry.fetched_at, 1_000_000);

    let second = feed.load(0).await.unwrap();
    assert_eq!(second.quote, first.quote);
    server.verify().await;
}

#[tokio::test]
async fn expired_entry_is_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quote": "Again.", "author": "Anon"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(0));
    let feed = QuoteFeed::new(
        file_cache(&dir, Arc::clone(&clock)),
        source(&server, "/quotes/random"),
        Duration::from_secs(120),
    );

    feed.load(0).await;
    clock.advance(Duration::from_secs(120));
    feed.load(0).await;
    server.verify().await;
}

#[tokio::test]
async fn news_outage_falls_back_without_touching_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(0));
    let cache = file_cache(&dir, clock);
    let feed = NewsFeed::new(
        cache.clone(),
        source(&server, "/api/v4/top-headlines"),
        Duration::from_secs(30 * 60),
    );

    let view = feed.load().await.unwrap();
    assert_eq!(view.provenance, Provenance::Sample);
    assert!(feed.resource().state().error.is_some());
    assert!(cache.read_entry(keys::CACHED_NEWS).is_none());
}
