//! Tests for the local track cache
//!
//! These run `LocalCacheStore` against the Tokio filesystem bridge on a
//! temporary directory, with mocked HTTP.

mod common;

use bridge_desktop::TokioFileSystem;
use bridge_traits::{BridgeError, HttpClient};
use common::{body, cache_store, FakeHttpClient, MockHttp};
use core_playback::{
    CacheConfig, CacheEvent, CacheKeyStrategy, EngineEvent, LocalCacheStore, PlaybackError,
};
use core_runtime::events::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const URL: &str = "https://host/music/a.mp3";

fn store_with(dir: &TempDir, config: CacheConfig, http: Arc<dyn HttpClient>) -> LocalCacheStore {
    LocalCacheStore::new(
        config.with_cache_directory(dir.path().join("tracks")),
        http,
        Arc::new(TokioFileSystem::new()),
    )
    .unwrap()
}

fn files_in(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_second_resolve_is_a_cache_hit() {
    let dir = TempDir::new().unwrap();
    let mut http = MockHttp::new();
    http.expect_download_stream()
        .times(1)
        .returning(|_| Ok(body(b"audio bytes")));
    let store = cache_store(&dir, Arc::new(http));

    let first = store.resolve(URL).await.unwrap();
    let second = store.resolve(URL).await.unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.path, second.path);
    assert_eq!(std::fs::read(&first.path).unwrap(), b"audio bytes");

    let stats = store.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.downloads, 1);
    assert_eq!(stats.bytes_downloaded, 11);
}

#[tokio::test]
async fn test_download_leaves_no_partial_files() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    http.route(URL, b"audio bytes");
    let store = cache_store(&dir, http);

    let resolved = store.resolve(URL).await.unwrap();

    let names = files_in(resolved.path.parent().unwrap());
    assert_eq!(names.len(), 1);
    assert!(!names[0].ends_with(".part"));
}

#[tokio::test]
async fn test_http_error_is_fetch_failure() {
    let dir = TempDir::new().unwrap();
    let mut http = MockHttp::new();
    http.expect_download_stream().returning(|request| {
        Err(BridgeError::HttpStatus {
            status: 500,
            url: request.url,
        })
    });
    let store = cache_store(&dir, Arc::new(http));

    let err = store.resolve(URL).await.unwrap_err();

    assert!(matches!(err, PlaybackError::CacheFetchFailed { .. }));
    assert!(err.is_network_error());
    assert!(!store.is_cached(URL).await.unwrap());
    assert!(files_in(&dir.path().join("tracks")).is_empty());
    assert_eq!(store.stats().failures, 1);
}

#[tokio::test]
async fn test_failed_download_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    let store = cache_store(&dir, http.clone());

    assert!(store.resolve(URL).await.is_err());

    http.route(URL, b"now available");
    let resolved = store.resolve(URL).await.unwrap();

    assert!(!resolved.cache_hit);
    assert_eq!(http.fetches(), 2);
}

#[tokio::test]
async fn test_timeout_discards_partial_download() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    http.route_delayed(URL, b"late", Duration::from_millis(500));
    let store = store_with(
        &dir,
        CacheConfig::new().with_download_timeout(Duration::from_millis(20)),
        http,
    );

    let err = store.resolve(URL).await.unwrap_err();

    assert!(err.to_string().contains("timed out"));
    assert!(files_in(&dir.path().join("tracks")).is_empty());
}

#[tokio::test]
async fn test_digest_keys_keep_same_named_urls_apart() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    http.route("https://one.example/a.mp3", b"first");
    http.route("https://two.example/a.mp3", b"second");
    let store = cache_store(&dir, http.clone());

    let one = store.resolve("https://one.example/a.mp3").await.unwrap();
    let two = store.resolve("https://two.example/a.mp3").await.unwrap();

    assert_ne!(one.path, two.path);
    assert_eq!(std::fs::read(&two.path).unwrap(), b"second");
    assert_eq!(http.fetches(), 2);
}

#[tokio::test]
async fn test_last_segment_keys_share_entries() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    http.route("https://one.example/a.mp3", b"first");
    http.route("https://two.example/a.mp3", b"second");
    let store = store_with(
        &dir,
        CacheConfig::new().with_key_strategy(CacheKeyStrategy::LastPathSegment),
        http.clone(),
    );

    let one = store.resolve("https://one.example/a.mp3").await.unwrap();
    let two = store.resolve("https://two.example/a.mp3").await.unwrap();

    assert_eq!(one.path, two.path);
    assert!(one.path.ends_with("a.mp3"));
    assert!(two.cache_hit);
    assert_eq!(std::fs::read(&two.path).unwrap(), b"first");
    assert_eq!(http.fetches(), 1);
}

#[tokio::test]
async fn test_invalid_url_rejected_without_fetch() {
    let dir = TempDir::new().unwrap();
    let mut http = MockHttp::new();
    http.expect_download_stream().never();
    let store = cache_store(&dir, Arc::new(http));

    let err = store.resolve("not a url").await.unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_cache_events_published() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    http.route(URL, b"audio");
    let bus: EventBus<EngineEvent> = EventBus::new(16);
    let mut events = bus.subscribe();
    let store = store_with(&dir, CacheConfig::new(), http).with_event_bus(bus);

    let resolved = store.resolve(URL).await.unwrap();
    store.resolve(URL).await.unwrap();

    let received: Vec<EngineEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert_eq!(
        received,
        vec![
            EngineEvent::from(CacheEvent::DownloadStarted {
                url: URL.to_string()
            }),
            EngineEvent::from(CacheEvent::DownloadCompleted {
                url: URL.to_string(),
                path: resolved.path.clone(),
                bytes: 5,
            }),
            EngineEvent::from(CacheEvent::Hit {
                url: URL.to_string(),
                path: resolved.path,
            }),
        ]
    );
}

#[tokio::test]
async fn test_default_directory_under_host_cache() {
    let dir = TempDir::new().unwrap();
    let http = FakeHttpClient::new();
    http.route(URL, b"audio");
    let store = LocalCacheStore::new(
        CacheConfig::new().with_subdirectory("music-cache"),
        http,
        Arc::new(TokioFileSystem::with_cache_directory(dir.path().to_path_buf())),
    )
    .unwrap();

    let resolved = store.resolve(URL).await.unwrap();

    assert_eq!(
        resolved.path.parent().unwrap(),
        dir.path().join("music-cache")
    );
    assert_eq!(store.cache_directory().await.unwrap(), dir.path().join("music-cache"));
}
