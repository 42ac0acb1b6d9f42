//! Integration tests for the directory fetcher.
//!
//! A mock server plays both the contents-listing API and the raw file host.

mod support;

use std::time::Duration;

use dirgrab_core::download::{DownloadOutcome, SkipReason};
use dirgrab_core::{
    DirectoryFetcher, DownloadError, FetchConfig, FetchError, FetchSummary, HttpClient,
    RepositoryLocation, RetryPolicy,
};
use futures_util::StreamExt;
use serde_json::json;
use support::mock_server;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/repos/acme/widgets/contents/assets/icons";

fn fetcher(concurrency: usize, retry_policy: RetryPolicy) -> DirectoryFetcher {
    DirectoryFetcher::new(
        HttpClient::new(),
        FetchConfig {
            concurrency,
            retry_policy,
        },
    )
    .expect("valid config")
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(10), Duration::from_millis(20), 2.0)
}

fn listing_url(server: &MockServer) -> String {
    RepositoryLocation::parse("https://github.com/acme/widgets/tree/main/assets/icons")
        .expect("valid URL")
        .api_url_with_base(&server.uri())
}

async fn mount_listing(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

async fn collect(fetcher: &DirectoryFetcher, url: &str, root: &TempDir) -> Vec<DownloadOutcome> {
    let download = fetcher
        .list_and_download(url, Some(root.path()), "icons")
        .await
        .expect("listing should succeed");
    download.outcomes.collect().await
}

#[tokio::test]
async fn test_concrete_scenario_downloads_file_and_skips_subdir() {
    let Some(server) = mock_server().await else {
        return;
    };
    let uri = server.uri();
    mount_listing(
        &server,
        json!([
            {"name": "a.png", "download_url": format!("{uri}/raw/a.png"), "type": "file"},
            {"name": "subdir", "download_url": null, "type": "dir"}
        ]),
    )
    .await;
    mount_file(&server, "/raw/a.png", b"\x89PNG\r\n\x1a\n").await;
    let root = TempDir::new().expect("temp dir");

    let fetcher = fetcher(1, RetryPolicy::no_retry());
    let mut download = fetcher
        .list_and_download(&listing_url(&server), Some(root.path()), "icons")
        .await
        .expect("listing should succeed");

    assert_eq!(download.target_dir, root.path().join("icons"));
    assert!(download.target_dir.is_dir());
    assert_eq!(download.total, 1);
    assert_eq!(download.skipped.len(), 1);
    assert_eq!(download.skipped[0].name.as_deref(), Some("subdir"));
    assert!(matches!(download.skipped[0].reason, SkipReason::NoDownloadUrl(_)));

    let outcome = download.outcomes.next().await.expect("one outcome");
    assert!(outcome.is_success(), "got: {:?}", outcome.result);
    assert_eq!(outcome.local_path, root.path().join("icons").join("a.png"));
    assert_eq!(
        std::fs::read(root.path().join("icons/a.png")).expect("file written"),
        b"\x89PNG\r\n\x1a\n"
    );
    assert!(download.outcomes.next().await.is_none());
    assert!(!root.path().join("icons/subdir").exists());
}

#[tokio::test]
async fn test_every_file_entry_attempted_in_listing_order() {
    let Some(server) = mock_server().await else {
        return;
    };
    let uri = server.uri();
    mount_listing(
        &server,
        json!([
            {"name": "c.txt", "download_url": format!("{uri}/raw/c.txt")},
            {"name": "nested", "download_url": null, "type": "dir"},
            {"name": "a.txt", "download_url": format!("{uri}/raw/a.txt")},
            {"download_url": format!("{uri}/raw/nameless")},
            {"name": "b.txt", "download_url": format!("{uri}/raw/b.txt")}
        ]),
    )
    .await;
    for name in ["a.txt", "b.txt", "c.txt"] {
        mount_file(&server, &format!("/raw/{name}"), name.as_bytes()).await;
    }
    let root = TempDir::new().expect("temp dir");

    let outcomes = collect(&fetcher(1, RetryPolicy::no_retry()), &listing_url(&server), &root).await;

    let names: Vec<_> = outcomes.iter().map(|o| o.entry.name.as_str()).collect();
    assert_eq!(names, ["c.txt", "a.txt", "b.txt"]);
    assert!(outcomes.iter().all(DownloadOutcome::is_success));
    let file_requests = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.url.path().starts_with("/raw/"))
        .count();
    assert_eq!(file_requests, 3, "exactly M download attempts");
}

#[tokio::test]
async fn test_failed_file_does_not_affect_siblings() {
    let Some(server) = mock_server().await else {
        return;
    };
    let uri = server.uri();
    mount_listing(
        &server,
        json!([
            {"name": "one.txt", "download_url": format!("{uri}/raw/one.txt")},
            {"name": "two.txt", "download_url": format!("{uri}/raw/two.txt")},
            {"name": "three.txt", "download_url": format!("{uri}/raw/three.txt")}
        ]),
    )
    .await;
    mount_file(&server, "/raw/one.txt", b"1").await;
    Mock::given(method("GET"))
        .and(path("/raw/two.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_file(&server, "/raw/three.txt", b"3").await;
    let root = TempDir::new().expect("temp dir");

    let outcomes = collect(&fetcher(1, RetryPolicy::no_retry()), &listing_url(&server), &root).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(matches!(
        outcomes[1].result,
        Err(DownloadError::HttpStatus { status: 404, .. })
    ));
    assert!(outcomes[2].is_success());
    assert_eq!(std::fs::read(root.path().join("icons/one.txt")).expect("one"), b"1");
    assert_eq!(std::fs::read(root.path().join("icons/three.txt")).expect("three"), b"3");
    assert!(!root.path().join("icons/two.txt").exists());

    let mut summary = FetchSummary::default();
    outcomes.iter().for_each(|o| summary.record(o));
    assert_eq!((summary.completed, summary.failed), (2, 1));
}

#[tokio::test]
async fn test_listing_failure_creates_no_directory_and_downloads_nothing() {
    let Some(server) = mock_server().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let root = TempDir::new().expect("temp dir");

    let fetcher = fetcher(1, RetryPolicy::no_retry());
    let result = fetcher
        .list_and_download(&listing_url(&server), Some(root.path()), "icons")
        .await;

    match result {
        Err(FetchError::Listing(DownloadError::HttpStatus { status, .. })) => assert_eq!(status, 404),
        other => panic!("Expected listing failure, got: {other:?}"),
    }
    assert!(!root.path().join("icons").exists());
    assert_eq!(std::fs::read_dir(root.path()).expect("read root").count(), 0);
}

#[tokio::test]
async fn test_listing_for_file_path_is_not_a_directory() {
    let Some(server) = mock_server().await else {
        return;
    };
    mount_listing(
        &server,
        json!({"name": "icons", "download_url": "https://raw.example.com/icons", "type": "file"}),
    )
    .await;
    let root = TempDir::new().expect("temp dir");

    let fetcher = fetcher(1, RetryPolicy::no_retry());
    let result = fetcher
        .list_and_download(&listing_url(&server), Some(root.path()), "icons")
        .await;

    assert!(matches!(result, Err(FetchError::NotADirectory { .. })));
    assert!(!root.path().join("icons").exists());
}

#[tokio::test]
async fn test_listing_transient_failure_is_retried() {
    let Some(server) = mock_server().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, json!([])).await;
    let root = TempDir::new().expect("temp dir");

    let fetcher = fetcher(1, fast_retry(3));
    let download = fetcher
        .list_and_download(&listing_url(&server), Some(root.path()), "icons")
        .await
        .expect("second listing attempt should succeed");

    assert_eq!(download.total, 0);
    assert!(root.path().join("icons").is_dir());
}

#[tokio::test]
async fn test_file_transient_failure_is_retried_until_exhausted() {
    let Some(server) = mock_server().await else {
        return;
    };
    let uri = server.uri();
    mount_listing(
        &server,
        json!([{"name": "flaky.txt", "download_url": format!("{uri}/raw/flaky.txt")}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/raw/flaky.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    let root = TempDir::new().expect("temp dir");

    let outcomes = collect(&fetcher(1, fast_retry(2)), &listing_url(&server), &root).await;

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(
        outcomes[0].result,
        Err(DownloadError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_parallel_downloads_keep_listing_order() {
    let Some(server) = mock_server().await else {
        return;
    };
    let uri = server.uri();
    let names: Vec<String> = (0..8).map(|i| format!("f{i}.txt")).collect();
    let listing: Vec<_> = names
        .iter()
        .map(|name| json!({"name": name, "download_url": format!("{uri}/raw/{name}")}))
        .collect();
    mount_listing(&server, serde_json::Value::Array(listing)).await;
    for (i, name) in names.iter().enumerate() {
        // Earlier files answer slower, so completion order differs from listing order.
        Mock::given(method("GET"))
            .and(path(format!("/raw/{name}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(name.as_bytes().to_vec())
                    .set_delay(Duration::from_millis(10 * (8 - i as u64))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    let root = TempDir::new().expect("temp dir");

    let outcomes = collect(&fetcher(4, RetryPolicy::no_retry()), &listing_url(&server), &root).await;

    let got: Vec<_> = outcomes.iter().map(|o| o.entry.name.clone()).collect();
    assert_eq!(got, names);
    for name in &names {
        assert_eq!(
            std::fs::read(root.path().join("icons").join(name)).expect("file written"),
            name.as_bytes()
        );
    }
}

#[tokio::test]
async fn test_existing_target_directory_is_reused() {
    let Some(server) = mock_server().await else {
        return;
    };
    let uri = server.uri();
    mount_listing(
        &server,
        json!([{"name": "a.txt", "download_url": format!("{uri}/raw/a.txt")}]),
    )
    .await;
    mount_file(&server, "/raw/a.txt", b"fresh").await;
    let root = TempDir::new().expect("temp dir");
    std::fs::create_dir(root.path().join("icons")).expect("pre-create");
    std::fs::write(root.path().join("icons/keep.txt"), b"keep").expect("seed");

    let outcomes = collect(&fetcher(1, RetryPolicy::no_retry()), &listing_url(&server), &root).await;

    assert!(outcomes[0].is_success());
    assert_eq!(std::fs::read(root.path().join("icons/a.txt")).expect("a"), b"fresh");
    assert_eq!(std::fs::read(root.path().join("icons/keep.txt")).expect("keep"), b"keep");
}
