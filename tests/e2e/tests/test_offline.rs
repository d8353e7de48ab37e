//! E2E: offline resilience.
//!
//! The scenarios here pull the network out from under an installed worker
//! and check what the page still receives.

use outpost_e2e_tests::{chat_config, shell_urls, tiny_quota_config, ScriptedBackend};
use outpost_worker::{FetchOutcome, FetchSource, Request, ServiceWorker};

fn make_active(version: &str) -> (ServiceWorker, ScriptedBackend) {
    let mut backend = ScriptedBackend::serving_shell(&shell_urls());
    let mut worker = ServiceWorker::from_json(&chat_config(version)).unwrap();
    worker.handle_install(&mut backend).unwrap();
    worker.handle_activate().unwrap();
    (worker, backend)
}

#[test]
fn test_app_shell_loads_offline_after_install() {
    let (mut worker, mut backend) = make_active("v1");
    backend.go_offline();

    for url in ["/", "/app.js", "/styles.css"] {
        let outcome = worker.handle_fetch(&mut backend, &Request::get(url));
        assert_eq!(outcome.source(), Some(FetchSource::Cache), "{}", url);
        assert_eq!(outcome.response().unwrap().status, 200);
    }
}

#[test]
fn test_api_responses_survive_connection_loss() {
    let (mut worker, mut backend) = make_active("v1");
    backend.update("/api/girls", b"{\"girls\":[]}");

    let online = worker.handle_fetch(&mut backend, &Request::get("/api/girls"));
    assert_eq!(online.source(), Some(FetchSource::Network));

    backend.go_offline();
    let offline = worker.handle_fetch(&mut backend, &Request::get("/api/girls"));

    assert_eq!(offline.source(), Some(FetchSource::Cache));
    assert_eq!(offline.response().unwrap().body, b"{\"girls\":[]}");
}

#[test]
fn test_cold_cache_offline_yields_a_synthetic_503() {
    let (mut worker, mut backend) = make_active("v1");
    backend.go_offline();

    let outcome = worker.handle_fetch(&mut backend, &Request::get("/api/feed"));

    assert_eq!(outcome.source(), Some(FetchSource::Synthetic));
    let response = outcome.response().unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.status_text, "Service Unavailable");
    assert!(!worker.store().has("v1-dynamic"));
}

#[test]
fn test_offline_page_serves_from_cache_without_network() {
    let (mut worker, mut backend) = make_active("v1");
    let before = backend.hits("/offline.html");
    backend.go_offline();

    let outcome = worker.handle_fetch(&mut backend, &Request::get("/offline.html"));

    assert_eq!(outcome.source(), Some(FetchSource::Cache));
    // cache-only never went near the transport after install.
    assert_eq!(backend.hits("/offline.html"), before);
}

#[test]
fn test_photos_refresh_in_the_background() {
    let (mut worker, mut backend) = make_active("v1");
    backend.update("/photos/7.jpg", b"old pixels");
    let request = Request::get("/photos/7.jpg");

    worker.handle_fetch(&mut backend, &request);
    let cached = worker.handle_fetch(&mut backend, &request);
    assert_eq!(cached.source(), Some(FetchSource::Cache));
    assert_eq!(cached.response().unwrap().body, b"old pixels");
    assert_eq!(worker.pending_revalidations(), 1);

    backend.update("/photos/7.jpg", b"new pixels");
    assert_eq!(worker.run_background_tasks(&mut backend), 1);

    backend.go_offline();
    let refreshed = worker.handle_fetch(&mut backend, &request);
    assert_eq!(refreshed.response().unwrap().body, b"new pixels");
}

#[test]
fn test_failed_background_refresh_keeps_serving_stale() {
    let (mut worker, mut backend) = make_active("v1");
    backend.update("/photos/7.jpg", b"old pixels");
    let request = Request::get("/photos/7.jpg");

    worker.handle_fetch(&mut backend, &request);
    worker.handle_fetch(&mut backend, &request);

    backend.go_offline();
    assert_eq!(worker.run_background_tasks(&mut backend), 1);

    let outcome = worker.handle_fetch(&mut backend, &request);
    assert_eq!(outcome.source(), Some(FetchSource::Cache));
    assert_eq!(outcome.response().unwrap().body, b"old pixels");
}

#[test]
fn test_non_get_traffic_is_never_cached() {
    let (mut worker, mut backend) = make_active("v1");

    let post = Request::post("/api/messages", b"{\"text\":\"hi\"}".to_vec());
    let outcome = worker.handle_fetch(&mut backend, &post);

    assert_eq!(outcome, FetchOutcome::Passthrough);
    assert_eq!(backend.hits("/api/messages"), 0);
    assert!(!worker.store().has("v1-dynamic"));
}

#[test]
fn test_error_statuses_pass_through_uncached() {
    let (mut worker, _shell) = make_active("v1");
    let mut backend = ScriptedBackend::new().serve_status("/api/girls", 500);

    let outcome = worker.handle_fetch(&mut backend, &Request::get("/api/girls"));

    assert_eq!(outcome.response().unwrap().status, 500);
    assert_eq!(outcome.source(), Some(FetchSource::Network));
    assert!(!worker.store().has("v1-dynamic"));
}

#[test]
fn test_quota_evicts_the_least_recently_used_photo() {
    let mut worker = ServiceWorker::from_json(&tiny_quota_config("v1", 1000)).unwrap();
    let mut backend = ScriptedBackend::new()
        .serve_ok("/photos/a.jpg", &[0xa; 400])
        .serve_ok("/photos/b.jpg", &[0xb; 400])
        .serve_ok("/photos/c.jpg", &[0xc; 400]);
    worker.handle_install(&mut backend).unwrap();
    worker.handle_activate().unwrap();

    worker.handle_fetch(&mut backend, &Request::get("/photos/a.jpg"));
    worker.handle_fetch(&mut backend, &Request::get("/photos/b.jpg"));
    // Touch a so b becomes the coldest entry.
    worker.handle_fetch(&mut backend, &Request::get("/photos/a.jpg"));
    worker.handle_fetch(&mut backend, &Request::get("/photos/c.jpg"));

    assert!(worker.store().peek("v1-image", "/photos/a.jpg").is_some());
    assert!(worker.store().peek("v1-image", "/photos/b.jpg").is_none());
    assert!(worker.store().peek("v1-image", "/photos/c.jpg").is_some());
    assert!(worker.store().total_size() <= 1000);
}
