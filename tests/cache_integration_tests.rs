//! Integration Tests for the Collection Cache
//!
//! Runs caches against a local axum server through the real HTTP fetcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use collection_cache::cache::InflightRegistry;
use collection_cache::fetch::HttpFetcher;
use collection_cache::session::{MemorySession, SessionStorage};
use collection_cache::{CacheContext, CacheError, CollectionCache, Config, StoreOptions};
use serde_json::{json, Value};

// == Helper Functions ==

#[derive(Clone, Default)]
struct Remote {
    hits: Arc<AtomicUsize>,
}

impl Remote {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn fast_items() -> Value {
    json!([
        {"id": 1, "name": "alpha"},
        {"id": "2", "name": "beta"},
        {"id": 3, "name": "gamma"}
    ])
}

fn slow_items() -> Value {
    json!([{"id": 99, "name": "slow"}])
}

async fn items_handler(State(remote): State<Remote>) -> Json<Value> {
    remote.hits.fetch_add(1, Ordering::SeqCst);
    Json(fast_items())
}

async fn slow_items_handler(State(remote): State<Remote>) -> Json<Value> {
    remote.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    Json(slow_items())
}

async fn slow_fail_handler(State(remote): State<Remote>) -> StatusCode {
    remote.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn object_handler() -> Json<Value> {
    Json(json!({"data": []}))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Starts the fake remote on an ephemeral port and returns its base URL.
async fn spawn_remote() -> (String, Remote) {
    init_tracing();

    let remote = Remote::default();
    let app = Router::new()
        .route("/items", get(items_handler))
        .route("/slow-items", get(slow_items_handler))
        .route("/slow-fail", get(slow_fail_handler))
        .route("/object", get(object_handler))
        .with_state(remote.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), remote)
}

fn http_context(session: Arc<MemorySession>) -> CacheContext {
    let fetcher = HttpFetcher::new(&Config::default()).unwrap();
    CacheContext::new(Arc::new(fetcher), session)
}

// == Fetch and Persist ==

#[tokio::test]
async fn test_empty_cache_fetches_and_persists() {
    let (base, remote) = spawn_remote().await;
    let session = Arc::new(MemorySession::new());
    let ctx = http_context(session.clone());
    let cache = CollectionCache::new(
        StoreOptions::new().route(format!("{}/items", base)).name("items"),
        &ctx,
    );

    let items = cache.get_all().await.unwrap();
    assert_eq!(Value::Array(items.to_vec()), fast_items());
    assert_eq!(remote.hits(), 1);

    let persisted = session.get("collection_cache_items").unwrap().unwrap();
    let persisted: Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(persisted, fast_items());
}

#[tokio::test]
async fn test_cached_read_refreshes_in_background() {
    let (base, remote) = spawn_remote().await;
    let ctx = http_context(Arc::new(MemorySession::new()));
    let cache = CollectionCache::new(StoreOptions::new().route(format!("{}/items", base)), &ctx);

    cache.get_all().await.unwrap();
    assert_eq!(remote.hits(), 1);

    let items = cache.get_all().await.unwrap();
    assert_eq!(items.len(), 3);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(remote.hits(), 2, "Stale read should trigger one refresh");
    assert_eq!(cache.stats().memory_hits, 1);
}

#[tokio::test]
async fn test_persisted_session_served_before_network() {
    let (base, _remote) = spawn_remote().await;
    let session = Arc::new(MemorySession::new());
    session
        .set("collection_cache_base", r#"[{"id": "persisted"}]"#)
        .unwrap();

    let ctx = http_context(session);
    let cache = CollectionCache::new(
        StoreOptions::new().route(format!("{}/slow-items", base)),
        &ctx,
    );

    let items = cache.get_all().await.unwrap();
    assert_eq!(*items, vec![json!({"id": "persisted"})]);
    assert_eq!(cache.stats().restores, 1);
}

#[tokio::test]
async fn test_fresh_instance_restores_same_collection() {
    let (base, _remote) = spawn_remote().await;
    let ctx = http_context(Arc::new(MemorySession::new()));

    let first = CollectionCache::new(
        StoreOptions::new().route(format!("{}/items", base)).name("shared"),
        &ctx,
    );
    let fetched = first.get_all().await.unwrap();

    // No route: the only way to get items is the persisted slot
    let second = CollectionCache::new(StoreOptions::new().name("shared"), &ctx);
    let restored = second.get_all().await.unwrap();

    assert_eq!(fetched, restored);
}

// == Single Item Lookup ==

#[tokio::test]
async fn test_get_single_matches_loosely() {
    let (base, _remote) = spawn_remote().await;
    let ctx = http_context(Arc::new(MemorySession::new()));
    let cache = CollectionCache::new(StoreOptions::new().route(format!("{}/items", base)), &ctx);

    let beta = cache.get_single("id", 2).await.unwrap();
    assert_eq!(beta["name"], "beta");

    let alpha = cache.get_single("id", "1").await.unwrap();
    assert_eq!(alpha["name"], "alpha");

    let missing = cache.get_single("id", 404).await;
    assert!(matches!(missing, Err(CacheError::ItemNotFound { .. })));
}

// == Error Propagation ==

#[tokio::test]
async fn test_http_status_error_propagates() {
    let (base, _remote) = spawn_remote().await;
    let ctx = http_context(Arc::new(MemorySession::new()));
    let cache = CollectionCache::new(StoreOptions::new().route(format!("{}/nope", base)), &ctx);

    let result = cache.get_all().await;
    assert!(matches!(result, Err(CacheError::Http { status: 404, .. })));
}

#[tokio::test]
async fn test_unreachable_remote_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let ctx = http_context(Arc::new(MemorySession::new()));
    let cache = CollectionCache::new(
        StoreOptions::new().route(format!("http://{}/items", addr)),
        &ctx,
    );

    let err = cache.get_all().await.unwrap_err();
    assert!(err.is_network(), "Expected a network error, got {err:?}");
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_non_array_body_is_rejected() {
    let (base, _remote) = spawn_remote().await;
    let session = Arc::new(MemorySession::new());
    let ctx = http_context(session.clone());
    let cache = CollectionCache::new(StoreOptions::new().route(format!("{}/object", base)), &ctx);

    let result = cache.get_all().await;
    assert!(matches!(result, Err(CacheError::Parse(_))));
    assert!(session.is_empty(), "Rejected body must not be persisted");
}

#[tokio::test]
async fn test_no_route_and_no_data_fails_fast() {
    let ctx = http_context(Arc::new(MemorySession::new()));
    let cache = CollectionCache::new(StoreOptions::new(), &ctx);

    let result = tokio::time::timeout(Duration::from_secs(1), cache.get_all()).await;
    assert!(matches!(result, Ok(Err(CacheError::NotFound(_)))));
}

// == Concurrency ==

#[tokio::test]
async fn test_concurrent_reads_issue_one_request() {
    let (base, remote) = spawn_remote().await;
    let ctx = http_context(Arc::new(MemorySession::new()));
    let options = StoreOptions::new()
        .route(format!("{}/slow-items", base))
        .name("slow");

    let a = CollectionCache::new(options.clone(), &ctx);
    let b = CollectionCache::new(options, &ctx);

    let (left, right) = tokio::join!(a.get_all(), b.get_all());
    assert_eq!(left.unwrap(), right.unwrap());
    assert_eq!(remote.hits(), 1);
    assert_eq!(a.stats().joined + b.stats().joined, 1);
}

#[tokio::test]
async fn test_same_name_different_routes_each_fetch_their_own() {
    let (base, remote) = spawn_remote().await;
    let session = Arc::new(MemorySession::new());
    let ctx = http_context(session.clone());

    // Both caches keep the default name and share one registry
    let slow = CollectionCache::new(StoreOptions::new().route(format!("{}/slow-items", base)), &ctx);
    let fast = CollectionCache::new(StoreOptions::new().route(format!("{}/items", base)), &ctx);

    let (a, b) = tokio::join!(slow.renew(), fast.renew());
    assert_eq!(Value::Array(a.unwrap().unwrap().to_vec()), slow_items());
    assert_eq!(Value::Array(b.unwrap().unwrap().to_vec()), fast_items());
    assert_eq!(remote.hits(), 2);
    assert_eq!(fast.stats().joined, 0);

    // The persisted slot is still shared: the slower response landed last
    let persisted = session.get("collection_cache_base").unwrap().unwrap();
    let persisted: Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(persisted, slow_items());
}

#[tokio::test]
async fn test_racing_renewals_slow_failure_does_not_overwrite() {
    let (base, _remote) = spawn_remote().await;
    let session = Arc::new(MemorySession::new());
    let ctx_a = http_context(session.clone());
    let ctx_b = ctx_a.clone().with_registry(Arc::new(InflightRegistry::new()));

    let flaky = CollectionCache::new(
        StoreOptions::new().route(format!("{}/slow-fail", base)).name("race"),
        &ctx_a,
    );
    let healthy = CollectionCache::new(
        StoreOptions::new().route(format!("{}/items", base)).name("race"),
        &ctx_b,
    );

    let (slow, fast) = tokio::join!(flaky.renew(), healthy.renew());
    assert!(slow.is_err());
    assert!(fast.unwrap().is_some());

    let persisted = session.get("collection_cache_race").unwrap().unwrap();
    let persisted: Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(persisted, fast_items());
}

#[tokio::test]
async fn test_racing_renewals_last_landing_response_wins() {
    let (base, _remote) = spawn_remote().await;
    let session = Arc::new(MemorySession::new());
    let ctx_a = http_context(session.clone());
    let ctx_b = ctx_a.clone().with_registry(Arc::new(InflightRegistry::new()));

    let slow = CollectionCache::new(
        StoreOptions::new().route(format!("{}/slow-items", base)).name("race"),
        &ctx_a,
    );
    let fast = CollectionCache::new(
        StoreOptions::new().route(format!("{}/items", base)).name("race"),
        &ctx_b,
    );

    let (a, b) = tokio::join!(slow.renew(), fast.renew());
    a.unwrap();
    b.unwrap();

    // The slow response landed last and owns the shared slot
    let persisted = session.get("collection_cache_race").unwrap().unwrap();
    let persisted: Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(persisted, slow_items());
}
