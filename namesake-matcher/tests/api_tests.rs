//! Integration tests for namesake-matcher HTTP endpoints
//!
//! Tests cover:
//! - Health endpoint (always served)
//! - Readiness gate on corpus routes
//! - Legacy path match and JSON batch match
//! - Add-names validation and store failure reporting
//! - Admin refresh authentication

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use namesake_common::Environment;
use namesake_matcher::classifier::MatchClassifier;
use namesake_matcher::index::NameIndex;
use namesake_matcher::store::{MemoryNameStore, Namespace};
use namesake_matcher::{build_router, AppState, MatchingEngine};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

struct TestApp {
    store: Arc<MemoryNameStore>,
    engine: Arc<MatchingEngine>,
    state: AppState,
}

impl TestApp {
    /// Engine over an in-memory store, corpus loaded, no admin token
    async fn ready() -> Self {
        let app = Self::loading();
        app.engine.refresh().await.unwrap();
        app
    }

    /// Engine whose initial refresh has not run yet
    fn loading() -> Self {
        let store = Arc::new(MemoryNameStore::new());
        let engine = Arc::new(MatchingEngine::new(
            NameIndex::new(),
            store.clone(),
            MatchClassifier::default(),
            Duration::from_secs(1),
        ));
        let state = AppState::new(engine.clone(), Environment::Development);
        Self {
            store,
            engine,
            state,
        }
    }

    fn with_admin_token(mut self, token: &str) -> Self {
        self.state = self.state.with_admin_token(Some(token));
        self
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_readiness_and_sizes() {
    let app = TestApp::ready().await;
    app.engine
        .add_name(Environment::Development, "Ann", "Lee")
        .await
        .unwrap();

    let response = app.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "namesake-matcher");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["ready"], true);
    assert_eq!(body["names"]["first"], 1);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_served_while_loading() {
    let app = TestApp::loading();

    let response = app.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "starting");
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_corpus_routes_unavailable_while_loading() {
    let app = TestApp::loading();

    let response = app.router().oneshot(get("/Rob,Jones")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .router()
        .oneshot(post_json("/", json!({ "first": "Ann", "last": "Lee" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.store.write_count(), 0);
}

// =============================================================================
// Matching
// =============================================================================

#[tokio::test]
async fn test_legacy_path_match() {
    let app = TestApp::ready().await;
    app.engine
        .add_name(Environment::Development, "Robert", "Jones")
        .await
        .unwrap();

    let response = app
        .router()
        .oneshot(get("/Rob,Jones:Zed,Quill"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["original"]["first"], "Rob");
    assert_eq!(results[0]["first"], json!(["Robert"]));
    assert_eq!(results[0]["last"], json!(["Jones"]));
    assert_eq!(results[1]["first"], json!([]));
}

#[tokio::test]
async fn test_json_batch_match() {
    let app = TestApp::ready().await;
    app.engine
        .add_name(Environment::Development, "Smith", "Schmidt")
        .await
        .unwrap();

    let response = app
        .router()
        .oneshot(post_json(
            "/api/match",
            json!([{ "first": "Smyth", "last": "Schmidt" }, { "first": "Ann" }]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["first"], json!(["Smith"]));
    assert_eq!(body[0]["last"], json!(["Schmidt"]));
    assert_eq!(body[1]["original"]["last"], "");
    assert_eq!(body[1]["last"], json!([]));
}

// =============================================================================
// Adding names
// =============================================================================

#[tokio::test]
async fn test_add_joined_lists() {
    let app = TestApp::ready().await;

    let response = app
        .router()
        .oneshot(post_json("/", json!({ "first": "Ann,Bob", "last": "Lee,Roe" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["added"], 2);

    let stored = app.store.snapshot(Namespace::FirstNamesDev).await;
    assert!(stored.contains_key("Ann"));
    assert!(stored.contains_key("Bob"));
}

#[tokio::test]
async fn test_add_json_arrays() {
    let app = TestApp::ready().await;

    let response = app
        .router()
        .oneshot(post_json(
            "/",
            json!({ "first": ["Cy"], "last": ["Day"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.snapshot(Namespace::LastNamesDev).await.contains_key("Day"));
}

#[tokio::test]
async fn test_add_with_empty_first_name_rejected() {
    let app = TestApp::ready().await;

    let response = app
        .router()
        .oneshot(post_json("/", json!({ "first": "", "last": "Doe" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_add_unpaired_lists_rejected_before_any_write() {
    let app = TestApp::ready().await;

    let response = app
        .router()
        .oneshot(post_json("/", json!({ "first": "Ann,Bob", "last": "Lee" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_add_without_names_rejected() {
    let app = TestApp::ready().await;

    let response = app
        .router()
        .oneshot(post_json("/", json!({ "first": "Ann" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("no names"));
}

#[tokio::test]
async fn test_add_store_failure_reports_pair_and_field() {
    let app = TestApp::ready().await;
    app.store.fail_writes(Namespace::LastNamesDev, true).await;

    let response = app
        .router()
        .oneshot(post_json("/", json!({ "first": "Ann", "last": "Lee" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "ADD_FAILED");
    assert_eq!(body["error"]["pair"], 0);
    assert_eq!(body["error"]["field"], "last");
    assert_eq!(body["error"]["name"], "Lee");
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_refresh_requires_token() {
    let app = TestApp::ready().await.with_admin_token("s3cret");

    let response = app
        .router()
        .oneshot(post_json("/admin/refresh", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .method("POST")
        .uri("/admin/refresh")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(wrong).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_refresh_reloads_index() {
    let app = TestApp::ready().await.with_admin_token("s3cret");
    app.store
        .seed(Namespace::FirstNamesDev, "Thomas", "TMS:TMS")
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/admin/refresh")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["development"]["first"], 1);
    assert!(app
        .engine
        .index()
        .bucket(namesake_matcher::index::Category::First, Environment::Development)
        .contains("Thomas")
        .await);
}

#[tokio::test]
async fn test_admin_refresh_failure_is_unavailable() {
    let app = TestApp::ready().await;
    app.store.fail_reads(Namespace::FirstNames, true).await;

    let response = app
        .router()
        .oneshot(post_json("/admin/refresh", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
