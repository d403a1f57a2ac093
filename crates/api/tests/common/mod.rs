#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use claimdesk_api::config::ServerConfig;
use claimdesk_api::router::build_app_router;
use claimdesk_api::session_registry::SessionRegistry;
use claimdesk_api::state::AppState;
use claimdesk_core::annotator::AnnotatorRoster;
use claimdesk_core::item::{Dataset, Item};
use claimdesk_core::storage::StorageMode;
use claimdesk_store::{AnnotationStore, JsonlRecordStore};

/// First annotator of the test roster; assigned `a1` and `a2`.
pub const ANNOTATOR: &str = "annotator_01";
/// Second annotator of the test roster; assigned `a3` and `a4`.
pub const OTHER_ANNOTATOR: &str = "annotator_02";

/// Build a test `ServerConfig` rooted at `dir`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        write_timeout_secs: 10,
        dataset_path: dir.join("posts.json"),
        images_dir: dir.join("images"),
        guidelines_path: dir.join("guidelines.md"),
        data_dir: dir.join("records"),
        annotators: vec![ANNOTATOR.to_string(), OTHER_ANNOTATOR.to_string()],
        storage_mode: StorageMode::Local,
    }
}

/// Items `a1` through `a4` with Nepali text.
pub fn test_dataset() -> Dataset {
    let texts = ["पहिलो पोस्ट", "दोस्रो पोस्ट", "तेस्रो पोस्ट", "चौथो पोस्ट"];
    Dataset::new(
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Item {
                id: format!("a{}", i + 1),
                image_reference: format!("a{}.jpg", i + 1),
                text: text.to_string(),
            })
            .collect(),
    )
    .unwrap()
}

/// Build the full application router over `dir` with the given store.
pub fn build_test_app_with_store(dir: &Path, store: AnnotationStore) -> Router {
    let config = test_config(dir);
    let roster = config.roster().unwrap();

    let state = AppState {
        config: Arc::new(config.clone()),
        dataset: Arc::new(test_dataset()),
        roster: Arc::new(roster),
        store: Arc::new(store),
        sessions: Arc::new(SessionRegistry::new()),
    };

    build_app_router(state, &config)
}

/// Build the full application router with a local-only store under `dir`.
///
/// Each call starts with an empty session registry, like a restarted server.
pub fn build_test_app(dir: &Path) -> Router {
    let store = AnnotationStore::local(JsonlRecordStore::new(test_config(dir).data_dir));
    build_test_app_with_store(dir, store)
}

/// Build an app whose roster is open to any valid annotator id.
pub fn build_open_test_app(dir: &Path) -> Router {
    let mut config = test_config(dir);
    config.annotators.clear();

    let state = AppState {
        config: Arc::new(config.clone()),
        dataset: Arc::new(test_dataset()),
        roster: Arc::new(AnnotatorRoster::open()),
        store: Arc::new(AnnotationStore::local(JsonlRecordStore::new(&config.data_dir))),
        sessions: Arc::new(SessionRegistry::new()),
    };

    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// URI under `/api/v1/annotators/{annotator_id}`.
pub fn annotator_uri(annotator_id: &str, rest: &str) -> String {
    format!("/api/v1/annotators/{annotator_id}/{rest}")
}
