//! HTTP API integration tests
//!
//! Exercises the router with `tower::ServiceExt::oneshot`: validation,
//! job lifecycle over the polling endpoint, and the SSE stream.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use snapsift_cu::models::{AnalysisSummary, CategorySummary, CurationReport};
use snapsift_cu::services::{
    AlbumCurator, BatchScorer, ItemScorer, JobStore, PhotosClient, SharedAlbumScraper,
    VisionScorer,
};
use snapsift_cu::{build_router, AppState};

/// App state with real clients and fast batch pacing. Jobs started in these
/// tests point at unreachable content URLs, so every item takes the
/// degraded-verdict path without touching the network for long.
fn test_app_state() -> AppState {
    let store = JobStore::new();
    let photos = Arc::new(PhotosClient::new().unwrap());
    let scorer: Arc<dyn ItemScorer> = Arc::new(VisionScorer::new("test-key".to_string()).unwrap());
    let scraper = Arc::new(SharedAlbumScraper::new().unwrap());
    let curator = AlbumCurator::new(
        store.clone(),
        photos.clone(),
        scorer,
        BatchScorer::with_delays(Duration::from_millis(1), Duration::from_millis(1)),
    );

    AppState {
        store,
        curator,
        photos,
        scraper,
        startup_time: chrono::Utc::now(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn post_json_auth(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-token")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn empty_report(job_id: uuid::Uuid) -> CurationReport {
    CurationReport {
        job_id,
        original_album: None,
        analysis: AnalysisSummary {
            photos: CategorySummary::empty(),
            videos: CategorySummary::empty(),
        },
        new_albums: Vec::new(),
        processing_time_ms: 5,
        results: None,
    }
}

#[tokio::test]
async fn health_reports_module_identity() {
    let app = build_router(test_app_state());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "snapsift-cu");
    assert_eq!(body["active_jobs"], 0);
}

#[tokio::test]
async fn unknown_job_status_is_404() {
    let app = build_router(test_app_state());

    let uri = format!("/api/analysis/status/{}", uuid::Uuid::new_v4());
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn start_requires_a_bearer_token() {
    let state = test_app_state();
    let store = state.store.clone();
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/api/analysis/start",
            json!({ "album_id": "alb-1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.is_empty(), "no job may be created for a rejected request");
}

#[tokio::test]
async fn invalid_threshold_is_rejected_before_job_creation() {
    let state = test_app_state();
    let store = state.store.clone();
    let app = build_router(state);

    let response = app
        .oneshot(post_json_auth(
            "/api/analysis/start",
            json!({ "album_id": "alb-1", "photo_threshold": 150 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty(), "no job may be created for a rejected request");
}

#[tokio::test]
async fn empty_album_id_is_rejected() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(post_json_auth(
            "/api/analysis/start",
            json!({ "album_id": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scraped_start_requires_a_nonempty_photo_list() {
    let state = test_app_state();
    let store = state.store.clone();
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/api/analysis/start-scraped",
            json!({ "photos": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
}

#[tokio::test]
async fn scraped_job_is_pollable_immediately_and_runs_to_completion() {
    let app = build_router(test_app_state());

    // Unreachable content URLs: both items degrade to score-0 discards
    let request = post_json(
        "/api/analysis/start-scraped",
        json!({
            "photos": [
                { "id": "scraped_1", "base_url": "http://127.0.0.1:9/one", "filename": "photo_1.jpg" },
                { "id": "scraped_2", "base_url": "http://127.0.0.1:9/two", "filename": "photo_2.jpg" }
            ],
            "photo_threshold": 85
        }),
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().expect("job id in response").to_string();

    // The id resolves before the background task makes its first update
    let status_uri = format!("/api/analysis/status/{}", job_id);
    let response = app.clone().oneshot(get(&status_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Poll until terminal
    let mut last = Value::Null;
    for _ in 0..500 {
        let response = app.clone().oneshot(get(&status_uri)).await.unwrap();
        last = body_json(response).await;
        if last["status"] == "completed" || last["status"] == "failed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["status"], "completed");
    assert_eq!(last["progress"], 100.0);
    assert_eq!(last["analysis"]["photos"]["total"], 2);
    assert_eq!(last["analysis"]["photos"]["analyzed"], 2);
    assert_eq!(last["analysis"]["photos"]["selected"], 0);
    assert_eq!(last["new_albums"], json!([]));
    assert_eq!(last["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(last["results"][0]["score"], 0);
    assert_eq!(last["results"][0]["recommendation"], "discard");
}

#[tokio::test]
async fn terminal_status_reads_are_identical() {
    let state = test_app_state();
    let job_id = state.store.create().job_id;
    state.store.complete(job_id, empty_report(job_id));
    let app = build_router(state);

    let uri = format!("/api/analysis/status/{}", job_id);
    let first = app.clone().oneshot(get(&uri)).await.unwrap();
    let first_bytes = first.into_body().collect().await.unwrap().to_bytes();
    let second = app.clone().oneshot(get(&uri)).await.unwrap();
    let second_bytes = second.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn parse_rejects_a_malformed_share_link() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(post_json(
            "/api/albums/parse",
            json!({ "url": "https://example.com/not-a-share-link" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_albums_requires_a_bearer_token() {
    let app = build_router(test_app_state());

    let response = app.oneshot(get("/api/albums")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stream_for_unknown_job_emits_not_found_then_closes() {
    let app = build_router(test_app_state());

    let uri = format!("/api/analysis/stream/{}", uuid::Uuid::new_v4());
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The stream ends after the single not-found notice, so the body is
    // fully collectable
    let bytes = tokio::time::timeout(
        Duration::from_secs(10),
        response.into_body().collect(),
    )
    .await
    .expect("stream should close on its own")
    .unwrap()
    .to_bytes();

    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("job not found"), "body was: {}", body);
}

#[tokio::test]
async fn stream_emits_snapshots_until_terminal_then_closes() {
    let state = test_app_state();
    let store = state.store.clone();
    let job_id = store.create().job_id;
    let app = build_router(state);

    // Complete the job while the subscriber is attached
    let completer = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        completer.complete(job_id, empty_report(job_id));
    });

    let uri = format!("/api/analysis/stream/{}", job_id);
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = tokio::time::timeout(
        Duration::from_secs(10),
        response.into_body().collect(),
    )
    .await
    .expect("stream should close after the terminal snapshot")
    .unwrap()
    .to_bytes();

    let body = String::from_utf8_lossy(&bytes);
    assert!(
        body.contains("\"status\":\"processing\""),
        "expected at least one processing snapshot: {}",
        body
    );
    assert!(
        body.contains("\"status\":\"completed\""),
        "expected the terminal snapshot: {}",
        body
    );
}
