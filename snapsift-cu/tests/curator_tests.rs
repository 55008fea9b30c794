//! Orchestrator integration tests
//!
//! Drives the curator end to end with a scripted scorer and, for the
//! authenticated mode, a local stub of the photo library API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::IntoResponse;
use axum::{http::Method, http::StatusCode, Json, Router};
use uuid::Uuid;

use snapsift_cu::models::{
    AlbumCategory, CurationReport, JobSnapshot, JobState, MediaItem, MediaKind, Recommendation,
    Verdict,
};
use snapsift_cu::services::{
    AlbumCurator, BatchScorer, CurationOptions, ItemScorer, JobStore, PhotosClient,
};

/// Scorer with scripted scores per item id; keeps iff score >= threshold.
/// Unknown ids behave like a scoring failure (degraded discard verdict).
struct ScriptedScorer {
    scores: HashMap<String, u32>,
}

impl ScriptedScorer {
    fn new(scores: &[(&str, u32)]) -> Arc<dyn ItemScorer> {
        Arc::new(Self {
            scores: scores
                .iter()
                .map(|(id, s)| (id.to_string(), *s))
                .collect(),
        })
    }
}

#[async_trait]
impl ItemScorer for ScriptedScorer {
    async fn score(&self, item: &MediaItem, _kind: MediaKind, threshold: u32) -> Verdict {
        match self.scores.get(&item.id) {
            Some(&score) => {
                let mut verdict = Verdict::degraded(item, score, "scripted");
                if score >= threshold {
                    verdict.recommendation = Recommendation::Keep;
                }
                verdict
            }
            None => Verdict::degraded(item, 0, "scoring error"),
        }
    }
}

/// Local stand-in for the photo library API. Records every request as
/// "METHOD /path" and serves a fixed album ("Trip") whose item listing is
/// the given media items JSON.
async fn spawn_photos_stub(
    media_items: serde_json::Value,
    fail_all: bool,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let hits: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = hits.clone();

    let app = Router::new().fallback(move |req: axum::extract::Request| {
        let recorded = recorded.clone();
        let media_items = media_items.clone();
        async move {
            let method = req.method().clone();
            let path = req.uri().path().to_string();
            recorded.lock().unwrap().push(format!("{} {}", method, path));

            if fail_all {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "backend unavailable"})),
                )
                    .into_response();
            }

            let body = if method == Method::POST && path == "/mediaItems:search" {
                serde_json::json!({ "mediaItems": media_items })
            } else if method == Method::POST && path == "/albums" {
                serde_json::json!({
                    "id": "new-album-1",
                    "productUrl": "https://photos.example/new-album-1"
                })
            } else if path.contains(":batchAddMediaItems") {
                serde_json::json!({})
            } else if method == Method::GET && path.starts_with("/albums/") {
                serde_json::json!({ "id": "alb-1", "title": "Trip" })
            } else {
                serde_json::json!({})
            };

            Json(body).into_response()
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

fn curator_with(base_url: &str, scorer: Arc<dyn ItemScorer>) -> (AlbumCurator, JobStore) {
    let store = JobStore::new();
    let photos = Arc::new(PhotosClient::with_base_url(base_url.to_string()).unwrap());
    let batch = BatchScorer::with_delays(Duration::ZERO, Duration::ZERO);
    let curator = AlbumCurator::new(store.clone(), photos, scorer, batch);
    (curator, store)
}

fn scraped_item(index: usize) -> MediaItem {
    MediaItem {
        id: format!("scraped_{}", index),
        base_url: format!("https://lh3.googleusercontent.com/pw/{}", index),
        mime_type: "image/jpeg".to_string(),
        filename: format!("photo_{}.jpg", index),
        width: Some(1920),
        height: Some(1080),
    }
}

async fn wait_for_terminal(store: &JobStore, job_id: Uuid) -> JobSnapshot {
    for _ in 0..500 {
        if let Some(snapshot) = store.get(job_id) {
            if snapshot.is_terminal() {
                return snapshot;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not reach a terminal state in time", job_id);
}

fn completed_report(snapshot: JobSnapshot) -> CurationReport {
    match snapshot.state {
        JobState::Completed { report, .. } => report,
        other => panic!("expected completed job, got {:?}", other),
    }
}

#[tokio::test]
async fn scraped_empty_list_completes_immediately_with_zero_counts() {
    let (curator, store) = curator_with("http://127.0.0.1:9", ScriptedScorer::new(&[]));

    let job_id = curator.start_scraped_curation(Vec::new(), CurationOptions::default());
    let report = completed_report(wait_for_terminal(&store, job_id).await);

    assert_eq!(report.analysis.photos.total, 0);
    assert_eq!(report.analysis.photos.selected, 0);
    assert_eq!(report.analysis.photos.average_score, 0);
    assert!(report.new_albums.is_empty());
    assert!(report.results.expect("scraped report keeps verdicts").is_empty());
    assert!(report.original_album.is_none());
}

#[tokio::test]
async fn scraped_job_id_is_valid_for_lookup_before_completion() {
    let (curator, store) = curator_with(
        "http://127.0.0.1:9",
        ScriptedScorer::new(&[("scraped_1", 90)]),
    );

    let job_id = curator.start_scraped_curation(vec![scraped_item(1)], CurationOptions::default());

    // The record exists synchronously, before the spawned task runs
    assert!(store.get(job_id).is_some());

    wait_for_terminal(&store, job_id).await;
}

#[tokio::test]
async fn scraped_mode_selects_by_recommendation_and_retains_verdicts() {
    let (curator, store) = curator_with(
        "http://127.0.0.1:9",
        ScriptedScorer::new(&[("scraped_1", 90), ("scraped_2", 70), ("scraped_3", 95)]),
    );

    let photos = vec![scraped_item(1), scraped_item(2), scraped_item(3)];
    let options = CurationOptions {
        photo_threshold: 85,
        video_threshold: 80,
    };

    let job_id = curator.start_scraped_curation(photos, options);
    let report = completed_report(wait_for_terminal(&store, job_id).await);

    assert_eq!(report.analysis.photos.total, 3);
    assert_eq!(report.analysis.photos.analyzed, 3);
    assert_eq!(report.analysis.photos.selected, 2);
    // round((90 + 70 + 95) / 3) = 85
    assert_eq!(report.analysis.photos.average_score, 85);

    // Verdict list is retained, in input order
    let results = report.results.expect("scraped report keeps verdicts");
    let ids: Vec<&str> = results.iter().map(|v| v.item_id.as_str()).collect();
    assert_eq!(ids, vec!["scraped_1", "scraped_2", "scraped_3"]);

    // No write-back in scraped mode
    assert!(report.new_albums.is_empty());
}

#[tokio::test]
async fn scraped_mode_survives_a_degraded_item() {
    // scraped_2 is unknown to the stub: scored 0, discarded
    let (curator, store) = curator_with(
        "http://127.0.0.1:9",
        ScriptedScorer::new(&[("scraped_1", 90), ("scraped_3", 92)]),
    );

    let photos = vec![scraped_item(1), scraped_item(2), scraped_item(3)];
    let job_id = curator.start_scraped_curation(photos, CurationOptions::default());
    let report = completed_report(wait_for_terminal(&store, job_id).await);

    assert_eq!(report.analysis.photos.analyzed, 3);
    let results = report.results.unwrap();
    assert_eq!(results[1].score, 0);
    assert_eq!(results[1].recommendation, Recommendation::Discard);
}

#[tokio::test]
async fn authenticated_flow_materializes_one_album_per_kept_category() {
    let media_items = serde_json::json!([
        {"id": "p1", "baseUrl": "https://x/p1", "mimeType": "image/jpeg", "filename": "a.jpg"},
        {"id": "p2", "baseUrl": "https://x/p2", "mimeType": "image/jpeg", "filename": "b.jpg"},
        {"id": "v1", "baseUrl": "https://x/v1", "mimeType": "video/mp4", "filename": "c.mp4"}
    ]);
    let (base_url, hits) = spawn_photos_stub(media_items, false).await;

    let scorer = ScriptedScorer::new(&[("p1", 90), ("p2", 70), ("v1", 85)]);
    let (curator, store) = curator_with(&base_url, scorer);

    let job_id = curator.start_album_curation(
        "alb-1".to_string(),
        "token".to_string(),
        CurationOptions::default(),
    );
    let report = completed_report(wait_for_terminal(&store, job_id).await);

    let source = report.original_album.expect("authenticated report names its source");
    assert_eq!(source.name, "Trip");
    assert_eq!(source.photo_count, 2);
    assert_eq!(source.video_count, 1);

    assert_eq!(report.analysis.photos.selected, 1);
    assert_eq!(report.analysis.videos.selected, 1);

    assert_eq!(report.new_albums.len(), 2);
    assert_eq!(report.new_albums[0].category, AlbumCategory::Photos);
    assert_eq!(report.new_albums[0].name, "Selected_Photos_from_Trip");
    assert_eq!(report.new_albums[0].item_count, 1);
    assert_eq!(report.new_albums[1].category, AlbumCategory::Videos);
    assert_eq!(report.new_albums[1].name, "Selected_Videos_from_Trip");

    // Authenticated reports do not carry the verdict list
    assert!(report.results.is_none());

    let hits = hits.lock().unwrap();
    let creates = hits.iter().filter(|h| *h == "POST /albums").count();
    let adds = hits
        .iter()
        .filter(|h| h.contains(":batchAddMediaItems"))
        .count();
    assert_eq!(creates, 2);
    assert_eq!(adds, 2);
}

#[tokio::test]
async fn no_album_calls_when_nothing_is_kept() {
    let media_items = serde_json::json!([
        {"id": "p1", "baseUrl": "https://x/p1", "mimeType": "image/jpeg", "filename": "a.jpg"},
        {"id": "p2", "baseUrl": "https://x/p2", "mimeType": "image/jpeg", "filename": "b.jpg"}
    ]);
    let (base_url, hits) = spawn_photos_stub(media_items, false).await;

    // Every score sits below the threshold
    let scorer = ScriptedScorer::new(&[("p1", 40), ("p2", 55)]);
    let (curator, store) = curator_with(&base_url, scorer);

    let job_id = curator.start_album_curation(
        "alb-1".to_string(),
        "token".to_string(),
        CurationOptions::default(),
    );
    let report = completed_report(wait_for_terminal(&store, job_id).await);

    assert_eq!(report.analysis.photos.selected, 0);
    assert!(report.new_albums.is_empty());

    let hits = hits.lock().unwrap();
    assert!(!hits.iter().any(|h| h == "POST /albums"));
    assert!(!hits.iter().any(|h| h.contains(":batchAddMediaItems")));
}

#[tokio::test]
async fn album_lookup_failure_fails_the_job() {
    let (base_url, _hits) = spawn_photos_stub(serde_json::json!([]), true).await;
    let (curator, store) = curator_with(&base_url, ScriptedScorer::new(&[]));

    let job_id = curator.start_album_curation(
        "alb-1".to_string(),
        "token".to_string(),
        CurationOptions::default(),
    );
    let snapshot = wait_for_terminal(&store, job_id).await;

    match snapshot.state {
        JobState::Failed { progress, error } => {
            assert_eq!(progress, 0.0);
            assert!(error.contains("500"), "error should keep the upstream status: {}", error);
        }
        other => panic!("expected failed job, got {:?}", other),
    }
}
