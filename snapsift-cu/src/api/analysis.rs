//! Analysis API handlers
//!
//! **[CUR-API-020]** POST /api/analysis/start, POST
//! /api/analysis/start-scraped, GET /api/analysis/status/{job_id}.
//!
//! Both start endpoints return 202 with the job id immediately; scoring
//! runs as a background task. Malformed requests are rejected before any
//! job is created.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use snapsift_common::validate::{is_valid_album_id, is_valid_threshold};

use crate::{
    api::bearer_token,
    error::{ApiError, ApiResult},
    models::{JobSnapshot, MediaItem},
    services::CurationOptions,
    AppState,
};

/// POST /api/analysis/start request
#[derive(Debug, Deserialize)]
pub struct StartAnalysisRequest {
    pub album_id: String,
    pub photo_threshold: Option<u32>,
    pub video_threshold: Option<u32>,
}

/// POST /api/analysis/start-scraped request
#[derive(Debug, Deserialize)]
pub struct StartScrapedRequest {
    pub photos: Vec<MediaItem>,
    pub photo_threshold: Option<u32>,
    pub video_threshold: Option<u32>,
}

/// Response for both start endpoints
#[derive(Debug, Serialize)]
pub struct StartAnalysisResponse {
    pub job_id: Uuid,
}

/// Fill threshold defaults and validate the result
fn resolve_options(
    photo_threshold: Option<u32>,
    video_threshold: Option<u32>,
) -> ApiResult<CurationOptions> {
    let defaults = CurationOptions::default();
    let options = CurationOptions {
        photo_threshold: photo_threshold.unwrap_or(defaults.photo_threshold),
        video_threshold: video_threshold.unwrap_or(defaults.video_threshold),
    };

    if !is_valid_threshold(options.photo_threshold) || !is_valid_threshold(options.video_threshold)
    {
        return Err(ApiError::BadRequest(
            "thresholds must be between 0 and 100".to_string(),
        ));
    }

    Ok(options)
}

/// POST /api/analysis/start
///
/// Begin authenticated-mode curation of a remote album. 202 Accepted with
/// the job id.
pub async fn start_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StartAnalysisRequest>,
) -> ApiResult<(StatusCode, Json<StartAnalysisResponse>)> {
    let access_token = bearer_token(&headers)?;

    if !is_valid_album_id(&request.album_id) {
        return Err(ApiError::BadRequest("invalid album id".to_string()));
    }
    let options = resolve_options(request.photo_threshold, request.video_threshold)?;

    tracing::info!(
        album_id = %request.album_id,
        photo_threshold = options.photo_threshold,
        video_threshold = options.video_threshold,
        "Starting album analysis"
    );

    let job_id = state
        .curator
        .start_album_curation(request.album_id, access_token, options);

    Ok((StatusCode::ACCEPTED, Json(StartAnalysisResponse { job_id })))
}

/// POST /api/analysis/start-scraped
///
/// Begin scraped-mode curation over a caller-supplied photo list. No
/// credential required. 202 Accepted with the job id.
pub async fn start_scraped_analysis(
    State(state): State<AppState>,
    Json(request): Json<StartScrapedRequest>,
) -> ApiResult<(StatusCode, Json<StartAnalysisResponse>)> {
    if request.photos.is_empty() {
        return Err(ApiError::BadRequest(
            "photo list must not be empty".to_string(),
        ));
    }
    let options = resolve_options(request.photo_threshold, request.video_threshold)?;

    tracing::info!(
        photos = request.photos.len(),
        photo_threshold = options.photo_threshold,
        "Starting scraped analysis"
    );

    let job_id = state
        .curator
        .start_scraped_curation(request.photos, options);

    Ok((StatusCode::ACCEPTED, Json(StartAnalysisResponse { job_id })))
}

/// GET /api/analysis/status/{job_id}
///
/// Single on-demand snapshot. Unknown ids are 404 — never an empty default
/// record.
pub async fn get_analysis_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobSnapshot>> {
    state
        .store
        .get(job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analysis/start", post(start_analysis))
        .route("/api/analysis/start-scraped", post(start_scraped_analysis))
        .route("/api/analysis/status/:job_id", get(get_analysis_status))
        .route(
            "/api/analysis/stream/:job_id",
            get(super::stream_analysis_status),
        )
}
