//! Album API handlers: listing and share-link parsing

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use snapsift_common::validate::is_valid_share_url;

use crate::{
    api::bearer_token,
    error::{ApiError, ApiResult},
    models::MediaItem,
    services::{AlbumSummary, PhotosError},
    AppState,
};

/// POST /api/albums/parse request
#[derive(Debug, Deserialize)]
pub struct ParseAlbumRequest {
    pub url: String,
}

/// POST /api/albums/parse response
#[derive(Debug, Serialize)]
pub struct ParseAlbumResponse {
    pub count: usize,
    pub photos: Vec<MediaItem>,
}

/// POST /api/albums/parse
///
/// Extract the photo list from a public share link. The result feeds
/// /api/analysis/start-scraped.
pub async fn parse_shared_album(
    State(state): State<AppState>,
    Json(request): Json<ParseAlbumRequest>,
) -> ApiResult<Json<ParseAlbumResponse>> {
    if !is_valid_share_url(&request.url) {
        return Err(ApiError::BadRequest(
            "invalid share link; expected https://photos.app.goo.gl/...".to_string(),
        ));
    }

    let photos = state
        .scraper
        .extract(&request.url)
        .await
        .map_err(|e| ApiError::Internal(format!("Could not parse share link: {}", e)))?;

    Ok(Json(ParseAlbumResponse {
        count: photos.len(),
        photos,
    }))
}

/// GET /api/albums
///
/// Albums visible to the caller's credential.
pub async fn list_albums(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AlbumSummary>>> {
    let access_token = bearer_token(&headers)?;

    let albums = state
        .photos
        .list_albums(&access_token)
        .await
        .map_err(|e| match e {
            PhotosError::Unauthorized => ApiError::Unauthorized(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(Json(albums))
}

/// Build album routes
pub fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/api/albums", get(list_albums))
        .route("/api/albums/parse", post(parse_shared_album))
}
