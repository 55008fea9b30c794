//! snapsift-cu library interface
//!
//! Exposes the application state, router, and core services for the binary
//! and for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{
    AlbumCurator, BatchScorer, ItemScorer, JobStore, PhotosClient, SharedAlbumScraper,
    VisionScorer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// In-memory job registry **[CUR-ST-010]**
    pub store: JobStore,
    /// Job orchestrator **[CUR-WF-020]**
    pub curator: AlbumCurator,
    /// Photo library client
    pub photos: Arc<PhotosClient>,
    /// Share-link scraper
    pub scraper: Arc<SharedAlbumScraper>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the service: clients, job store, orchestrator
    pub fn new(gemini_api_key: String) -> anyhow::Result<Self> {
        let store = JobStore::new();
        let photos = Arc::new(PhotosClient::new()?);
        let scorer: Arc<dyn ItemScorer> = Arc::new(VisionScorer::new(gemini_api_key)?);
        let scraper = Arc::new(SharedAlbumScraper::new()?);

        let curator = AlbumCurator::new(
            store.clone(),
            photos.clone(),
            scorer,
            BatchScorer::new(),
        );

        Ok(Self {
            store,
            curator,
            photos,
            scraper,
            startup_time: Utc::now(),
        })
    }
}

/// Build the application router
///
/// **[CUR-API-010]** API endpoint routing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analysis_routes())
        .merge(api::album_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
