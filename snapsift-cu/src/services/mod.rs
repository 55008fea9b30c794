//! Core services: job store, scoring pipeline, orchestration, and the
//! external API clients

pub mod batch;
pub mod curator;
pub mod job_store;
pub mod photos_client;
pub mod scorer;
pub mod scraper;

pub use batch::{BatchProgress, BatchScorer};
pub use curator::{AlbumCurator, CurationOptions};
pub use job_store::{JobStore, JOB_RETENTION, SWEEP_PERIOD};
pub use photos_client::{AlbumSummary, CreatedAlbum, PhotosClient, PhotosError};
pub use scorer::{ItemScorer, ScoreError, VisionScorer};
pub use scraper::{ScrapeError, SharedAlbumScraper};
