//! Curation job orchestration
//!
//! **[CUR-WF-020]** Coordinates a job from request acceptance to its
//! terminal state: fetch the album listing, drive the batch scorer over
//! photos and videos, partition by recommendation, optionally materialize
//! new remote albums, and write the final report into the job store.
//!
//! Two operating modes share the state machine:
//! - authenticated: remote listing, photo + video pipelines, album
//!   write-back, staged progress ranges
//! - scraped: caller-supplied photo list, no write-back, single 0–100
//!   progress range, verdicts retained in the report
//!
//! Both modes create the job record synchronously and spawn the work, so
//! the returned id is valid for lookup before the first update lands.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{
    AlbumCategory, AnalysisSummary, CategorySummary, CurationReport, MediaItem, MediaKind,
    NewAlbum, SourceAlbum, Stage, StageMeta, Verdict,
};
use crate::services::batch::BatchScorer;
use crate::services::job_store::JobStore;
use crate::services::photos_client::PhotosClient;
use crate::services::scorer::ItemScorer;

/// Album title fallback when the remote album has none
const DEFAULT_ALBUM_NAME: &str = "My_Album";

/// Scoring thresholds for one curation request
#[derive(Debug, Clone, Copy)]
pub struct CurationOptions {
    pub photo_threshold: u32,
    pub video_threshold: u32,
}

impl Default for CurationOptions {
    fn default() -> Self {
        Self {
            photo_threshold: 85,
            video_threshold: 80,
        }
    }
}

/// Orchestrates curation jobs against the job store
#[derive(Clone)]
pub struct AlbumCurator {
    store: JobStore,
    photos: Arc<PhotosClient>,
    scorer: Arc<dyn ItemScorer>,
    batch: BatchScorer,
}

impl AlbumCurator {
    pub fn new(
        store: JobStore,
        photos: Arc<PhotosClient>,
        scorer: Arc<dyn ItemScorer>,
        batch: BatchScorer,
    ) -> Self {
        Self {
            store,
            photos,
            scorer,
            batch,
        }
    }

    /// Start an authenticated-mode job; returns the id immediately
    pub fn start_album_curation(
        &self,
        album_id: String,
        access_token: String,
        options: CurationOptions,
    ) -> Uuid {
        let job_id = self.store.create().job_id;

        let curator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = curator
                .run_album_job(job_id, &album_id, &access_token, options)
                .await
            {
                error!(job_id = %job_id, error = %e, "Album curation failed");
                curator.store.fail(job_id, e.to_string());
            }
        });

        job_id
    }

    /// Start a scraped-mode job over a caller-supplied photo list; returns
    /// the id immediately
    pub fn start_scraped_curation(
        &self,
        photos: Vec<MediaItem>,
        options: CurationOptions,
    ) -> Uuid {
        let job_id = self.store.create().job_id;

        let curator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = curator.run_scraped_job(job_id, photos, options).await {
                error!(job_id = %job_id, error = %e, "Scraped curation failed");
                curator.store.fail(job_id, e.to_string());
            }
        });

        job_id
    }

    /// Authenticated-mode workflow
    ///
    /// Progress ranges: metadata 10, listing 20, photo scoring 20–60,
    /// video scoring 60–80, album creation 85, completion 100.
    async fn run_album_job(
        &self,
        job_id: Uuid,
        album_id: &str,
        access_token: &str,
        options: CurationOptions,
    ) -> anyhow::Result<()> {
        info!(job_id = %job_id, album_id = album_id, "Starting album curation");

        let album = self.photos.get_album(album_id, access_token).await?;
        let album_name = album
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_ALBUM_NAME.to_string());

        self.store.advance(
            job_id,
            Stage::Fetching,
            10.0,
            StageMeta {
                album_name: Some(album_name.clone()),
                ..StageMeta::default()
            },
        );

        let inventory = self.photos.get_album_items(album_id, access_token).await?;
        let photo_count = inventory.photos.len();
        let video_count = inventory.videos.len();

        info!(
            job_id = %job_id,
            photos = photo_count,
            videos = video_count,
            "Album inventory fetched"
        );

        self.store.advance(
            job_id,
            Stage::Analyzing,
            20.0,
            StageMeta {
                total_photos: Some(photo_count),
                total_videos: Some(video_count),
                ..StageMeta::default()
            },
        );

        let photo_results = if inventory.photos.is_empty() {
            Vec::new()
        } else {
            let store = self.store.clone();
            self.batch
                .score_all(
                    self.scorer.as_ref(),
                    &inventory.photos,
                    MediaKind::Photo,
                    options.photo_threshold,
                    |p| {
                        store.advance(
                            job_id,
                            Stage::AnalyzingPhotos,
                            20.0 + f64::from(p.percentage) * 0.4,
                            StageMeta {
                                current_photo: Some(p.current),
                                total_photos: Some(p.total),
                                ..StageMeta::default()
                            },
                        );
                    },
                )
                .await
        };

        let video_results = if inventory.videos.is_empty() {
            Vec::new()
        } else {
            let store = self.store.clone();
            self.batch
                .score_all(
                    self.scorer.as_ref(),
                    &inventory.videos,
                    MediaKind::Video,
                    options.video_threshold,
                    |p| {
                        store.advance(
                            job_id,
                            Stage::AnalyzingVideos,
                            60.0 + f64::from(p.percentage) * 0.2,
                            StageMeta {
                                current_video: Some(p.current),
                                total_videos: Some(p.total),
                                ..StageMeta::default()
                            },
                        );
                    },
                )
                .await
        };

        let selected_photos: Vec<&Verdict> =
            photo_results.iter().filter(|v| v.is_keep()).collect();
        let selected_videos: Vec<&Verdict> =
            video_results.iter().filter(|v| v.is_keep()).collect();

        info!(
            job_id = %job_id,
            photos_kept = selected_photos.len(),
            photos_total = photo_count,
            videos_kept = selected_videos.len(),
            videos_total = video_count,
            "Selection complete"
        );

        self.store
            .advance(job_id, Stage::CreatingAlbums, 85.0, StageMeta::default());

        // A category with no kept items creates no album
        let mut new_albums = Vec::new();
        if !selected_photos.is_empty() {
            new_albums.push(
                self.materialize_album(
                    AlbumCategory::Photos,
                    &album_name,
                    &selected_photos,
                    access_token,
                )
                .await?,
            );
        }
        if !selected_videos.is_empty() {
            new_albums.push(
                self.materialize_album(
                    AlbumCategory::Videos,
                    &album_name,
                    &selected_videos,
                    access_token,
                )
                .await?,
            );
        }

        let report = CurationReport {
            job_id,
            original_album: Some(SourceAlbum {
                id: album_id.to_string(),
                name: album_name,
                photo_count,
                video_count,
            }),
            analysis: AnalysisSummary {
                photos: CategorySummary::from_verdicts(photo_count, &photo_results),
                videos: CategorySummary::from_verdicts(video_count, &video_results),
            },
            new_albums,
            processing_time_ms: self.elapsed_ms(job_id),
            results: None,
        };

        self.store.complete(job_id, report);
        info!(job_id = %job_id, "Album curation complete");

        Ok(())
    }

    /// Scraped-mode workflow: photos only, no write-back, verdicts retained
    async fn run_scraped_job(
        &self,
        job_id: Uuid,
        photos: Vec<MediaItem>,
        options: CurationOptions,
    ) -> anyhow::Result<()> {
        let total = photos.len();
        info!(job_id = %job_id, photos = total, "Starting scraped curation");

        self.store.advance(
            job_id,
            Stage::Analyzing,
            0.0,
            StageMeta {
                total_photos: Some(total),
                ..StageMeta::default()
            },
        );

        let results = if photos.is_empty() {
            Vec::new()
        } else {
            let store = self.store.clone();
            self.batch
                .score_all(
                    self.scorer.as_ref(),
                    &photos,
                    MediaKind::Photo,
                    options.photo_threshold,
                    |p| {
                        // Completion owns progress 100; the batch tops out
                        // just below it
                        store.advance(
                            job_id,
                            Stage::AnalyzingPhotos,
                            f64::from(p.percentage).min(99.0),
                            StageMeta {
                                current_photo: Some(p.current),
                                total_photos: Some(p.total),
                                ..StageMeta::default()
                            },
                        );
                    },
                )
                .await
        };

        let report = CurationReport {
            job_id,
            original_album: None,
            analysis: AnalysisSummary {
                photos: CategorySummary::from_verdicts(total, &results),
                videos: CategorySummary::empty(),
            },
            new_albums: Vec::new(),
            processing_time_ms: self.elapsed_ms(job_id),
            results: Some(results),
        };

        self.store.complete(job_id, report);
        info!(job_id = %job_id, "Scraped curation complete");

        Ok(())
    }

    /// Create a remote album for one category and assign its kept items
    async fn materialize_album(
        &self,
        category: AlbumCategory,
        album_name: &str,
        kept: &[&Verdict],
        access_token: &str,
    ) -> anyhow::Result<NewAlbum> {
        let name = match category {
            AlbumCategory::Photos => format!("Selected_Photos_from_{}", album_name),
            AlbumCategory::Videos => format!("Selected_Videos_from_{}", album_name),
        };

        let created = self.photos.create_album(&name, access_token).await?;

        let item_ids: Vec<String> = kept.iter().map(|v| v.item_id.clone()).collect();
        let added = self
            .photos
            .add_items(&created.id, &item_ids, access_token)
            .await?;

        Ok(NewAlbum {
            category,
            name,
            id: created.id,
            product_url: created.product_url,
            item_count: added,
        })
    }

    fn elapsed_ms(&self, job_id: Uuid) -> u64 {
        self.store
            .get(job_id)
            .map(|s| (Utc::now() - s.started_at).num_milliseconds().max(0) as u64)
            .unwrap_or(0)
    }
}
