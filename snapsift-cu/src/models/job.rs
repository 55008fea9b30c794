//! Curation job state machine
//!
//! **[CUR-WF-010]** A job is created in `processing`, advances through
//! stages with monotonically non-decreasing progress, and ends in exactly
//! one of two terminal states:
//!
//! processing → completed (report replaces the live-progress shape)
//! processing → failed    (error message, progress reset to 0)
//!
//! Snapshots serialize internally tagged on `status`, so clients branch on
//! that field first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::CurationReport;

/// Descriptive label for the job's current phase; advisory only, never
/// authoritative for control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetching,
    Analyzing,
    AnalyzingPhotos,
    AnalyzingVideos,
    CreatingAlbums,
    Completed,
}

/// Stage metadata accumulated over the job's life
///
/// Fields appear as stages progress; a merge overwrites only the fields the
/// patch carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_photos: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_videos: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_photo: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_video: Option<usize>,
}

impl StageMeta {
    /// Shallow-merge: `Some` fields of the patch overwrite, `None` fields
    /// preserve the existing value
    pub fn merge(&mut self, patch: StageMeta) {
        if patch.album_name.is_some() {
            self.album_name = patch.album_name;
        }
        if patch.total_photos.is_some() {
            self.total_photos = patch.total_photos;
        }
        if patch.total_videos.is_some() {
            self.total_videos = patch.total_videos;
        }
        if patch.current_photo.is_some() {
            self.current_photo = patch.current_photo;
        }
        if patch.current_video.is_some() {
            self.current_video = patch.current_video;
        }
    }
}

/// **[CUR-WF-010]** Job state, tagged on `status` in the serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Processing {
        stage: Stage,
        progress: f64,
        #[serde(flatten)]
        meta: StageMeta,
    },
    Completed {
        progress: f64,
        #[serde(flatten)]
        report: CurationReport,
    },
    Failed {
        progress: f64,
        error: String,
    },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }

    pub fn progress(&self) -> f64 {
        match self {
            JobState::Processing { progress, .. }
            | JobState::Completed { progress, .. }
            | JobState::Failed { progress, .. } => *progress,
        }
    }
}

/// One tracked unit of asynchronous curation work
#[derive(Debug, Clone)]
pub struct Job {
    /// Opaque lookup key, generated at creation, immutable
    pub id: Uuid,

    /// Creation timestamp; drives processing-time and retention decisions
    pub started_at: DateTime<Utc>,

    pub state: JobState,
}

impl Job {
    /// New job in the initial `processing` state
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: JobState::Processing {
                stage: Stage::Fetching,
                progress: 0.0,
                meta: StageMeta::default(),
            },
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id,
            started_at: self.started_at,
            state: self.state.clone(),
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a job, as served to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub job_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub state: JobState,
}

impl JobSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }
}
