//! Final curation report
//!
//! **[CUR-WF-040]** On completion the live-progress shape of a job is
//! replaced wholesale by this report.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::verdict::{average_score, Verdict};

/// The album the job was started from (authenticated mode only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAlbum {
    pub id: String,
    pub name: String,
    pub photo_count: usize,
    pub video_count: usize,
}

/// Per-category analysis summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub total: usize,
    pub analyzed: usize,
    pub selected: usize,
    pub average_score: u32,
}

impl CategorySummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            analyzed: 0,
            selected: 0,
            average_score: 0,
        }
    }

    /// Summarize a scored category
    pub fn from_verdicts(total: usize, verdicts: &[Verdict]) -> Self {
        Self {
            total,
            analyzed: verdicts.len(),
            selected: verdicts.iter().filter(|v| v.is_keep()).count(),
            average_score: average_score(verdicts),
        }
    }
}

/// Photo and video summaries side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub photos: CategorySummary,
    pub videos: CategorySummary,
}

/// Category of a newly materialized album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumCategory {
    Photos,
    Videos,
}

/// A remote album created for the kept items of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlbum {
    pub category: AlbumCategory,
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    pub item_count: usize,
}

/// Final report for a completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationReport {
    pub job_id: Uuid,

    /// Source album metadata; absent in scraped mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_album: Option<SourceAlbum>,

    pub analysis: AnalysisSummary,

    /// Albums materialized for kept items; empty when nothing was kept or
    /// in scraped mode
    pub new_albums: Vec<NewAlbum>,

    /// Wall-clock job duration in milliseconds
    pub processing_time_ms: u64,

    /// Full per-item verdict list; retained in scraped mode only, since
    /// there is no written-back album to inspect afterwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Verdict>>,
}
