//! Data model for the curation service

mod job;
mod media;
mod report;
mod verdict;

pub use job::{Job, JobSnapshot, JobState, Stage, StageMeta};
pub use media::{MediaInventory, MediaItem, MediaKind};
pub use report::{AlbumCategory, AnalysisSummary, CategorySummary, CurationReport, NewAlbum, SourceAlbum};
pub use verdict::{average_score, Recommendation, Verdict};
