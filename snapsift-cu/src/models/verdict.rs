//! Scoring verdicts
//!
//! **[CUR-SC-020]** One Verdict per media item. The scoring client is the
//! sole authority on `recommendation`; downstream code partitions on the
//! returned field and never recomputes it from `score`.

use serde::{Deserialize, Serialize};

use crate::models::MediaItem;

/// Keep/discard recommendation for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Keep,
    Discard,
}

/// Scoring outcome for one media item
///
/// Photo verdicts carry composition/exposure/sharpness/color sub-scores;
/// video verdicts carry stability/excitement/audio plus highlights. Absent
/// sub-scores are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub item_id: String,
    pub filename: String,

    /// Overall score, 0–100
    pub score: u32,
    pub recommendation: Recommendation,
    pub reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excitement: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

impl Verdict {
    /// Degraded verdict for an item whose scoring failed
    ///
    /// **[CUR-SC-030]** Item-level failures never propagate: they become a
    /// discard verdict carrying a diagnostic reason.
    pub fn degraded(item: &MediaItem, score: u32, reason: impl Into<String>) -> Self {
        Self {
            item_id: item.id.clone(),
            filename: item.filename.clone(),
            score,
            recommendation: Recommendation::Discard,
            reason: reason.into(),
            composition: None,
            exposure: None,
            sharpness: None,
            color: None,
            stability: None,
            excitement: None,
            audio: None,
            highlights: None,
        }
    }

    pub fn is_keep(&self) -> bool {
        self.recommendation == Recommendation::Keep
    }
}

/// Rounded mean of the overall scores; 0 for an empty batch
pub fn average_score(verdicts: &[Verdict]) -> u32 {
    if verdicts.is_empty() {
        return 0;
    }

    let sum: u32 = verdicts.iter().map(|v| v.score).sum();
    (sum as f64 / verdicts.len() as f64).round() as u32
}
