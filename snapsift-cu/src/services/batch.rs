//! Sequential batch scoring driver
//!
//! **[CUR-RL-010]** The scoring capability enforces a hard external rate
//! limit, so items are scored strictly one at a time with a mandatory delay
//! between calls. The video floor is much larger than the photo floor: the
//! pro model has a per-minute quota. Sequential pacing also keeps per-item
//! failures isolated; one bad item never aborts the batch.

use std::time::Duration;

use tracing::info;

use crate::models::{MediaItem, MediaKind, Verdict};
use crate::services::scorer::ItemScorer;

/// Floor between photo scoring calls
const PHOTO_CALL_DELAY: Duration = Duration::from_millis(100);

/// Floor between video scoring calls (pro model quota: ~2/minute)
const VIDEO_CALL_DELAY: Duration = Duration::from_secs(30);

/// Progress after each scored item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Items scored so far (1-based)
    pub current: usize,
    /// Batch size
    pub total: usize,
    /// round(current / total * 100)
    pub percentage: u32,
}

/// Drives an [`ItemScorer`] over an ordered batch
#[derive(Debug, Clone, Copy)]
pub struct BatchScorer {
    photo_delay: Duration,
    video_delay: Duration,
}

impl BatchScorer {
    pub fn new() -> Self {
        Self {
            photo_delay: PHOTO_CALL_DELAY,
            video_delay: VIDEO_CALL_DELAY,
        }
    }

    /// Override the pacing floors (tests, alternate quotas)
    pub fn with_delays(photo_delay: Duration, video_delay: Duration) -> Self {
        Self {
            photo_delay,
            video_delay,
        }
    }

    fn delay_for(&self, kind: MediaKind) -> Duration {
        match kind {
            MediaKind::Photo => self.photo_delay,
            MediaKind::Video => self.video_delay,
        }
    }

    /// Score every item in order, one verdict per item
    ///
    /// Item *i+1* is not submitted until item *i*'s verdict is in hand.
    /// `on_progress` fires after every item; there is no delay after the
    /// final one.
    pub async fn score_all<F>(
        &self,
        scorer: &dyn ItemScorer,
        items: &[MediaItem],
        kind: MediaKind,
        threshold: u32,
        mut on_progress: F,
    ) -> Vec<Verdict>
    where
        F: FnMut(BatchProgress),
    {
        let total = items.len();
        info!(total = total, kind = ?kind, threshold = threshold, "Starting batch scoring");

        let mut verdicts = Vec::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            let verdict = scorer.score(item, kind, threshold).await;
            verdicts.push(verdict);

            let current = index + 1;
            on_progress(BatchProgress {
                current,
                total,
                percentage: ((current as f64 / total as f64) * 100.0).round() as u32,
            });

            if current < total {
                tokio::time::sleep(self.delay_for(kind)).await;
            }
        }

        let kept = verdicts.iter().filter(|v| v.is_keep()).count();
        info!(kept = kept, total = total, "Batch scoring complete");

        verdicts
    }
}

impl Default for BatchScorer {
    fn default() -> Self {
        Self::new()
    }
}
