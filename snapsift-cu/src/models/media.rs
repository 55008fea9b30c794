//! Media item types shared by the clients and the scoring pipeline

use serde::{Deserialize, Serialize};

/// One photo or video, as listed by the library API or extracted from a
/// share page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Item identifier (library id, or a synthetic `scraped_N` id)
    pub id: String,

    /// Content URL the item bytes are fetched from
    pub base_url: String,

    /// MIME type; scraped items are assumed JPEG
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Display filename
    #[serde(default)]
    pub filename: String,

    /// Pixel width, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Pixel height, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

fn default_mime_type() -> String {
    "image/jpeg".to_string()
}

/// Media kind, selecting the scoring model and rate-limit floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Album contents split by media kind
#[derive(Debug, Clone, Default)]
pub struct MediaInventory {
    pub photos: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
}
