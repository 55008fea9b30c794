//! Public share-link scraper
//!
//! **[CUR-SCR-010]** One-shot, stateless extraction of media URLs from a
//! public share page. The page inlines its data in script bodies; content
//! URLs appear as `"<url>", width, height` triples. This is a heuristic —
//! the markup can change — but it has been stable in practice.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::MediaItem;

/// The share page serves the data-bearing markup to desktop browsers
const SCRAPE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Items at or below this edge length are avatars or icons, not content
const MIN_DIMENSION: u32 = 100;

static PHOTO_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(https://lh3\.googleusercontent\.com/[^"]+)",\s*(\d+),\s*(\d+)"#)
        .expect("photo data pattern is valid")
});

/// Scraper errors
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Share page returned status {0}")]
    Status(u16),
}

/// Extracts the photo list from a public share link
pub struct SharedAlbumScraper {
    http: reqwest::Client,
}

impl SharedAlbumScraper {
    pub fn new() -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .user_agent(SCRAPE_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        Ok(Self { http })
    }

    /// Fetch the share page (redirects followed) and extract its photos
    ///
    /// An empty result is valid — it usually means the markup changed or
    /// the link is not public.
    pub async fn extract(&self, share_url: &str) -> Result<Vec<MediaItem>, ScrapeError> {
        info!(url = share_url, "Extracting shared album");

        let response = self
            .http
            .get(share_url)
            .send()
            .await
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        let photos = extract_photos(&html);
        if photos.is_empty() {
            warn!(url = share_url, "No photos found in share page; markup may have changed");
        } else {
            info!(count = photos.len(), "Share page extraction complete");
        }

        Ok(photos)
    }
}

/// Pull `"url", width, height` triples out of the page, filter icon-sized
/// entries, de-duplicate by URL
fn extract_photos(html: &str) -> Vec<MediaItem> {
    let mut photos = Vec::new();
    let mut seen_urls = HashSet::new();

    for captures in PHOTO_DATA_RE.captures_iter(html) {
        let url = &captures[1];
        let (Ok(width), Ok(height)) = (captures[2].parse::<u32>(), captures[3].parse::<u32>())
        else {
            continue;
        };

        if width <= MIN_DIMENSION || height <= MIN_DIMENSION {
            continue;
        }
        if !seen_urls.insert(url.to_string()) {
            continue;
        }

        let index = photos.len() + 1;
        photos.push(MediaItem {
            id: format!("scraped_{}", index),
            base_url: url.to_string(),
            mime_type: "image/jpeg".to_string(),
            filename: format!("photo_{}.jpg", index),
            width: Some(width),
            height: Some(height),
        });
    }

    photos
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <html><body><script>
        AF_initDataCallback({data: [
            ["https://lh3.googleusercontent.com/pw/photo-one", 4032, 3024],
            ["https://lh3.googleusercontent.com/pw/avatar", 64, 64],
            ["https://lh3.googleusercontent.com/pw/photo-two", 1920, 1080],
            ["https://lh3.googleusercontent.com/pw/photo-one", 4032, 3024]
        ]});
        </script></body></html>
    "#;

    #[test]
    fn extracts_filters_and_deduplicates() {
        let photos = extract_photos(SAMPLE_PAGE);

        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].id, "scraped_1");
        assert_eq!(photos[0].filename, "photo_1.jpg");
        assert_eq!(
            photos[0].base_url,
            "https://lh3.googleusercontent.com/pw/photo-one"
        );
        assert_eq!(photos[0].width, Some(4032));
        assert_eq!(photos[1].id, "scraped_2");
        assert_eq!(
            photos[1].base_url,
            "https://lh3.googleusercontent.com/pw/photo-two"
        );
    }

    #[test]
    fn icon_sized_entries_are_dropped() {
        let html = r#""https://lh3.googleusercontent.com/pw/icon", 100, 2000"#;
        assert!(extract_photos(html).is_empty());

        let html = r#""https://lh3.googleusercontent.com/pw/ok", 101, 101"#;
        assert_eq!(extract_photos(html).len(), 1);
    }

    #[test]
    fn foreign_hosts_are_ignored() {
        let html = r#""https://example.com/image.jpg", 1920, 1080"#;
        assert!(extract_photos(html).is_empty());
    }

    #[test]
    fn empty_page_yields_empty_list() {
        assert!(extract_photos("<html></html>").is_empty());
    }
}
