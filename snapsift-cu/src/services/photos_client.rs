//! Photos library API client
//!
//! **[CUR-PH-010]** Bearer-token client for the remote photo library: album
//! listing/metadata (paginated), album creation, and batch item assignment.
//! Listing failures propagate to the caller; the orchestrator turns them
//! into job-level failures.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{MediaInventory, MediaItem};

const PHOTOS_BASE_URL: &str = "https://photoslibrary.googleapis.com/v1";
const USER_AGENT: &str = "snapsift/0.1.0 (https://github.com/snapsift/snapsift)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ALBUM_PAGE_SIZE: u32 = 50;
const SEARCH_PAGE_SIZE: u32 = 100;

/// API cap on media item ids per batchAdd call
const ADD_ITEMS_CHUNK: usize = 50;

/// Photos client errors
#[derive(Debug, Error)]
pub enum PhotosError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: access token rejected")]
    Unauthorized,

    #[error("Photos API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Album summary for listings and source metadata
#[derive(Debug, Clone, Serialize)]
pub struct AlbumSummary {
    pub id: String,
    pub title: Option<String>,
    pub product_url: Option<String>,
    pub item_count: u64,
    pub cover_url: Option<String>,
}

/// Newly created remote album
#[derive(Debug, Clone)]
pub struct CreatedAlbum {
    pub id: String,
    pub product_url: Option<String>,
}

// Wire types (the remote API speaks camelCase)

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAlbum {
    id: String,
    title: Option<String>,
    product_url: Option<String>,
    /// The API reports this count as a decimal string
    media_items_count: Option<String>,
    cover_photo_base_url: Option<String>,
}

impl ApiAlbum {
    fn into_summary(self) -> AlbumSummary {
        let item_count = self
            .media_items_count
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);

        AlbumSummary {
            id: self.id,
            title: self.title,
            product_url: self.product_url,
            item_count,
            cover_url: self.cover_photo_base_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumsPage {
    #[serde(default)]
    albums: Vec<ApiAlbum>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMediaItem {
    id: String,
    base_url: Option<String>,
    mime_type: Option<String>,
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    media_items: Vec<ApiMediaItem>,
    next_page_token: Option<String>,
}

/// Classify listed items into photos and videos by MIME prefix
fn classify(items: Vec<ApiMediaItem>) -> MediaInventory {
    let mut inventory = MediaInventory::default();

    for api_item in items {
        // Items without a content URL cannot be fetched or scored
        let Some(base_url) = api_item.base_url else {
            debug!(item_id = %api_item.id, "Skipping item without content URL");
            continue;
        };

        let mime_type = api_item
            .mime_type
            .unwrap_or_else(|| "image/jpeg".to_string());
        let is_video = mime_type.starts_with("video/");

        let item = MediaItem {
            id: api_item.id,
            base_url,
            mime_type,
            filename: api_item.filename.unwrap_or_default(),
            width: None,
            height: None,
        };

        if is_video {
            inventory.videos.push(item);
        } else {
            inventory.photos.push(item);
        }
    }

    inventory
}

/// Bearer-token client for the photo library API
pub struct PhotosClient {
    http: reqwest::Client,
    base_url: String,
}

impl PhotosClient {
    pub fn new() -> Result<Self, PhotosError> {
        Self::with_base_url(PHOTOS_BASE_URL.to_string())
    }

    /// Client against a non-default endpoint (tests, proxies)
    pub fn with_base_url(base_url: String) -> Result<Self, PhotosError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PhotosError::Network(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Map error statuses; returns the response for successful calls
    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, PhotosError> {
        let status = response.status();

        if status.as_u16() == 401 {
            return Err(PhotosError::Unauthorized);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PhotosError::Api(status.as_u16(), error_text));
        }

        Ok(response)
    }

    /// All albums visible to the credential, accumulated across pages
    pub async fn list_albums(&self, access_token: &str) -> Result<Vec<AlbumSummary>, PhotosError> {
        let mut albums = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/albums", self.base_url))
                .bearer_auth(access_token)
                .query(&[("pageSize", ALBUM_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| PhotosError::Network(e.to_string()))?;
            let page: AlbumsPage = Self::checked(response)
                .await?
                .json()
                .await
                .map_err(|e| PhotosError::Parse(e.to_string()))?;

            albums.extend(page.albums.into_iter().map(ApiAlbum::into_summary));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = albums.len(), "Album listing complete");
        Ok(albums)
    }

    /// Metadata for one album
    pub async fn get_album(
        &self,
        album_id: &str,
        access_token: &str,
    ) -> Result<AlbumSummary, PhotosError> {
        let response = self
            .http
            .get(format!("{}/albums/{}", self.base_url, album_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| PhotosError::Network(e.to_string()))?;

        let album: ApiAlbum = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| PhotosError::Parse(e.to_string()))?;

        Ok(album.into_summary())
    }

    /// Full item listing of an album, split photo/video
    ///
    /// Pages through the search endpoint until no continuation token is
    /// returned.
    pub async fn get_album_items(
        &self,
        album_id: &str,
        access_token: &str,
    ) -> Result<MediaInventory, PhotosError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut body = serde_json::json!({
                "albumId": album_id,
                "pageSize": SEARCH_PAGE_SIZE,
            });
            if let Some(token) = &page_token {
                body["pageToken"] = serde_json::Value::String(token.clone());
            }

            let response = self
                .http
                .post(format!("{}/mediaItems:search", self.base_url))
                .bearer_auth(access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| PhotosError::Network(e.to_string()))?;
            let page: SearchPage = Self::checked(response)
                .await?
                .json()
                .await
                .map_err(|e| PhotosError::Parse(e.to_string()))?;

            items.extend(page.media_items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let inventory = classify(items);
        info!(
            album_id = album_id,
            photos = inventory.photos.len(),
            videos = inventory.videos.len(),
            "Album item listing complete"
        );
        Ok(inventory)
    }

    /// Create a new remote album
    pub async fn create_album(
        &self,
        title: &str,
        access_token: &str,
    ) -> Result<CreatedAlbum, PhotosError> {
        let response = self
            .http
            .post(format!("{}/albums", self.base_url))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "album": { "title": title } }))
            .send()
            .await
            .map_err(|e| PhotosError::Network(e.to_string()))?;

        let album: ApiAlbum = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| PhotosError::Parse(e.to_string()))?;

        info!(album_id = %album.id, title = title, "Created album");
        Ok(CreatedAlbum {
            id: album.id,
            product_url: album.product_url,
        })
    }

    /// Assign items to an album in sequential chunks
    ///
    /// **[CUR-PH-020]** The API caps ids per call, so the list is split into
    /// chunks of 50 and submitted one after another. The returned count is
    /// purely diagnostic; a later chunk's failure is returned as-is with no
    /// retry and no rollback of chunks already applied.
    pub async fn add_items(
        &self,
        album_id: &str,
        item_ids: &[String],
        access_token: &str,
    ) -> Result<usize, PhotosError> {
        let mut added = 0;

        for chunk in item_ids.chunks(ADD_ITEMS_CHUNK) {
            let response = self
                .http
                .post(format!(
                    "{}/albums/{}:batchAddMediaItems",
                    self.base_url, album_id
                ))
                .bearer_auth(access_token)
                .json(&serde_json::json!({ "mediaItemIds": chunk }))
                .send()
                .await
                .map_err(|e| PhotosError::Network(e.to_string()))?;

            Self::checked(response).await?;
            added += chunk.len();

            debug!(
                album_id = album_id,
                added = added,
                total = item_ids.len(),
                "Item batch assigned"
            );
        }

        Ok(added)
    }
}
