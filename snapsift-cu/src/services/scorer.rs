//! Vision scoring client
//!
//! **[CUR-SC-010]** Scores one media item at a time against an external
//! generative vision API. The public contract never raises: every internal
//! failure (content fetch, API error, unparsable model output) is converted
//! into a degraded discard verdict, so the batch driver needs no per-item
//! failure handling.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{MediaItem, MediaKind, Recommendation, Verdict};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PHOTO_MODEL: &str = "gemini-1.5-flash";
const VIDEO_MODEL: &str = "gemini-1.5-pro";
const USER_AGENT: &str = "snapsift/0.1.0 (https://github.com/snapsift/snapsift)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// First `{...}` block in the model text; models wrap the payload in prose
/// often enough that strict JSON parsing of the whole text is useless
static JSON_PAYLOAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("payload pattern is valid"));

/// Scoring client errors (internal; converted to degraded verdicts at the
/// public boundary)
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Scoring API error {0}: {1}")]
    Api(u16, String),

    #[error("Empty model response")]
    EmptyResponse,
}

/// Seam between the batch driver and the scoring capability
#[async_trait]
pub trait ItemScorer: Send + Sync {
    /// Score one item; must always return a usable verdict
    async fn score(&self, item: &MediaItem, kind: MediaKind, threshold: u32) -> Verdict;
}

/// Assessment payload parsed out of the model text
#[derive(Debug, Deserialize)]
struct RawAssessment {
    #[serde(default)]
    score: u32,
    recommendation: Option<Recommendation>,
    reason: Option<String>,
    composition: Option<u32>,
    exposure: Option<u32>,
    sharpness: Option<u32>,
    color: Option<u32>,
    stability: Option<u32>,
    excitement: Option<u32>,
    audio: Option<u32>,
    highlights: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the generative vision API
///
/// Photos are scored with the flash model; videos with the pro model, from
/// the `=d` thumbnail of the item (a playable stream is not fetchable for
/// share-page content, and thumbnail scoring is sufficient for keepability).
pub struct VisionScorer {
    http: reqwest::Client,
    api_key: String,
}

impl VisionScorer {
    pub fn new(api_key: String) -> Result<Self, ScoreError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        Ok(Self { http, api_key })
    }

    async fn try_score(
        &self,
        item: &MediaItem,
        kind: MediaKind,
        threshold: u32,
    ) -> Result<Verdict, ScoreError> {
        let (model, content_url, mime_type) = match kind {
            MediaKind::Photo => (PHOTO_MODEL, item.base_url.clone(), item.mime_type.clone()),
            MediaKind::Video => (
                VIDEO_MODEL,
                format!("{}=d", item.base_url),
                "image/jpeg".to_string(),
            ),
        };

        let bytes = self.fetch_content(&content_url).await?;
        let inline_data = BASE64.encode(bytes);
        let prompt = build_prompt(kind, threshold);

        let text = self.generate(model, &prompt, &inline_data, &mime_type).await?;

        Ok(match extract_assessment(&text) {
            Some(raw) => build_verdict(item, raw),
            None => {
                warn!(item_id = %item.id, "Model response had no parseable payload");
                Verdict::degraded(item, 50, "analysis response not parseable")
            }
        })
    }

    /// Fetch the item bytes for inline submission
    async fn fetch_content(&self, url: &str) -> Result<Vec<u8>, ScoreError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoreError::Api(
                status.as_u16(),
                "content fetch failed".to_string(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// One generateContent call; returns the first text part
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        inline_data: &str,
        mime_type: &str,
    ) -> Result<String, ScoreError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": mime_type, "data": inline_data } },
                ]
            }]
        });

        debug!(model = model, "Querying vision scoring API");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScoreError::Api(status.as_u16(), error_text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or(ScoreError::EmptyResponse)
    }
}

#[async_trait]
impl ItemScorer for VisionScorer {
    /// **[CUR-SC-030]** Never raises: failures become discard verdicts
    async fn score(&self, item: &MediaItem, kind: MediaKind, threshold: u32) -> Verdict {
        match self.try_score(item, kind, threshold).await {
            Ok(verdict) => {
                debug!(
                    item_id = %item.id,
                    score = verdict.score,
                    recommendation = ?verdict.recommendation,
                    "Item scored"
                );
                verdict
            }
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "Scoring failed, discarding item");
                Verdict::degraded(item, 0, e.to_string())
            }
        }
    }
}

/// Curator prompt with the per-kind rubric and the caller's threshold
fn build_prompt(kind: MediaKind, threshold: u32) -> String {
    match kind {
        MediaKind::Photo => format!(
            "You are a professional album curator selecting photos worth keeping as memories.\n\
             \n\
             Scoring criteria (total 100):\n\
             1. Composition (30%): clear subject, balanced frame (comfortable framing is enough, \
             golden-ratio perfection is not required)\n\
             2. Exposure (25%): normal brightness, visible detail\n\
             3. Sharpness (25%): sharp subject (slight background blur is acceptable)\n\
             4. Color (20%): natural color\n\
             \n\
             Guidance: excellent (90-100) for standout shots; good (80-89) for clear everyday \
             photos with an obvious subject; fair (60-79) for slightly blurry or plainly composed \
             but still memorable shots; poor (0-59) for badly blurred, all-black/all-white or \
             unrecognizable frames. Give clear everyday photos with an obvious subject 85 or \
             above; do not apply competition-grade standards.\n\
             \n\
             Reply in JSON:\n\
             {{\"score\": 85, \"composition\": 28, \"exposure\": 22, \"sharpness\": 20, \
             \"color\": 15, \"recommendation\": \"keep\", \"reason\": \"short explanation\"}}\n\
             \n\
             recommendation must be \"keep\" or \"discard\". \
             If score >= {}, recommendation must be \"keep\", otherwise \"discard\".",
            threshold
        ),
        MediaKind::Video => format!(
            "You are a professional album curator selecting videos worth keeping as memories.\n\
             \n\
             Scoring criteria (total 100):\n\
             1. Motion quality (40%): frame stability, smoothness (slight handheld shake is \
             acceptable for casual footage)\n\
             2. Highlights (35%): whether the clip contains interesting or important moments\n\
             3. Audio quality (25%): speech clarity, background noise\n\
             \n\
             Guidance: excellent (90-100) for stable, engaging clips; good (80-89) for clear, \
             memorable everyday footage; fair (60-79) for slightly shaky or ordinary content; \
             poor (0-59) for badly shaken, blurred or meaningless clips. Give clear, memorable \
             footage 80 or above.\n\
             \n\
             Reply in JSON:\n\
             {{\"score\": 85, \"stability\": 35, \"excitement\": 30, \"audio\": 20, \
             \"recommendation\": \"keep\", \"highlights\": [\"moment description\"], \
             \"reason\": \"short explanation\"}}\n\
             \n\
             recommendation must be \"keep\" or \"discard\". \
             If score >= {}, recommendation must be \"keep\", otherwise \"discard\".",
            threshold
        ),
    }
}

/// Pull the first well-formed assessment payload out of the model text
fn extract_assessment(text: &str) -> Option<RawAssessment> {
    let payload = JSON_PAYLOAD_RE.find(text)?;
    serde_json::from_str(payload.as_str()).ok()
}

fn build_verdict(item: &MediaItem, raw: RawAssessment) -> Verdict {
    Verdict {
        item_id: item.id.clone(),
        filename: item.filename.clone(),
        score: raw.score.min(100),
        recommendation: raw.recommendation.unwrap_or(Recommendation::Discard),
        reason: raw.reason.unwrap_or_default(),
        composition: raw.composition,
        exposure: raw.exposure,
        sharpness: raw.sharpness,
        color: raw.color,
        stability: raw.stability,
        excitement: raw.excitement,
        audio: raw.audio,
        highlights: raw.highlights,
    }
}
