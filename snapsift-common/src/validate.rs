//! Request validation helpers
//!
//! Shared by the HTTP handlers so that malformed requests are rejected
//! synchronously, before any job is created.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shape of a public share link (`https://photos.app.goo.gl/<token>`)
static SHARE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://photos\.app\.goo\.gl/[a-zA-Z0-9]+$")
        .expect("share URL pattern is valid")
});

/// Validate an album identifier: non-empty, bounded length
pub fn is_valid_album_id(album_id: &str) -> bool {
    !album_id.is_empty() && album_id.len() < 200
}

/// Validate a scoring threshold (0–100 inclusive)
pub fn is_valid_threshold(threshold: u32) -> bool {
    threshold <= 100
}

/// Validate a public share link
pub fn is_valid_share_url(url: &str) -> bool {
    SHARE_URL_RE.is_match(url)
}

/// Strip markup-significant characters and bound the length of free-form input
pub fn sanitize_input(input: &str) -> String {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect();

    cleaned.chars().take(1000).collect()
}
