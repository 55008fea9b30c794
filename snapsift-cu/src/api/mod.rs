//! HTTP API handlers for snapsift-cu
//!
//! **[CUR-API-010]** Thin request/response forwarding over the core; all
//! control flow lives in the services.

pub mod albums;
pub mod analysis;
pub mod health;
pub mod sse;

pub use albums::album_routes;
pub use analysis::analysis_routes;
pub use health::health_routes;
pub use sse::stream_analysis_status;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::{error::ApiError, ApiResult, AppState};

/// Extract the bearer credential from the Authorization header
///
/// Tokens are opaque here; exchange and scope verification belong to the
/// external auth provider.
pub(crate) fn bearer_token(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
}

/// GET /events - general connection-status stream
pub async fn event_stream(
    State(_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    snapsift_common::sse::create_heartbeat_sse_stream("snapsift-cu")
}
