//! Server-Sent Events (SSE) for per-job progress streaming
//!
//! **[CUR-SSE-010]** Push delivery over the same store read path as
//! polling: a per-connection 1-second timer re-reads the snapshot and
//! emits it. The stream closes after a terminal snapshot, or after one
//! not-found notice for an unknown id. A client disconnect drops the
//! stream — and with it the timer — immediately.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;

/// Snapshot emission period
const STREAM_PERIOD: Duration = Duration::from_secs(1);

/// GET /api/analysis/stream/{job_id}
pub async fn stream_analysis_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(job_id = %job_id, "SSE client connected");

    let store = state.store.clone();
    let stream = async_stream::stream! {
        loop {
            tokio::time::sleep(STREAM_PERIOD).await;

            match store.get(job_id) {
                None => {
                    // One final not-found notice, then close
                    yield Ok(Event::default()
                        .event("error")
                        .data(r#"{"error":"job not found"}"#));
                    info!(job_id = %job_id, "SSE stream closing: job unknown");
                    break;
                }
                Some(snapshot) => {
                    let terminal = snapshot.is_terminal();

                    match serde_json::to_string(&snapshot) {
                        Ok(json) => {
                            yield Ok(Event::default().event("status").data(json));
                        }
                        Err(e) => {
                            warn!(job_id = %job_id, error = %e, "Failed to serialize snapshot");
                        }
                    }

                    if terminal {
                        info!(job_id = %job_id, "SSE stream closing after terminal snapshot");
                        break;
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
