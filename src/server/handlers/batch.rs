//! Batch print handlers: start with a progress stream, cancel by job id.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

use crate::batch::{BatchEvent, BatchRequest};

use super::super::error::ApiResult;
use super::super::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(default)]
    pub job_id: String,
}

/// POST /api/batch-print - Start a batch and stream its events.
///
/// Each event is sent as `data: <json>`. Closing the stream stops the job at
/// its next event.
pub async fn start(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let sink = state.printers.resolve(req.settings.printer_id())?;
    let handle = state.batches.start(req, sink)?;

    let stream = ReceiverStream::new(handle.events).map(|event| Ok::<_, Infallible>(sse_event(&event)));
    Ok(Sse::new(stream))
}

fn sse_event(event: &BatchEvent) -> Event {
    match serde_json::to_string(event) {
        Ok(json) => Event::default().data(json),
        Err(e) => Event::default().data(json!({"event": "error", "message": e.to_string()}).to_string()),
    }
}

/// POST /api/batch-print/cancel - Signal a running batch to stop.
///
/// Always succeeds; unknown or finished jobs are ignored.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> impl IntoResponse {
    if let Ok(Json(req)) = payload {
        state.batches.cancel(&req.job_id);
    }
    Json(json!({"status": "ok"}))
}
