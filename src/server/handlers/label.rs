//! Single-label print and preview handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::LabelError;
use crate::label::{LabelSettings, Widget};
use crate::render::ComposeMode;

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;

/// Request body shared by print and preview.
#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub settings: LabelSettings,
}

/// POST /api/print - Render and print one label.
pub async fn print(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LabelRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let sink = state.printers.resolve(req.settings.printer_id())?;
    state.batches.print_single(req.widgets, req.settings, sink).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Label printed successfully",
    })))
}

/// POST /api/preview - Render a label to PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LabelRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    if req.widgets.is_empty() {
        return Err(LabelError::Validation("No widgets provided".to_string()).into());
    }

    let renderers = state.renderers().clone();
    let png = tokio::task::spawn_blocking(move || {
        renderers
            .render_label(&req.widgets, &req.settings, ComposeMode::Preview)?
            .to_png()
    })
    .await
    .map_err(|e| ApiError::from(LabelError::Render(format!("render task failed: {e}"))))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
