//! Image upload and retrieval.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::error::LabelError;
use crate::uploads::{is_safe_name, ImageStore};

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// POST /api/upload-image - Store an image for use by image widgets.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        if field.file_name().is_some_and(str::is_empty) {
            return Err(ApiError::BadRequest("No file selected".to_string()));
        }
        image_data = Some(field.bytes().await?.to_vec());
        break;
    }

    let bytes = image_data
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let uploads = state.uploads.clone();
    let filename = tokio::task::spawn_blocking(move || uploads.save(&bytes))
        .await
        .map_err(|e| ApiError::from(LabelError::Render(format!("upload task failed: {e}"))))??;

    Ok(Json(UploadResponse { filename }))
}

/// GET /api/uploads/:filename - Serve a stored upload.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !is_safe_name(&filename) {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }

    let uploads = state.uploads.clone();
    let name = filename.clone();
    let bytes = tokio::task::spawn_blocking(move || uploads.load(&name))
        .await
        .map_err(|e| ApiError::from(LabelError::Render(format!("upload task failed: {e}"))))?
        .map_err(LabelError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("Image not found: {filename}")))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
