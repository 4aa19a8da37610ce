//! HTTP error responses.
//!
//! Every error leaves the server as `{"status": "error", "message": "…"}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::LabelError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::BadRequest(format!("Invalid upload: {e}"))
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Label(e) => match e {
                LabelError::Validation(_) | LabelError::Image(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                LabelError::PrinterNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                LabelError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()),
                LabelError::Printer(_) | LabelError::Render(_) | LabelError::Batch { .. } => {
                    tracing::error!(error = %e, "print request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
                LabelError::Config(_) | LabelError::Io(_) => {
                    tracing::error!(error = %e, "internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({"status": "error", "message": message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(LabelError::Validation("x".into())), StatusCode::BAD_REQUEST),
            (ApiError::from(LabelError::Conflict("x".into())), StatusCode::CONFLICT),
            (ApiError::from(LabelError::PrinterNotFound("x".into())), StatusCode::NOT_FOUND),
            (ApiError::from(LabelError::Printer("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::from(LabelError::Batch { index: Some(0), message: "x".into() }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_and_message().0, status);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(LabelError::Io(std::io::Error::other("/secret/path")));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_printer_failure_message_is_exposed() {
        let err = ApiError::from(LabelError::Printer("tape jam".into()));
        assert_eq!(err.status_and_message().1, "Print failed: tape jam");
    }
}
