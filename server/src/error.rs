//! error.rs
//! Pipeline failures -> JSON error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use sheetxml_core::pipeline::Failure;
use sheetxml_core::types::{ConvertError, ErrorKind};
use tokio::task::JoinError;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Internal text; only set when debug output is enabled.
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    error_code: &'a str,
    message: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidFormat
        | ErrorKind::EmptySource
        | ErrorKind::TagSanitization
        | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::SchemaMismatch | ErrorKind::TypeCoercion => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::ArtifactNotFound => StatusCode::NOT_FOUND,
        ErrorKind::EncryptionFailed | ErrorKind::DecryptionFailed | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), details: None }
    }

    pub fn from_failure(failure: Failure, debug: bool) -> Self {
        Self {
            status: status_for(failure.kind),
            code: failure.kind.code(),
            message: failure.message,
            details: debug.then_some(failure.detail),
        }
    }

    /// Request-level errors raised before the pipeline runs.
    pub fn from_convert(err: &ConvertError, debug: bool) -> Self {
        let kind = err.kind();
        Self {
            status: status_for(kind),
            code: kind.code(),
            message: err.public_message(),
            details: debug.then(|| err.to_string()),
        }
    }

    pub fn missing_file() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorKind::InvalidRequest.code(), "No file provided")
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "SESSION_INVALID", "Session expired or invalid")
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorKind::UploadTooLarge.code()
        } else {
            ErrorKind::InvalidRequest.code()
        };
        Self::new(status, code, err.body_text())
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        error!(error = %err, "pipeline task did not complete");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal.code(), ErrorKind::Internal.default_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            error_code: self.code,
            message: &self.message,
            timestamp: Utc::now().to_rfc3339(),
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
