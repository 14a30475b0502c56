use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;

/// Failures of the ingestion pipeline. Only parsing, strict validation and
/// export can fail; cleaning, typing, stats and heuristics are total.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported file type: {0}. Use CSV or Excel (.xlsx, .xls)")]
    UnsupportedFormat(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Inconsistent schema at row {row}: expected {expected} columns, found {found}")]
    InconsistentSchema {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("CSV export failed: {0}")]
    Export(String),
}

#[derive(Debug)]
pub enum AppError {
    InvalidInput(String),
    PayloadTooLarge(usize),
    Ingest(IngestError),
    HttpError(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::PayloadTooLarge(limit) => write!(f, "File exceeds the {} byte limit", limit),
            AppError::Ingest(err) => write!(f, "{}", err),
            AppError::HttpError(msg) => write!(f, "HTTP Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::Ingest(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Ingest(IngestError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Ingest(IngestError::MalformedInput(_))
            | AppError::Ingest(IngestError::InconsistentSchema { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Ingest(IngestError::Export(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::HttpError(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
