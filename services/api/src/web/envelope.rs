//! services/api/src/web/envelope.rs
//!
//! The single response envelope shared by every endpoint, and the request-level
//! error type that renders into it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use study_relay_core::ports::PortError;
use tracing::error;
use utoipa::ToSchema;

pub const FILE_TYPE_UNSUPPORTED: &str = "File type not supported for text extraction yet.";
pub const REFERENCE_UNSUPPORTED: &str = "Only PDF supported currently";
pub const EMPTY_CONTENT: &str = "No text extracted from file. The PDF might be scanned or empty.";

/// A response body discriminated by `status`. Errors never carry data.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope<T> {
    Success(T),
    Error { kind: ErrorKind, message: String },
}

/// Machine-readable failure category carried by error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    UnsupportedFileType,
    FetchFailed,
    ExtractionFailed,
    EmptyContent,
    ProviderFailed,
    Internal,
}

/// The body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `"error"`.
    #[schema(example = "error")]
    pub status: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// A failure while handling a single request.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    UnsupportedFileType(&'static str),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Extraction(String),

    #[error("No text extracted from file. The PDF might be scanned or empty.")]
    EmptyContent,

    #[error("AI Engine failed: {0}")]
    Provider(String),

    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::UnsupportedFileType(_) => ErrorKind::UnsupportedFileType,
            Self::Fetch(_) => ErrorKind::FetchFailed,
            Self::Extraction(_) => ErrorKind::ExtractionFailed,
            Self::EmptyContent => ErrorKind::EmptyContent,
            Self::Provider(_) => ErrorKind::ProviderFailed,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::UnsupportedFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::EmptyContent | ErrorKind::ExtractionFailed => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::FetchFailed | ErrorKind::ProviderFailed => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PortError> for RelayError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Fetch(message) => Self::Fetch(message),
            PortError::Extraction(message) => Self::Extraction(message),
            PortError::Provider(message) => Self::Provider(message),
            PortError::Unexpected(message) => Self::Internal(message),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = ?self.kind(), "Request failed: {}", self);
        }
        let body: Envelope<()> = Envelope::Error {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        response: String,
    }

    #[test]
    fn success_flattens_data_next_to_status() {
        let envelope = Envelope::Success(Payload {
            response: "hi".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": "success", "response": "hi" })
        );
    }

    #[test]
    fn error_carries_kind_and_message_only() {
        let envelope: Envelope<Payload> = Envelope::Error {
            kind: ErrorKind::EmptyContent,
            message: EMPTY_CONTENT.to_string(),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": "error", "kind": "empty_content", "message": EMPTY_CONTENT })
        );
    }

    #[test]
    fn provider_errors_are_prefixed() {
        let err = RelayError::from(PortError::Provider("quota exceeded".to_string()));
        assert_eq!(err.to_string(), "AI Engine failed: quota exceeded");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unexpected_port_errors_become_internal() {
        let err = RelayError::from(PortError::Unexpected("boom".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
