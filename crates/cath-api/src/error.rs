//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`PublicationError`] variants from the core to HTTP status codes
//! and JSON error bodies. Validation failures carry the offending field
//! path; storage and blob failures never leak internals to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use cath_core::PublicationError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Header parsing or schema/content validation failed (400).
    /// The message names the offending header or field path.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure: missing token or unresolved identity for
    /// a gated tier (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure: insufficient role (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found, or a gated artefact hidden from this
    /// requester (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Business-key conflict that survived the internal retry (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Payload exceeds a hard transport limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500). Message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),

    /// The account collaborator failed or timed out (504).
    #[error("collaborator timeout: {0}")]
    CollaboratorTimeout(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::CollaboratorTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "COLLABORATOR_TIMEOUT"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::CollaboratorTimeout(_) => {
                "An upstream collaborator did not respond".to_string()
            }
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::CollaboratorTimeout(_) => {
                tracing::error!(error = %self, "account collaborator failure")
            }
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PublicationError> for AppError {
    fn from(err: PublicationError) -> Self {
        match err {
            PublicationError::UnknownListType(_)
            | PublicationError::SchemaValidation { .. }
            | PublicationError::ContentSafety { .. }
            | PublicationError::InvalidIdentifier { .. } => Self::BadRequest(err.to_string()),
            PublicationError::Unauthorized(msg) => Self::Unauthorized(msg),
            PublicationError::Forbidden(msg) => Self::Forbidden(msg),
            PublicationError::NotFound(msg) => Self::NotFound(msg),
            PublicationError::BusinessKeyConflict(key) => Self::Conflict(format!(
                "concurrent ingestion for business key {key}, resubmit"
            )),
            PublicationError::PayloadTooLarge { size, threshold } => Self::PayloadTooLarge(
                format!("payload of {size} bytes exceeds the {threshold} byte limit"),
            ),
            PublicationError::CollaboratorTimeout(msg) => Self::CollaboratorTimeout(msg),
            PublicationError::Storage(msg) | PublicationError::Blob(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        let err: AppError = PublicationError::SchemaValidation {
            path: "document.publicationDate".to_string(),
            message: "missing required field".to_string(),
        }
        .into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let err: AppError = PublicationError::Unauthorized("no identity".to_string()).into();
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err: AppError = PublicationError::Forbidden("wrong role".to_string()).into();
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err: AppError = PublicationError::NotFound("no artefact".to_string()).into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn conflict_maps_to_409() {
        let err: AppError =
            PublicationError::BusinessKeyConflict("a/b/c/d".to_string()).into();
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn storage_errors_hide_their_message() {
        let err: AppError = PublicationError::Storage("connection refused".to_string()).into();
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn collaborator_timeout_maps_to_504() {
        let err: AppError =
            PublicationError::CollaboratorTimeout("account service".to_string()).into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(code, "COLLABORATOR_TIMEOUT");
    }
}
