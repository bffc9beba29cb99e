//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_claims::{ClaimError, FieldError, SubmissionError, SubmissionFailure};

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("The uploaded file does not look like a bill, receipt or invoice")]
    DocumentRejected,

    #[error("Document verification failed: {0}")]
    VerificationFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Validation failure for a single field
    pub fn field(field: &str, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::Validation {
            message: message.clone(),
            details: vec![FieldError {
                field: field.to_string(),
                code: code.to_string(),
                message,
            }],
        }
    }

    /// Validation failure carrying every field error
    pub fn validation(details: Vec<FieldError>) -> Self {
        let message = details
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Invalid claim".to_string());
        ApiError::Validation { message, details }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type, details) = match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
            ApiError::Validation { details, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", Some(details))
            }
            ApiError::DocumentRejected => (StatusCode::UNPROCESSABLE_ENTITY, "document_rejected", None),
            ApiError::VerificationFailed(_) => (StatusCode::BAD_GATEWAY, "verification_failed", None),
            ApiError::SubmissionFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "submission_failed", None),
            ApiError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", None),
        };

        if status.is_server_error() {
            error!(error = error_type, %message, "request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(p) => ApiError::Forbidden(format!("missing permission {p}")),
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => ApiError::NotFound(format!("{entity_type} {id}")),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Rejected { message } => ApiError::BadRequest(message),
            e if e.is_transient() => ApiError::ServiceUnavailable(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::ClaimNotFound(id) => ApiError::NotFound(format!("Claim {id}")),
            ClaimError::InvalidStatusTransition { .. } => ApiError::Conflict(err.to_string()),
            ClaimError::UnknownClaimType(_) | ClaimError::UnknownStatus(_) => ApiError::BadRequest(err.to_string()),
            ClaimError::Port(e) => e.into(),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

impl From<SubmissionFailure> for ApiError {
    fn from(err: SubmissionFailure) -> Self {
        match err {
            SubmissionFailure::Admission(e) => ApiError::VerificationFailed(e.to_string()),
            SubmissionFailure::Persistence(e) => ApiError::SubmissionFailed(e.to_string()),
        }
    }
}
