//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_claims::{AssessmentFailure, ClaimError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request")]
    InvalidRequest(Vec<String>),

    #[error("Upstream failure: {0}")]
    BadGateway(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type, details) = match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", None),
            ApiError::InvalidRequest(details) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", Some(details))
            }
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "upstream_error", None),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        let message = err.to_string();
        let correctable = err.is_user_correctable();
        match err {
            ClaimError::ClaimNotFound(_)
            | ClaimError::DamageLineNotFound(_)
            | ClaimError::PhotoNotFound(_) => ApiError::NotFound(message),
            ClaimError::InvalidStatusTransition { .. }
            | ClaimError::ClaimLocked { .. }
            | ClaimError::ReviewIncomplete { .. }
            | ClaimError::AssessmentMissing
            | ClaimError::AssessmentInProgress
            | ClaimError::VersionConflict { .. }
            | ClaimError::UploadCancelled { .. } => ApiError::Conflict(message),
            ClaimError::AssessmentFailed(
                AssessmentFailure::NoPhotos | AssessmentFailure::LowQualityImages { .. },
            ) => ApiError::Validation(message),
            ClaimError::AssessmentFailed(_) => ApiError::Unavailable(message),
            ClaimError::Port { source, .. } => match source {
                PortError::NotFound { .. } => ApiError::NotFound(message),
                PortError::Validation { .. } => ApiError::Validation(message),
                PortError::Conflict { .. } => ApiError::Conflict(message),
                e if e.is_transient() => ApiError::Unavailable(message),
                _ => ApiError::BadGateway(message),
            },
            _ if correctable => ApiError::Validation(message),
            _ => ApiError::Internal(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        details.sort();
        ApiError::InvalidRequest(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::ClaimStatus;

    fn status_of(err: ClaimError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_claim_error_status_codes() {
        assert_eq!(status_of(ClaimError::ClaimNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ClaimError::ReasonRequired), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(ClaimError::InvalidStatusTransition {
                from: ClaimStatus::Completed,
                action: "approve",
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ClaimError::VersionConflict { expected: 1, actual: 2 }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(ClaimError::AssessmentInProgress), StatusCode::CONFLICT);
        assert_eq!(status_of(ClaimError::PhotoNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ClaimError::Money(core_kernel::MoneyError::Overflow("labor cost".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ClaimError::AssessmentFailed(AssessmentFailure::Timeout { after_ms: 30_000 })),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ClaimError::port("send notification", PortError::internal("boom"))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ClaimError::port(
                "send notification",
                PortError::ServiceUnavailable { service: "sms gateway".into() }
            )),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
