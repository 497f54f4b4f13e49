//! Claims domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{CoreError, MoneyError, PortError, UploadId};

use crate::claim::ClaimStatus;
use crate::ports::AssessmentFailure;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Damage line not found: {0}")]
    DamageLineNotFound(String),

    #[error("Photo not found: {0}")]
    PhotoNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{field} cannot be negative (got {value})")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("A rejection reason is required")]
    ReasonRequired,

    #[error("Revision notes are required")]
    RevisionNotesRequired,

    #[error("Photo limit of {max} reached")]
    PhotoLimitExceeded { max: usize },

    #[error("Cannot {action} while claim is {from}")]
    InvalidStatusTransition { from: ClaimStatus, action: &'static str },

    #[error("Claim is {status}; the assessment can no longer be edited")]
    ClaimLocked { status: ClaimStatus },

    #[error("{unreviewed} damage line(s) have not been reviewed")]
    ReviewIncomplete { unreviewed: usize },

    #[error("Claim has no assessment")]
    AssessmentMissing,

    #[error("An assessment is already running for this claim")]
    AssessmentInProgress,

    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Upload {upload_id} cancelled after {bytes_sent} bytes")]
    UploadCancelled { upload_id: UploadId, bytes_sent: u64 },

    #[error("AI assessment failed: {0}")]
    AssessmentFailed(AssessmentFailure),

    #[error("{operation} failed: {source}")]
    Port {
        operation: &'static str,
        #[source]
        source: PortError,
    },

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }

    pub fn port(operation: &'static str, source: PortError) -> Self {
        ClaimError::Port { operation, source }
    }

    /// Input the caller can fix and resubmit
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ClaimError::Validation(_)
                | ClaimError::NegativeAmount { .. }
                | ClaimError::ReasonRequired
                | ClaimError::RevisionNotesRequired
                | ClaimError::PhotoLimitExceeded { .. }
                | ClaimError::Money(_)
                | ClaimError::Core(_)
        )
    }

    /// Collaborator or concurrency failures that may succeed when retried
    pub fn is_retryable(&self) -> bool {
        match self {
            ClaimError::Port { source, .. } => source.is_transient(),
            ClaimError::AssessmentFailed(failure) => failure.is_retryable(),
            ClaimError::UploadCancelled { .. } | ClaimError::VersionConflict { .. } => true,
            _ => false,
        }
    }

    /// An action attempted against the wrong lifecycle state
    pub fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            ClaimError::InvalidStatusTransition { .. }
                | ClaimError::ClaimLocked { .. }
                | ClaimError::ReviewIncomplete { .. }
                | ClaimError::AssessmentMissing
                | ClaimError::AssessmentInProgress
        )
    }
}
