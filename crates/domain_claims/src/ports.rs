//! Claims Domain Ports
//!
//! Port interfaces for the collaborators the claim workflow depends on. The
//! domain only talks to these traits; the adapters module provides
//! in-process implementations and a real deployment would swap in clients
//! for an object store, an assessment service and a messaging gateway.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::ports::AssessmentPort;
//! use std::sync::Arc;
//!
//! pub struct Dispatcher {
//!     assessor: Arc<dyn AssessmentPort>,
//! }
//!
//! impl Dispatcher {
//!     pub async fn run(&self, request: AssessmentRequest) -> Result<Assessment, AssessmentFailure> {
//!         self.assessor.assess(request).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::{
    ClaimId, DeliveryId, DomainPort, HealthCheckable, HourlyRate, PhotoId, PortError, UploadId,
};

use crate::assessment::Assessment;
use crate::claim::Vehicle;
use crate::photo::Photo;

// ============================================================================
// Photo ingestion
// ============================================================================

/// Metadata announced before the first chunk of a photo is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUploadRequest {
    pub claim_id: ClaimId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Stores photo binaries
///
/// Uploads are chunked: the caller opens an upload, sends chunks at
/// increasing offsets and completes it. The ingestion side acknowledges the
/// number of contiguous bytes it holds, which is where an interrupted upload
/// resumes.
#[async_trait]
pub trait PhotoIngestionPort: DomainPort + HealthCheckable {
    /// Opens an upload and returns its handle
    async fn begin_upload(&self, request: PhotoUploadRequest) -> Result<UploadId, PortError>;

    /// Stores a chunk at `offset`; returns the new acknowledged offset
    async fn put_chunk(
        &self,
        upload_id: UploadId,
        offset: u64,
        chunk: Vec<u8>,
    ) -> Result<u64, PortError>;

    /// Bytes the ingestion side has durably received
    async fn acknowledged_offset(&self, upload_id: UploadId) -> Result<u64, PortError>;

    /// Finalizes a fully transferred upload into a stored photo
    async fn complete_upload(&self, upload_id: UploadId) -> Result<Photo, PortError>;

    /// Discards a partial upload
    async fn abort_upload(&self, upload_id: UploadId) -> Result<(), PortError>;

    /// Deletes a completed photo that is no longer attached to a claim
    async fn discard_photo(&self, photo_id: PhotoId) -> Result<(), PortError>;
}

// ============================================================================
// AI assessment
// ============================================================================

/// Why the AI could not produce an assessment
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentFailure {
    #[error("no photos to assess")]
    NoPhotos,

    #[error("image quality too low: {detail}")]
    LowQualityImages { detail: String },

    #[error("assessment timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("assessment service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("assessment cancelled")]
    Cancelled,
}

impl AssessmentFailure {
    /// Whether dispatching the same photos again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssessmentFailure::Timeout { .. }
                | AssessmentFailure::Unavailable { .. }
                | AssessmentFailure::Cancelled
        )
    }
}

/// Everything the assessment collaborator is given
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub claim_id: ClaimId,
    pub claim_number: String,
    pub vehicle: Vehicle,
    pub photos: Vec<Photo>,
    pub labor_rate: HourlyRate,
}

/// Produces a damage assessment from claim photos
#[async_trait]
pub trait AssessmentPort: DomainPort + HealthCheckable {
    async fn assess(&self, request: AssessmentRequest) -> Result<Assessment, AssessmentFailure>;
}

// ============================================================================
// Notification
// ============================================================================

/// Delivery channel for customer messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationChannel::Email => f.write_str("email"),
            NotificationChannel::Sms => f.write_str("sms"),
        }
    }
}

/// Purpose of a customer message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// First request to upload damage photos
    UploadLink,
    /// Follow-up when photos have not arrived
    PhotoReminder,
}

/// A message to the customer carrying the upload link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub claim_id: ClaimId,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub link: String,
    pub kind: NotificationKind,
}

/// Acknowledgement that a message was handed to the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub delivery_id: DeliveryId,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub sent_at: DateTime<Utc>,
}

/// Sends messages to customers
#[async_trait]
pub trait NotificationPort: DomainPort + HealthCheckable {
    async fn send(&self, notification: Notification) -> Result<DeliveryReceipt, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_failure_retryable() {
        assert!(AssessmentFailure::Timeout { after_ms: 30_000 }.is_retryable());
        assert!(AssessmentFailure::Unavailable { reason: "503".into() }.is_retryable());
        assert!(!AssessmentFailure::NoPhotos.is_retryable());
        assert!(!AssessmentFailure::LowQualityImages { detail: "blurry".into() }.is_retryable());
    }

    #[test]
    fn test_assessment_failure_serializes_tagged() {
        let json = serde_json::to_value(AssessmentFailure::Timeout { after_ms: 500 }).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["after_ms"], 500);
    }
}
