//! Claim workflow service
//!
//! [`ClaimService`] is the application facade over the claim store and the
//! collaborator ports. Every lifecycle change goes through
//! [`ClaimService::execute`]: load, apply the command to the loaded copy,
//! and save with the version that was loaded. A command that fails its
//! guards never reaches the store, and a concurrent writer makes the save
//! fail with a version conflict instead of being overwritten.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use core_kernel::{
    ClaimId, Currency, DamageLineId, HealthCheckResult, HourlyRate, JobId, PhotoId, RetryPolicy,
    UploadId,
};

use crate::adapters::fixture_assessor::FIXTURE_MODELS;
use crate::adapters::fixtures::demo_claims;
use crate::adapters::{FixtureAssessmentEngine, InMemoryPhotoStore, LoggingNotifier};
use crate::assessment::{standard_labor_rate, AnalysisMetadata, CostSummary, LineEdit};
use crate::claim::{Claim, ClaimInput, ClaimPatch, ClaimStatus};
use crate::error::ClaimError;
use crate::jobs::{AssessmentJob, JobRegistry, JobSnapshot, JobStatus};
use crate::photo::{content_type_for, Photo};
use crate::ports::{
    AssessmentFailure, AssessmentPort, AssessmentRequest, DeliveryReceipt, Notification,
    NotificationChannel, NotificationKind, NotificationPort, PhotoIngestionPort,
    PhotoUploadRequest,
};
use crate::store::{ClaimStore, DashboardSummary, InMemoryClaimStore};
use crate::upload::{PhotoUploader, UploadConfig, UploadHandle};
use crate::workflow::{ClaimCommand, LineReviewAction, WorkflowPolicy};

/// Default base for customer upload links
pub const DEFAULT_UPLOAD_LINK_BASE: &str = "https://claims.insurancecompany.com/upload";

/// Attempts a background job makes when its save loses a version race
const JOB_SAVE_ATTEMPTS: u32 = 3;

/// How long a finished job stays available for status lookups
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Service wiring settings
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub policy: WorkflowPolicy,
    pub labor_rate: HourlyRate,
    pub upload: UploadConfig,
    pub upload_link_base: String,
    pub assessment_timeout: Duration,
    /// Retry policy for customer notifications
    pub notification_retry: RetryPolicy,
    pub job_retention: Duration,
}

impl ServiceSettings {
    pub fn new(labor_rate: HourlyRate) -> Self {
        Self {
            policy: WorkflowPolicy::default(),
            labor_rate,
            upload: UploadConfig::default(),
            upload_link_base: DEFAULT_UPLOAD_LINK_BASE.to_string(),
            assessment_timeout: Duration::from_secs(30),
            notification_retry: RetryPolicy::default(),
            job_retention: DEFAULT_JOB_RETENTION,
        }
    }

    /// Default settings at the standard USD labor rate
    pub fn standard() -> Result<Self, ClaimError> {
        Ok(Self::new(standard_labor_rate(Currency::USD)?))
    }

    /// Customer upload link for a claim number
    pub fn upload_link(&self, claim_number: &str) -> String {
        format!("{}/{}", self.upload_link_base.trim_end_matches('/'), claim_number)
    }
}

/// Facade over the claim store and collaborator ports
#[derive(Clone)]
pub struct ClaimService {
    store: Arc<dyn ClaimStore>,
    photos: Arc<dyn PhotoIngestionPort>,
    assessor: Arc<dyn AssessmentPort>,
    notifier: Arc<dyn NotificationPort>,
    uploader: PhotoUploader,
    settings: Arc<ServiceSettings>,
    jobs: JobRegistry,
}

impl ClaimService {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        photos: Arc<dyn PhotoIngestionPort>,
        assessor: Arc<dyn AssessmentPort>,
        notifier: Arc<dyn NotificationPort>,
        settings: ServiceSettings,
    ) -> Self {
        let uploader = PhotoUploader::new(Arc::clone(&photos), settings.upload.clone());
        Self {
            store,
            photos,
            assessor,
            notifier,
            uploader,
            settings: Arc::new(settings),
            jobs: JobRegistry::new(),
        }
    }

    /// Wires the service with the in-process adapters
    pub fn in_memory(settings: ServiceSettings) -> Self {
        Self::new(
            Arc::new(InMemoryClaimStore::new()),
            Arc::new(InMemoryPhotoStore::new()),
            Arc::new(FixtureAssessmentEngine::new()),
            Arc::new(LoggingNotifier::new()),
            settings,
        )
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    // ========================================================================
    // Claim store operations
    // ========================================================================

    /// Opens a claim from intake data
    #[instrument(skip(self, input), fields(policy_number = %input.policy_number))]
    pub async fn open_claim(&self, input: ClaimInput) -> Result<Claim, ClaimError> {
        let claim = self.store.create(input).await?;
        info!(
            claim_id = %claim.id(),
            claim_number = %claim.claim_number(),
            priority = ?claim.priority(),
            "Claim opened"
        );
        Ok(claim)
    }

    pub async fn get_claim(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.store.get(id).await
    }

    pub async fn get_by_number(&self, claim_number: &str) -> Result<Claim, ClaimError> {
        self.store.get_by_number(claim_number).await
    }

    /// All claims, or those in one status, in creation order
    pub async fn list_claims(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, ClaimError> {
        match status {
            Some(status) => self.store.list_by_status(status).await,
            None => self.store.list_all().await,
        }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, ClaimError> {
        self.store.summary().await
    }

    /// Corrects descriptive fields
    #[instrument(skip(self, patch), fields(claim_id = %id))]
    pub async fn update_details(
        &self,
        id: ClaimId,
        patch: ClaimPatch,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        let claim = self.store.update(id, patch, expected_version).await?;
        info!(version = claim.version(), "Claim details updated");
        Ok(claim)
    }

    // ========================================================================
    // Workflow
    // ========================================================================

    /// Applies a command with optimistic concurrency
    ///
    /// With `expected_version` the command is refused unless the stored
    /// claim is still at that version.
    #[instrument(skip(self, command), fields(claim_id = %id, command = command.name()))]
    pub async fn execute(
        &self,
        id: ClaimId,
        command: ClaimCommand,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.store.get(id).await?;
        let loaded_version = claim.version();
        if let Some(expected) = expected_version {
            if expected != loaded_version {
                return Err(ClaimError::VersionConflict {
                    expected,
                    actual: loaded_version,
                });
            }
        }

        let from = claim.status();
        if let Err(e) = claim.apply(command, &self.settings.policy) {
            warn!(status = %from, error = %e, "Command refused");
            return Err(e);
        }
        let events = claim.take_events();
        let saved = self.store.save(claim, loaded_version).await?;

        for event in &events {
            info!(
                event_type = event.event_type(),
                claim_number = %saved.claim_number(),
                from = %from,
                to = %saved.status(),
                version = saved.version(),
                "Claim event"
            );
        }
        Ok(saved)
    }

    /// Applies a line review action
    pub async fn review_line(
        &self,
        id: ClaimId,
        line_id: DamageLineId,
        action: LineReviewAction,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        self.execute(id, ClaimCommand::ReviewLine { line_id, action }, expected_version)
            .await
    }

    /// Edits a line's parts cost, hours or notes
    pub async fn edit_line(
        &self,
        id: ClaimId,
        line_id: DamageLineId,
        edit: LineEdit,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        self.review_line(id, line_id, LineReviewAction::Edit(edit), expected_version)
            .await
    }

    /// Discards every line adjustment on a claim under review
    pub async fn reset_review(
        &self,
        id: ClaimId,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        self.execute(id, ClaimCommand::ResetReview, expected_version).await
    }

    /// Cost totals and the adjustment against the AI estimate
    pub async fn cost_summary(&self, id: ClaimId) -> Result<CostSummary, ClaimError> {
        let claim = self.store.get(id).await?;
        let assessment = claim.assessment().ok_or(ClaimError::AssessmentMissing)?;
        Ok(assessment.cost_summary()?)
    }

    // ========================================================================
    // Customer notifications
    // ========================================================================

    /// Sends the photo upload link to the customer
    pub async fn send_upload_link(
        &self,
        id: ClaimId,
        channel: NotificationChannel,
    ) -> Result<(Claim, DeliveryReceipt), ClaimError> {
        self.notify(id, channel, NotificationKind::UploadLink).await
    }

    /// Reminds the customer that photos are still outstanding
    pub async fn send_photo_reminder(
        &self,
        id: ClaimId,
        channel: NotificationChannel,
    ) -> Result<(Claim, DeliveryReceipt), ClaimError> {
        self.notify(id, channel, NotificationKind::PhotoReminder).await
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn notify(
        &self,
        id: ClaimId,
        channel: NotificationChannel,
        kind: NotificationKind,
    ) -> Result<(Claim, DeliveryReceipt), ClaimError> {
        let claim = self.store.get(id).await?;
        if claim.status() != ClaimStatus::AwaitingPhotos {
            return Err(ClaimError::InvalidStatusTransition {
                from: claim.status(),
                action: "request photos",
            });
        }
        let recipient = match channel {
            NotificationChannel::Email => claim.customer().email.clone(),
            NotificationChannel::Sms => claim.customer().phone.clone(),
        }
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ClaimError::validation(format!("customer has no {channel} contact")))?;

        let link = self.settings.upload_link(claim.claim_number());
        let notification = Notification {
            claim_id: id,
            channel,
            recipient,
            link: link.clone(),
            kind,
        };
        let receipt = self.send_with_retry(notification).await?;

        let command = ClaimCommand::RecordNotification { kind, channel, link };
        let claim = self.execute(id, command, None).await?;
        Ok((claim, receipt))
    }

    async fn send_with_retry(&self, notification: Notification) -> Result<DeliveryReceipt, ClaimError> {
        let retry = &self.settings.notification_retry;
        let mut attempt = 0;
        loop {
            match self.notifier.send(notification.clone()).await {
                Ok(receipt) => return Ok(receipt),
                Err(e) if retry.should_retry(attempt, &e) => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Notification failed, retrying");
                    tokio::time::sleep(retry.delay_for(attempt)).await;
                }
                Err(e) => return Err(ClaimError::port("send notification", e)),
            }
        }
    }

    // ========================================================================
    // Photos
    // ========================================================================

    /// Starts a chunked upload for a claim photo
    ///
    /// The returned handle reports progress and can be cancelled; pass the
    /// finished photo to [`ClaimService::attach_photo`].
    #[instrument(skip(self, data), fields(claim_id = %id, size = data.len()))]
    pub async fn start_photo_upload(
        &self,
        id: ClaimId,
        filename: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<UploadHandle, ClaimError> {
        let claim = self.store.get(id).await?;
        if !matches!(claim.status(), ClaimStatus::AwaitingPhotos | ClaimStatus::AiInProgress) {
            return Err(ClaimError::InvalidStatusTransition {
                from: claim.status(),
                action: "attach photos",
            });
        }
        if claim.photos().len() >= self.settings.policy.max_photos {
            return Err(ClaimError::PhotoLimitExceeded {
                max: self.settings.policy.max_photos,
            });
        }
        if data.is_empty() {
            return Err(ClaimError::validation("photo is empty"));
        }
        let content_type = content_type
            .map(str::to_string)
            .or_else(|| content_type_for(filename).map(str::to_string))
            .ok_or_else(|| ClaimError::validation(format!("cannot tell the image type of {filename}")))?;
        if !content_type.starts_with("image/") {
            return Err(ClaimError::validation(format!("{filename} is not an image")));
        }

        let request = PhotoUploadRequest {
            claim_id: id,
            filename: filename.to_string(),
            content_type,
            size_bytes: data.len() as u64,
        };
        self.uploader.start(request, Arc::new(data)).await
    }

    /// Continues an interrupted upload
    pub async fn resume_photo_upload(
        &self,
        upload_id: UploadId,
        data: Vec<u8>,
    ) -> Result<UploadHandle, ClaimError> {
        self.uploader.resume(upload_id, Arc::new(data)).await
    }

    /// Discards a partial upload
    pub async fn abort_photo_upload(&self, upload_id: UploadId) -> Result<(), ClaimError> {
        self.photos
            .abort_upload(upload_id)
            .await
            .map_err(|e| ClaimError::port("abort upload", e))
    }

    /// Attaches a stored photo to the claim
    pub async fn attach_photo(&self, id: ClaimId, photo: Photo) -> Result<Claim, ClaimError> {
        self.execute(id, ClaimCommand::AttachPhoto(photo), None).await
    }

    /// Uploads a photo and attaches it in one call
    ///
    /// If the claim refuses the photo, the stored copy is discarded.
    pub async fn upload_photo(
        &self,
        id: ClaimId,
        filename: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<Claim, ClaimError> {
        let handle = self.start_photo_upload(id, filename, content_type, data).await?;
        let photo = handle.wait().await?;
        let photo_id = photo.id;
        match self.attach_photo(id, photo).await {
            Ok(claim) => Ok(claim),
            Err(e) => {
                self.discard_stored_photo(photo_id).await;
                Err(e)
            }
        }
    }

    /// Takes a photo off a claim that is waiting for its assessment
    #[instrument(skip(self), fields(claim_id = %id, photo_id = %photo_id))]
    pub async fn remove_photo(
        &self,
        id: ClaimId,
        photo_id: PhotoId,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        if !self.jobs.active_for(id).await.is_empty() {
            return Err(ClaimError::AssessmentInProgress);
        }
        let claim = self
            .execute(id, ClaimCommand::RemovePhoto(photo_id), expected_version)
            .await?;
        self.discard_stored_photo(photo_id).await;
        Ok(claim)
    }

    async fn discard_stored_photo(&self, photo_id: PhotoId) {
        if let Err(e) = self.photos.discard_photo(photo_id).await {
            warn!(%photo_id, error = %e, "Failed to discard stored photo");
        }
    }

    // ========================================================================
    // AI assessment
    // ========================================================================

    /// Dispatches the AI assessment as a background job
    ///
    /// On completion the job attaches the assessment, or records the
    /// failure on the claim so it can be dispatched again.
    #[instrument(skip(self), fields(claim_id = %id))]
    pub async fn dispatch_assessment(&self, id: ClaimId) -> Result<AssessmentJob, ClaimError> {
        let claim = self.store.get(id).await?;
        if claim.status() != ClaimStatus::AiInProgress {
            return Err(ClaimError::InvalidStatusTransition {
                from: claim.status(),
                action: "dispatch an assessment",
            });
        }
        let pruned = self.jobs.prune_finished(self.settings.job_retention).await;
        if pruned > 0 {
            debug!(pruned, "Pruned finished assessment jobs");
        }

        let request = AssessmentRequest {
            claim_id: id,
            claim_number: claim.claim_number().to_string(),
            vehicle: claim.vehicle().clone(),
            photos: claim.photos().to_vec(),
            labor_rate: self.settings.labor_rate,
        };
        let job_id = JobId::new_v7();
        let (tx, rx) = watch::channel(JobStatus::Queued);
        let cancel = CancellationToken::new();
        if !self.jobs.register_if_idle(job_id, id, rx.clone()).await {
            return Err(ClaimError::AssessmentInProgress);
        }

        let service = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { service.run_assessment(job_id, request, tx, token).await });
        info!(%job_id, photos = claim.photos().len(), "Assessment dispatched");

        Ok(AssessmentJob::new(job_id, id, rx, cancel, task))
    }

    /// Status of a dispatched job
    pub async fn job_status(&self, job_id: JobId) -> Option<JobSnapshot> {
        self.jobs.get(job_id).await
    }

    async fn run_assessment(
        &self,
        job_id: JobId,
        request: AssessmentRequest,
        status: watch::Sender<JobStatus>,
        cancel: CancellationToken,
    ) -> Result<Claim, ClaimError> {
        let claim_id = request.claim_id;
        let timeout = self.settings.assessment_timeout;
        status.send_replace(JobStatus::Running);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AssessmentFailure::Cancelled),
            result = tokio::time::timeout(timeout, self.assessor.assess(request)) => {
                result.unwrap_or(Err(AssessmentFailure::Timeout {
                    after_ms: timeout.as_millis() as u64,
                }))
            }
        };

        let (command, failure) = match outcome {
            Ok(assessment) => (ClaimCommand::AttachAssessment(assessment), None),
            Err(failure) => (
                ClaimCommand::RecordAssessmentFailure(failure.clone()),
                Some(failure),
            ),
        };

        let applied = self.execute_with_retry(claim_id, command).await;
        let final_status = match (&applied, &failure) {
            (Err(e), _) => JobStatus::Failed { reason: e.to_string() },
            (Ok(_), None) => JobStatus::Succeeded,
            (Ok(_), Some(AssessmentFailure::Cancelled)) => JobStatus::Cancelled,
            (Ok(_), Some(f)) => JobStatus::Failed { reason: f.to_string() },
        };
        match &final_status {
            JobStatus::Succeeded => info!(%job_id, %claim_id, "Assessment job succeeded"),
            other => warn!(%job_id, %claim_id, status = ?other, "Assessment job did not succeed"),
        }
        status.send_replace(final_status);

        let claim = applied?;
        match failure {
            Some(failure) => Err(ClaimError::AssessmentFailed(failure)),
            None => Ok(claim),
        }
    }

    async fn execute_with_retry(&self, id: ClaimId, command: ClaimCommand) -> Result<Claim, ClaimError> {
        let mut attempt = 1;
        loop {
            match self.execute(id, command.clone(), None).await {
                Err(ClaimError::VersionConflict { .. }) if attempt < JOB_SAVE_ATTEMPTS => {
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    // ========================================================================
    // Health and demo data
    // ========================================================================

    /// Health of the store and every collaborator
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.store.health_check().await,
            self.photos.health_check().await,
            self.assessor.health_check().await,
            self.notifier.health_check().await,
        ]
    }

    /// Loads the dashboard demo claims, driving each to its listed status
    pub async fn seed_demo_data(&self) -> Result<Vec<Claim>, ClaimError> {
        let mut seeded = Vec::new();
        for demo in demo_claims() {
            let mut claim = self.open_claim(demo.input).await?;
            let id = claim.id();

            for name in &demo.photos {
                claim = self
                    .upload_photo(id, name, None, placeholder_jpeg(name))
                    .await?;
            }
            if demo.target == ClaimStatus::AwaitingPhotos && claim.customer().email.is_some() {
                claim = self.send_upload_link(id, NotificationChannel::Email).await?.0;
            }
            if let Some(fixture) = &demo.assessment {
                let assessment = fixture
                    .build(self.settings.labor_rate)?
                    .with_metadata(AnalysisMetadata {
                        photos_analyzed: claim.photos().len(),
                        models_used: FIXTURE_MODELS.iter().map(|m| m.to_string()).collect(),
                        processing_time_ms: 0,
                    });
                claim = self
                    .execute(id, ClaimCommand::AttachAssessment(assessment), None)
                    .await?;
            }
            if matches!(demo.target, ClaimStatus::PendingApproval | ClaimStatus::Completed) {
                claim = self.approve_all_lines(claim).await?;
                claim = self
                    .execute(
                        id,
                        ClaimCommand::SubmitReview {
                            agent: "agent.demo".into(),
                            adjustment_reason: None,
                        },
                        None,
                    )
                    .await?;
            }
            if demo.target == ClaimStatus::Completed {
                let approve = ClaimCommand::Approve {
                    adjuster: "adjuster.demo".into(),
                    notes: None,
                };
                claim = self.execute(id, approve, None).await?;
            }
            seeded.push(claim);
        }
        info!(count = seeded.len(), "Demo claims loaded");
        Ok(seeded)
    }

    async fn approve_all_lines(&self, claim: Claim) -> Result<Claim, ClaimError> {
        let line_ids: Vec<_> = claim
            .assessment()
            .map(|a| a.lines().iter().map(|l| l.id()).collect())
            .unwrap_or_default();
        let mut claim = claim;
        for line_id in line_ids {
            claim = self
                .review_line(claim.id(), line_id, LineReviewAction::Approve, None)
                .await?;
        }
        Ok(claim)
    }
}

/// A tiny JPEG-looking payload for demo photos
fn placeholder_jpeg(name: &str) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend_from_slice(name.as_bytes());
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ClaimService {
        ClaimService::in_memory(ServiceSettings::standard().unwrap())
    }

    #[tokio::test]
    async fn test_execute_refuses_stale_version() {
        let service = service();
        let claim = service.open_claim(ClaimInput::new("POL-1", "A")).await.unwrap();
        let patched = service
            .update_details(
                claim.id(),
                ClaimPatch {
                    priority: Some(crate::claim::Priority::High),
                    ..Default::default()
                },
                Some(0),
            )
            .await
            .unwrap();
        assert_eq!(patched.version(), 1);

        let result = service
            .execute(
                claim.id(),
                ClaimCommand::SetAgentNotes { notes: "x".into() },
                Some(0),
            )
            .await;
        assert!(matches!(result, Err(ClaimError::VersionConflict { expected: 0, actual: 1 })));
    }

    #[tokio::test]
    async fn test_refused_command_leaves_store_untouched() {
        let service = service();
        let claim = service.open_claim(ClaimInput::new("POL-1", "A")).await.unwrap();
        let result = service
            .execute(
                claim.id(),
                ClaimCommand::Approve {
                    adjuster: "adj".into(),
                    notes: None,
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(ClaimError::InvalidStatusTransition { .. })));

        let stored = service.get_claim(claim.id()).await.unwrap();
        assert_eq!(stored.version(), 0);
        assert_eq!(stored.status(), ClaimStatus::AwaitingPhotos);
    }

    #[tokio::test]
    async fn test_upload_link_requires_contact() {
        let service = service();
        let claim = service.open_claim(ClaimInput::new("POL-1", "A")).await.unwrap();
        let result = service.send_upload_link(claim.id(), NotificationChannel::Sms).await;
        assert!(matches!(result, Err(ClaimError::Validation(_))));
    }

    #[test]
    fn test_upload_link_uses_claim_number() {
        let settings = ServiceSettings::standard().unwrap();
        assert_eq!(
            settings.upload_link("CLM-2024-002"),
            "https://claims.insurancecompany.com/upload/CLM-2024-002"
        );
    }

    #[tokio::test]
    async fn test_seed_demo_data_reaches_targets() {
        let service = service();
        let claims = service.seed_demo_data().await.unwrap();
        let statuses: Vec<_> = claims.iter().map(|c| c.status()).collect();
        assert_eq!(
            statuses,
            vec![
                ClaimStatus::PendingReview,
                ClaimStatus::AwaitingPhotos,
                ClaimStatus::AiInProgress,
                ClaimStatus::PendingApproval,
                ClaimStatus::Completed,
                ClaimStatus::AwaitingPhotos,
            ]
        );
        assert!(claims[1].upload_link().is_some());
        assert_eq!(claims[2].photos().len(), 5);

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.awaiting_photos, 2);
    }
}
