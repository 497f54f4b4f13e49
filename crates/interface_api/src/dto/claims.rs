//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, DamageLineId, JobId, PhotoId};
use domain_claims::{
    AdjusterDecision, ApprovalStatus, Assessment, AssessmentFailure, Claim, ClaimCommand,
    ClaimError, ClaimInput, ClaimPatch, ClaimStatus, CostSummary, CustomerContact, DeliveryReceipt,
    JobSnapshot, JobStatus, LineReviewAction, NotificationChannel, Photo, Priority, Vehicle,
};

// ============================================================================
// Requests
// ============================================================================

/// Intake wizard, step one
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    #[validate(length(min = 1, message = "policy number is required"))]
    pub policy_number: String,
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "must be an email address"))]
    pub customer_email: Option<String>,
    #[validate(length(min = 7, max = 32))]
    pub customer_phone: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub vehicle_year: Option<u16>,
    #[serde(default)]
    pub vehicle_make: String,
    #[serde(default)]
    pub vehicle_model: String,
    #[validate(length(equal = 17, message = "VIN must be 17 characters"))]
    pub vin: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub incident_description: Option<String>,
    pub priority: Option<Priority>,
}

impl CreateClaimRequest {
    pub fn into_input(self) -> ClaimInput {
        let mut customer = CustomerContact::new(self.customer_name);
        customer.email = self.customer_email;
        customer.phone = self.customer_phone;

        ClaimInput {
            policy_number: self.policy_number,
            customer,
            vehicle: Vehicle {
                year: self.vehicle_year,
                make: self.vehicle_make,
                model: self.vehicle_model,
                vin: self.vin,
            },
            incident_date: self.incident_date,
            incident_description: self.incident_description,
            priority: self.priority,
        }
    }
}

/// Correction of descriptive fields
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClaimRequest {
    #[validate(length(min = 1))]
    pub customer_name: Option<String>,
    #[validate(email(message = "must be an email address"))]
    pub customer_email: Option<String>,
    #[validate(length(min = 7, max = 32))]
    pub customer_phone: Option<String>,
    pub vehicle: Option<Vehicle>,
    pub incident_date: Option<NaiveDate>,
    pub incident_description: Option<String>,
    pub priority: Option<Priority>,
    pub agent_notes: Option<String>,
    pub expected_version: Option<u64>,
}

impl UpdateClaimRequest {
    pub fn into_patch(self) -> (ClaimPatch, Option<u64>) {
        let patch = ClaimPatch {
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            vehicle: self.vehicle,
            incident_date: self.incident_date,
            incident_description: self.incident_description,
            priority: self.priority,
            agent_notes: self.agent_notes,
        };
        (patch, self.expected_version)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    pub status: Option<String>,
}

impl ListClaimsQuery {
    /// Parses the status filter; `None` lists everything
    pub fn status(&self) -> Result<Option<ClaimStatus>, ClaimError> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

/// Upload link or reminder
#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub channel: NotificationChannel,
}

/// Photo bytes travel in the body; the name in the query
#[derive(Debug, Deserialize, Validate)]
pub struct PhotoUploadQuery {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct LineReviewRequest {
    #[serde(flatten)]
    pub action: LineReviewAction,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AgentNotesRequest {
    pub notes: String,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, message = "agent is required"))]
    pub agent: String,
    #[validate(length(max = 2000))]
    pub adjustment_reason: Option<String>,
    pub expected_version: Option<u64>,
}

/// Optimistic concurrency token for bodiless commands
#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResumeReviewRequest {
    #[validate(length(min = 1, message = "agent is required"))]
    pub agent: String,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    Reject,
    RequestRevision,
}

/// Adjuster decision on a pending-approval claim
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub decision: DecisionKind,
    #[validate(length(min = 1, message = "adjuster is required"))]
    pub adjuster: String,
    pub reason: Option<String>,
    pub revision_notes: Option<String>,
    pub notes: Option<String>,
    pub expected_version: Option<u64>,
}

impl DecisionRequest {
    pub fn into_command(self) -> (ClaimCommand, Option<u64>) {
        let command = match self.decision {
            DecisionKind::Approve => ClaimCommand::Approve {
                adjuster: self.adjuster,
                notes: self.notes,
            },
            DecisionKind::Reject => ClaimCommand::Reject {
                adjuster: self.adjuster,
                reason: self.reason.unwrap_or_default(),
                notes: self.notes,
            },
            DecisionKind::RequestRevision => ClaimCommand::RequestRevision {
                adjuster: self.adjuster,
                revision_notes: self.revision_notes.unwrap_or_default(),
                notes: self.notes,
            },
        };
        (command, self.expected_version)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub claim_number: String,
    pub policy_number: String,
    pub customer: CustomerContact,
    pub vehicle: Vehicle,
    pub vehicle_display: String,
    pub incident_date: Option<NaiveDate>,
    pub incident_description: Option<String>,
    pub status: ClaimStatus,
    pub priority: Priority,
    pub photos: Vec<Photo>,
    pub assessment: Option<Assessment>,
    pub costs: Option<CostSummary>,
    pub agent_notes: Option<String>,
    pub adjustment_reason: Option<String>,
    pub approval_status: ApprovalStatus,
    pub decision: Option<AdjusterDecision>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub last_assessment_failure: Option<AssessmentFailure>,
    pub upload_link: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id(),
            claim_number: claim.claim_number().to_string(),
            policy_number: claim.policy_number().to_string(),
            customer: claim.customer().clone(),
            vehicle_display: claim.vehicle().display(),
            vehicle: claim.vehicle().clone(),
            incident_date: claim.incident_date(),
            incident_description: claim.incident_description().map(str::to_string),
            status: claim.status(),
            priority: claim.priority(),
            photos: claim.photos().to_vec(),
            costs: claim.assessment().and_then(|a| a.cost_summary().ok()),
            assessment: claim.assessment().cloned(),
            agent_notes: claim.agent_notes().map(str::to_string),
            adjustment_reason: claim.adjustment_reason().map(str::to_string),
            approval_status: claim.approval_status(),
            decision: claim.decision().cloned(),
            reviewed_by: claim.reviewed_by().map(str::to_string),
            reviewed_at: claim.reviewed_at(),
            last_assessment_failure: claim.last_assessment_failure().cloned(),
            upload_link: claim.upload_link().map(str::to_string),
            version: claim.version(),
            created_at: claim.created_at(),
            updated_at: claim.updated_at(),
        }
    }
}

/// Dashboard row
#[derive(Debug, Serialize)]
pub struct ClaimSummaryResponse {
    pub id: ClaimId,
    pub claim_number: String,
    pub customer_name: String,
    pub vehicle: String,
    pub status: ClaimStatus,
    pub priority: Priority,
    pub photo_count: usize,
    pub estimated_cost: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimSummaryResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id(),
            claim_number: claim.claim_number().to_string(),
            customer_name: claim.customer().name.clone(),
            vehicle: claim.vehicle().display(),
            status: claim.status(),
            priority: claim.priority(),
            photo_count: claim.photos().len(),
            estimated_cost: claim.assessment().map(|a| a.estimated_cost().to_string()),
            created_at: claim.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub claim: ClaimResponse,
    pub receipt: DeliveryReceipt,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: JobId,
    pub claim_id: ClaimId,
    pub status: JobStatus,
}

impl From<JobSnapshot> for JobResponse {
    fn from(snapshot: JobSnapshot) -> Self {
        Self {
            job_id: snapshot.job_id,
            claim_id: snapshot.claim_id,
            status: snapshot.status,
        }
    }
}

/// Line path parameters
#[derive(Debug, Deserialize)]
pub struct LinePath {
    pub id: ClaimId,
    pub line_id: DamageLineId,
}

/// Photo path parameters
#[derive(Debug, Deserialize)]
pub struct PhotoPath {
    pub id: ClaimId,
    pub photo_id: PhotoId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_validation() {
        let request: CreateClaimRequest = serde_json::from_value(serde_json::json!({
            "policy_number": "",
            "customer_name": "A",
            "customer_email": "not-an-email",
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("policy_number"));
        assert!(fields.contains_key("customer_email"));
    }

    #[test]
    fn test_line_review_request_parses_edit() {
        let request: LineReviewRequest = serde_json::from_value(serde_json::json!({
            "action": "edit",
            "labor_hours": "2",
            "expected_version": 3,
        }))
        .unwrap();
        assert_eq!(request.expected_version, Some(3));
        match request.action {
            LineReviewAction::Edit(edit) => assert_eq!(edit.labor_hours, Some(dec!(2))),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_line_review_request_parses_priority() {
        let request: LineReviewRequest = serde_json::from_value(serde_json::json!({
            "action": "edit",
            "priority": "low",
        }))
        .unwrap();
        match request.action {
            LineReviewAction::Edit(edit) => {
                assert_eq!(edit.priority, Some(Priority::Low));
                assert!(!edit.is_empty());
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_list_query_status() {
        let query = ListClaimsQuery {
            status: Some("pending-review".into()),
        };
        assert_eq!(query.status().unwrap(), Some(ClaimStatus::PendingReview));

        let query = ListClaimsQuery {
            status: Some("archived".into()),
        };
        assert!(query.status().is_err());
    }

    #[test]
    fn test_reject_without_reason_becomes_empty_reason() {
        let request = DecisionRequest {
            decision: DecisionKind::Reject,
            adjuster: "adj".into(),
            reason: None,
            revision_notes: None,
            notes: None,
            expected_version: None,
        };
        let (command, _) = request.into_command();
        assert!(matches!(command, ClaimCommand::Reject { reason, .. } if reason.is_empty()));
    }
}
