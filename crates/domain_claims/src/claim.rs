//! Claim aggregate
//!
//! A [`Claim`] is the consistency boundary for a single vehicle-damage case.
//! Descriptive fields (contact, vehicle, incident) are edited through
//! [`ClaimPatch`]; everything that moves the lifecycle goes through
//! `Claim::apply` in the workflow module.
//!
//! # Invariants
//!
//! - A claim has an assessment only once it is at or beyond PendingReview
//! - Photos are empty only while the claim is AwaitingPhotos
//! - `version` increases by one with every committed write

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, Money};

use crate::assessment::Assessment;
use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::photo::Photo;
use crate::ports::AssessmentFailure;

/// Claim lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    /// Opened, waiting for the customer to upload damage photos
    AwaitingPhotos,
    /// Photos received, AI assessment running
    AiInProgress,
    /// Assessment attached, agent reviewing line items
    PendingReview,
    /// Agent review submitted, waiting for an adjuster
    PendingApproval,
    /// Adjuster sent the claim back to the agent
    RevisionRequested,
    /// Approved by the adjuster
    Completed,
    /// Rejected by the adjuster
    Rejected,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 7] = [
        ClaimStatus::AwaitingPhotos,
        ClaimStatus::AiInProgress,
        ClaimStatus::PendingReview,
        ClaimStatus::PendingApproval,
        ClaimStatus::RevisionRequested,
        ClaimStatus::Completed,
        ClaimStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::AwaitingPhotos => "awaiting-photos",
            ClaimStatus::AiInProgress => "ai-in-progress",
            ClaimStatus::PendingReview => "pending-review",
            ClaimStatus::PendingApproval => "pending-approval",
            ClaimStatus::RevisionRequested => "revision-requested",
            ClaimStatus::Completed => "completed",
            ClaimStatus::Rejected => "rejected",
        }
    }

    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Completed | ClaimStatus::Rejected)
    }

    /// An assessment is expected to be attached in this status
    pub fn has_assessment(&self) -> bool {
        !matches!(self, ClaimStatus::AwaitingPhotos | ClaimStatus::AiInProgress)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ClaimError::validation(format!("unknown claim status: {s}")))
    }
}

/// Handling priority shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Outcome of the adjuster's review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    RevisionRequested,
}

/// Policyholder contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerContact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Insured vehicle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub year: Option<u16>,
    pub make: String,
    pub model: String,
    pub vin: Option<String>,
}

impl Vehicle {
    pub fn new(year: u16, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            year: Some(year),
            make: make.into(),
            model: model.into(),
            vin: None,
        }
    }

    pub fn with_vin(mut self, vin: impl Into<String>) -> Self {
        self.vin = Some(vin.into());
        self
    }

    /// "2022 Honda Accord"
    pub fn display(&self) -> String {
        let parts = [
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.make.clone(),
            self.model.clone(),
        ];
        parts
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Intake data for a new claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimInput {
    pub policy_number: String,
    pub customer: CustomerContact,
    #[serde(default)]
    pub vehicle: Vehicle,
    pub incident_date: Option<NaiveDate>,
    pub incident_description: Option<String>,
    pub priority: Option<Priority>,
}

impl ClaimInput {
    pub fn new(policy_number: impl Into<String>, customer_name: impl Into<String>) -> Self {
        Self {
            policy_number: policy_number.into(),
            customer: CustomerContact::new(customer_name),
            vehicle: Vehicle::default(),
            incident_date: None,
            incident_description: None,
            priority: None,
        }
    }

    /// Checks the fields intake cannot proceed without
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.policy_number.trim().is_empty() {
            return Err(ClaimError::validation("policy number is required"));
        }
        if self.customer.name.trim().is_empty() {
            return Err(ClaimError::validation("customer name is required"));
        }
        Ok(())
    }
}

/// Partial update of a claim's descriptive fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimPatch {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub vehicle: Option<Vehicle>,
    pub incident_date: Option<NaiveDate>,
    pub incident_description: Option<String>,
    pub priority: Option<Priority>,
    pub agent_notes: Option<String>,
}

impl ClaimPatch {
    pub fn is_empty(&self) -> bool {
        *self == ClaimPatch::default()
    }
}

/// What the adjuster decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    RevisionRequested,
}

/// The adjuster's recorded decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjusterDecision {
    pub outcome: DecisionOutcome,
    pub adjuster: String,
    pub reason: Option<String>,
    pub revision_notes: Option<String>,
    pub notes: Option<String>,
    pub final_estimate: Option<Money>,
    pub decided_at: DateTime<Utc>,
}

/// A vehicle-damage claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub(crate) id: ClaimId,
    pub(crate) claim_number: String,
    pub(crate) policy_number: String,
    pub(crate) customer: CustomerContact,
    pub(crate) vehicle: Vehicle,
    pub(crate) incident_date: Option<NaiveDate>,
    pub(crate) incident_description: Option<String>,
    pub(crate) status: ClaimStatus,
    pub(crate) priority: Priority,
    pub(crate) photos: Vec<Photo>,
    pub(crate) assessment: Option<Assessment>,
    pub(crate) agent_notes: Option<String>,
    pub(crate) adjustment_reason: Option<String>,
    pub(crate) approval_status: ApprovalStatus,
    pub(crate) decision: Option<AdjusterDecision>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) reviewed_at: Option<DateTime<Utc>>,
    pub(crate) last_assessment_failure: Option<AssessmentFailure>,
    pub(crate) upload_link: Option<String>,
    pub(crate) version: u64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) events: Vec<ClaimEvent>,
}

impl Claim {
    /// Opens a new claim from validated intake data
    pub fn open(input: ClaimInput, claim_number: impl Into<String>) -> Result<Self, ClaimError> {
        input.validate()?;
        let now = Utc::now();
        let id = ClaimId::new_v7();
        let claim_number = claim_number.into();

        let mut claim = Self {
            id,
            claim_number: claim_number.clone(),
            policy_number: input.policy_number.trim().to_string(),
            customer: input.customer,
            vehicle: input.vehicle,
            incident_date: input.incident_date,
            incident_description: input.incident_description,
            status: ClaimStatus::AwaitingPhotos,
            priority: input.priority.unwrap_or_default(),
            photos: Vec::new(),
            assessment: None,
            agent_notes: None,
            adjustment_reason: None,
            approval_status: ApprovalStatus::Pending,
            decision: None,
            reviewed_by: None,
            reviewed_at: None,
            last_assessment_failure: None,
            upload_link: None,
            version: 0,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };
        claim.record(ClaimEvent::ClaimOpened {
            claim_id: id,
            claim_number,
            policy_number: claim.policy_number.clone(),
            timestamp: now,
        });
        Ok(claim)
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn claim_number(&self) -> &str {
        &self.claim_number
    }

    pub fn policy_number(&self) -> &str {
        &self.policy_number
    }

    pub fn customer(&self) -> &CustomerContact {
        &self.customer
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn incident_date(&self) -> Option<NaiveDate> {
        self.incident_date
    }

    pub fn incident_description(&self) -> Option<&str> {
        self.incident_description.as_deref()
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        self.assessment.as_ref()
    }

    pub fn agent_notes(&self) -> Option<&str> {
        self.agent_notes.as_deref()
    }

    /// Why the agent changed the AI figures, as given on submission
    pub fn adjustment_reason(&self) -> Option<&str> {
        self.adjustment_reason.as_deref()
    }

    pub fn approval_status(&self) -> ApprovalStatus {
        self.approval_status
    }

    pub fn decision(&self) -> Option<&AdjusterDecision> {
        self.decision.as_ref()
    }

    pub fn reviewed_by(&self) -> Option<&str> {
        self.reviewed_by.as_deref()
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    pub fn last_assessment_failure(&self) -> Option<&AssessmentFailure> {
        self.last_assessment_failure.as_ref()
    }

    pub fn upload_link(&self) -> Option<&str> {
        self.upload_link.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Pending domain events not yet drained
    pub fn events(&self) -> &[ClaimEvent] {
        &self.events
    }

    /// Drains the pending domain events
    pub fn take_events(&mut self) -> Vec<ClaimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Applies a descriptive patch
    ///
    /// Agent notes are only editable during review; the remaining fields can
    /// be corrected until the claim reaches a terminal state.
    pub fn apply_patch(&mut self, patch: ClaimPatch) -> Result<(), ClaimError> {
        if patch.is_empty() {
            return Err(ClaimError::validation("patch changes nothing"));
        }
        if self.status.is_terminal() {
            return Err(ClaimError::ClaimLocked { status: self.status });
        }
        if patch.agent_notes.is_some() && self.status != ClaimStatus::PendingReview {
            return Err(ClaimError::ClaimLocked { status: self.status });
        }
        if let Some(name) = &patch.customer_name {
            if name.trim().is_empty() {
                return Err(ClaimError::validation("customer name is required"));
            }
        }

        if let Some(name) = patch.customer_name {
            self.customer.name = name;
        }
        if let Some(email) = patch.customer_email {
            self.customer.email = Some(email);
        }
        if let Some(phone) = patch.customer_phone {
            self.customer.phone = Some(phone);
        }
        if let Some(vehicle) = patch.vehicle {
            self.vehicle = vehicle;
        }
        if let Some(date) = patch.incident_date {
            self.incident_date = Some(date);
        }
        if let Some(description) = patch.incident_description {
            self.incident_description = Some(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(notes) = patch.agent_notes {
            self.agent_notes = non_blank(Some(notes));
        }
        self.touch();
        Ok(())
    }

    /// Checks the structural invariants between status, photos and assessment
    pub fn check_invariants(&self) -> bool {
        let photos_ok = !self.photos.is_empty() || self.status == ClaimStatus::AwaitingPhotos;
        let assessment_ok = self.assessment.is_none() || self.status.has_assessment();
        photos_ok && assessment_ok
    }

    pub(crate) fn record(&mut self, event: ClaimEvent) {
        self.events.push(event);
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Treats whitespace-only text as absent
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
