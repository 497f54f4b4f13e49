//! Claim workflow state machine
//!
//! [`next_status`] is the single transition table. Every lifecycle change is
//! expressed as a [`ClaimCommand`] and applied through [`Claim::apply`],
//! which checks the current status first, then the command's guards, and
//! only then mutates. A rejected command leaves the claim untouched.
//!
//! ```text
//! AwaitingPhotos -> AiInProgress -> PendingReview -> PendingApproval -> Completed
//!                                        ^                 |
//!                                        |                 +--> Rejected
//!                                        |                 |
//!                                        +-- RevisionRequested <+
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use core_kernel::{DamageLineId, PhotoId};

use crate::assessment::{AgentStatus, Assessment, LineEdit, NegativeAmountPolicy};
use crate::claim::{
    non_blank, AdjusterDecision, ApprovalStatus, Claim, ClaimStatus, DecisionOutcome,
};
use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::photo::Photo;
use crate::ports::{AssessmentFailure, NotificationChannel, NotificationKind};

/// Default cap on photos per claim
pub const DEFAULT_MAX_PHOTOS: usize = 10;

/// External events that move a claim between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    PhotosReceived,
    AssessmentProduced,
    ReviewSubmitted,
    AdjusterApproved,
    AdjusterRejected,
    RevisionRequested,
    ReviewResumed,
}

impl WorkflowEvent {
    pub const ALL: [WorkflowEvent; 7] = [
        WorkflowEvent::PhotosReceived,
        WorkflowEvent::AssessmentProduced,
        WorkflowEvent::ReviewSubmitted,
        WorkflowEvent::AdjusterApproved,
        WorkflowEvent::AdjusterRejected,
        WorkflowEvent::RevisionRequested,
        WorkflowEvent::ReviewResumed,
    ];

    /// Verb phrase used in transition errors
    pub fn action(&self) -> &'static str {
        match self {
            WorkflowEvent::PhotosReceived => "receive photos",
            WorkflowEvent::AssessmentProduced => "attach an assessment",
            WorkflowEvent::ReviewSubmitted => "submit the review",
            WorkflowEvent::AdjusterApproved => "approve",
            WorkflowEvent::AdjusterRejected => "reject",
            WorkflowEvent::RevisionRequested => "request a revision",
            WorkflowEvent::ReviewResumed => "resume the review",
        }
    }
}

/// The transition table
pub fn next_status(from: ClaimStatus, event: WorkflowEvent) -> Option<ClaimStatus> {
    use ClaimStatus::*;
    use WorkflowEvent::*;

    match (from, event) {
        (AwaitingPhotos, PhotosReceived) => Some(AiInProgress),
        (AiInProgress, AssessmentProduced) => Some(PendingReview),
        (PendingReview, ReviewSubmitted) => Some(PendingApproval),
        (PendingApproval, AdjusterApproved) => Some(Completed),
        (PendingApproval, AdjusterRejected) => Some(Rejected),
        (PendingApproval, WorkflowEvent::RevisionRequested) => Some(ClaimStatus::RevisionRequested),
        (ClaimStatus::RevisionRequested, ReviewResumed) => Some(PendingReview),
        _ => None,
    }
}

/// Events accepted in the given status
pub fn allowed_events(from: ClaimStatus) -> Vec<WorkflowEvent> {
    WorkflowEvent::ALL
        .into_iter()
        .filter(|event| next_status(from, *event).is_some())
        .collect()
}

/// Tunable workflow guards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPolicy {
    /// Refuse review submission while any line has no agent status
    pub require_all_lines_reviewed: bool,
    pub negative_amounts: NegativeAmountPolicy,
    pub max_photos: usize,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            require_all_lines_reviewed: true,
            negative_amounts: NegativeAmountPolicy::Reject,
            max_photos: DEFAULT_MAX_PHOTOS,
        }
    }
}

/// Agent actions on a single damage line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LineReviewAction {
    /// Accept the AI figures
    Approve,
    /// Start adjusting the line
    BeginModification,
    /// Change parts cost, hours, priority or notes
    Edit(LineEdit),
    /// Finish adjusting the line
    SaveModifications,
    /// Discard adjustments and restore the AI figures
    Revert,
}

/// A request to change a claim
#[derive(Debug, Clone)]
pub enum ClaimCommand {
    AttachPhoto(Photo),
    /// Drop a photo before the assessment is produced; never the last one
    RemovePhoto(PhotoId),
    AttachAssessment(Assessment),
    RecordAssessmentFailure(AssessmentFailure),
    ReviewLine {
        line_id: DamageLineId,
        action: LineReviewAction,
    },
    SetAgentNotes {
        notes: String,
    },
    /// Discard every line adjustment and the stated adjustment reason
    ResetReview,
    SubmitReview {
        agent: String,
        adjustment_reason: Option<String>,
    },
    Approve {
        adjuster: String,
        notes: Option<String>,
    },
    Reject {
        adjuster: String,
        reason: String,
        notes: Option<String>,
    },
    RequestRevision {
        adjuster: String,
        revision_notes: String,
        notes: Option<String>,
    },
    ResumeReview {
        agent: String,
    },
    RecordNotification {
        kind: NotificationKind,
        channel: NotificationChannel,
        link: String,
    },
}

impl ClaimCommand {
    /// Command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ClaimCommand::AttachPhoto(_) => "attach_photo",
            ClaimCommand::RemovePhoto(_) => "remove_photo",
            ClaimCommand::AttachAssessment(_) => "attach_assessment",
            ClaimCommand::RecordAssessmentFailure(_) => "record_assessment_failure",
            ClaimCommand::ReviewLine { .. } => "review_line",
            ClaimCommand::SetAgentNotes { .. } => "set_agent_notes",
            ClaimCommand::ResetReview => "reset_review",
            ClaimCommand::SubmitReview { .. } => "submit_review",
            ClaimCommand::Approve { .. } => "approve",
            ClaimCommand::Reject { .. } => "reject",
            ClaimCommand::RequestRevision { .. } => "request_revision",
            ClaimCommand::ResumeReview { .. } => "resume_review",
            ClaimCommand::RecordNotification { .. } => "record_notification",
        }
    }
}

fn require_actor(actor: &str, role: &str) -> Result<(), ClaimError> {
    if actor.trim().is_empty() {
        return Err(ClaimError::validation(format!("{role} is required")));
    }
    Ok(())
}

impl Claim {
    /// The status `event` would move this claim to
    pub fn transition_for(&self, event: WorkflowEvent) -> Result<ClaimStatus, ClaimError> {
        next_status(self.status, event).ok_or(ClaimError::InvalidStatusTransition {
            from: self.status,
            action: event.action(),
        })
    }

    /// Applies a command, enforcing status and guards before any mutation
    pub fn apply(&mut self, command: ClaimCommand, policy: &WorkflowPolicy) -> Result<(), ClaimError> {
        match command {
            ClaimCommand::AttachPhoto(photo) => self.attach_photo(photo, policy),
            ClaimCommand::RemovePhoto(photo_id) => self.remove_photo(photo_id),
            ClaimCommand::AttachAssessment(assessment) => self.attach_assessment(assessment),
            ClaimCommand::RecordAssessmentFailure(failure) => self.record_assessment_failure(failure),
            ClaimCommand::ReviewLine { line_id, action } => self.review_line(line_id, action, policy),
            ClaimCommand::SetAgentNotes { notes } => self.set_agent_notes(notes),
            ClaimCommand::ResetReview => self.reset_review(),
            ClaimCommand::SubmitReview {
                agent,
                adjustment_reason,
            } => self.submit_review(agent, adjustment_reason, policy),
            ClaimCommand::Approve { adjuster, notes } => self.approve(adjuster, notes),
            ClaimCommand::Reject { adjuster, reason, notes } => self.reject(adjuster, reason, notes),
            ClaimCommand::RequestRevision {
                adjuster,
                revision_notes,
                notes,
            } => self.request_revision(adjuster, revision_notes, notes),
            ClaimCommand::ResumeReview { agent } => self.resume_review(agent),
            ClaimCommand::RecordNotification { kind, channel, link } => {
                self.record_notification(kind, channel, link)
            }
        }
    }

    fn attach_photo(&mut self, photo: Photo, policy: &WorkflowPolicy) -> Result<(), ClaimError> {
        let next = match self.status {
            ClaimStatus::AwaitingPhotos => self.transition_for(WorkflowEvent::PhotosReceived)?,
            ClaimStatus::AiInProgress => self.status,
            from => {
                return Err(ClaimError::InvalidStatusTransition {
                    from,
                    action: "attach photos",
                })
            }
        };
        if !photo.content_type.starts_with("image/") {
            return Err(ClaimError::validation(format!(
                "{} is not an image ({})",
                photo.filename, photo.content_type
            )));
        }
        if self.photos.len() >= policy.max_photos {
            return Err(ClaimError::PhotoLimitExceeded { max: policy.max_photos });
        }

        let photo_id = photo.id;
        self.photos.push(photo);
        self.status = next;
        self.touch();
        self.record(ClaimEvent::PhotoAttached {
            claim_id: self.id,
            photo_id,
            photo_count: self.photos.len(),
            timestamp: self.updated_at,
        });
        Ok(())
    }

    fn remove_photo(&mut self, photo_id: PhotoId) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::AiInProgress {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                action: "remove photos",
            });
        }
        let index = self
            .photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or_else(|| ClaimError::PhotoNotFound(photo_id.to_string()))?;
        if self.photos.len() == 1 {
            return Err(ClaimError::validation("cannot remove the only photo"));
        }

        self.photos.remove(index);
        self.touch();
        self.record(ClaimEvent::PhotoRemoved {
            claim_id: self.id,
            photo_id,
            photo_count: self.photos.len(),
            timestamp: self.updated_at,
        });
        Ok(())
    }

    fn attach_assessment(&mut self, assessment: Assessment) -> Result<(), ClaimError> {
        let next = self.transition_for(WorkflowEvent::AssessmentProduced)?;
        if self.photos.is_empty() {
            return Err(ClaimError::AssessmentFailed(AssessmentFailure::NoPhotos));
        }

        self.record(ClaimEvent::AssessmentAttached {
            claim_id: self.id,
            assessment_id: assessment.id(),
            estimated_cost: assessment.estimated_cost().amount(),
            line_count: assessment.lines().len(),
            timestamp: Utc::now(),
        });
        self.assessment = Some(assessment);
        self.last_assessment_failure = None;
        self.status = next;
        self.touch();
        Ok(())
    }

    fn record_assessment_failure(&mut self, failure: AssessmentFailure) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::AiInProgress {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                action: "record an assessment failure",
            });
        }

        self.record(ClaimEvent::AssessmentFailed {
            claim_id: self.id,
            reason: failure.to_string(),
            timestamp: Utc::now(),
        });
        self.last_assessment_failure = Some(failure);
        self.touch();
        Ok(())
    }

    fn review_line(
        &mut self,
        line_id: DamageLineId,
        action: LineReviewAction,
        policy: &WorkflowPolicy,
    ) -> Result<(), ClaimError> {
        self.ensure_editable()?;
        let assessment = self.assessment.as_mut().ok_or(ClaimError::AssessmentMissing)?;

        let line = match action {
            LineReviewAction::Approve => assessment.set_line_status(line_id, AgentStatus::Approved)?,
            LineReviewAction::BeginModification => {
                assessment.set_line_status(line_id, AgentStatus::Modifying)?
            }
            LineReviewAction::Edit(edit) => {
                assessment.edit_line(line_id, &edit, policy.negative_amounts)?
            }
            LineReviewAction::SaveModifications => {
                let current = assessment
                    .line(line_id)
                    .ok_or_else(|| ClaimError::DamageLineNotFound(line_id.to_string()))?;
                if current.agent_status() != Some(AgentStatus::Modifying) {
                    return Err(ClaimError::validation("line is not being modified"));
                }
                assessment.set_line_status(line_id, AgentStatus::Modified)?
            }
            LineReviewAction::Revert => assessment.revert_line(line_id)?,
        };

        let event = ClaimEvent::DamageLineReviewed {
            claim_id: self.id,
            line_id,
            agent_status: line.agent_status(),
            total_cost: line.total_cost().amount(),
            timestamp: Utc::now(),
        };
        self.record(event);
        self.touch();
        Ok(())
    }

    fn set_agent_notes(&mut self, notes: String) -> Result<(), ClaimError> {
        self.ensure_editable()?;
        self.agent_notes = non_blank(Some(notes));
        self.touch();
        Ok(())
    }

    fn reset_review(&mut self) -> Result<(), ClaimError> {
        self.ensure_editable()?;
        let assessment = self.assessment.as_mut().ok_or(ClaimError::AssessmentMissing)?;
        assessment.revert_all()?;
        let estimated_cost = assessment.estimated_cost().amount();

        self.adjustment_reason = None;
        self.touch();
        self.record(ClaimEvent::ReviewReset {
            claim_id: self.id,
            estimated_cost,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    fn submit_review(
        &mut self,
        agent: String,
        adjustment_reason: Option<String>,
        policy: &WorkflowPolicy,
    ) -> Result<(), ClaimError> {
        let next = self.transition_for(WorkflowEvent::ReviewSubmitted)?;
        require_actor(&agent, "agent")?;
        let assessment = self.assessment.as_ref().ok_or(ClaimError::AssessmentMissing)?;
        if policy.require_all_lines_reviewed {
            let unreviewed = assessment.unreviewed_lines().len();
            if unreviewed > 0 {
                return Err(ClaimError::ReviewIncomplete { unreviewed });
            }
        }
        let estimated_cost = assessment.estimated_cost().amount();

        let now = Utc::now();
        self.record(ClaimEvent::ReviewSubmitted {
            claim_id: self.id,
            agent: agent.clone(),
            estimated_cost,
            timestamp: now,
        });
        self.reviewed_by = Some(agent);
        self.reviewed_at = Some(now);
        self.adjustment_reason = non_blank(adjustment_reason);
        self.status = next;
        self.touch();
        Ok(())
    }

    fn approve(&mut self, adjuster: String, notes: Option<String>) -> Result<(), ClaimError> {
        let next = self.transition_for(WorkflowEvent::AdjusterApproved)?;
        require_actor(&adjuster, "adjuster")?;
        let final_estimate = self
            .assessment
            .as_ref()
            .ok_or(ClaimError::AssessmentMissing)?
            .estimated_cost();

        let now = Utc::now();
        self.record(ClaimEvent::ClaimApproved {
            claim_id: self.id,
            adjuster: adjuster.clone(),
            final_estimate: final_estimate.amount(),
            timestamp: now,
        });
        self.decision = Some(AdjusterDecision {
            outcome: DecisionOutcome::Approved,
            adjuster,
            reason: None,
            revision_notes: None,
            notes: non_blank(notes),
            final_estimate: Some(final_estimate),
            decided_at: now,
        });
        self.approval_status = ApprovalStatus::Approved;
        self.status = next;
        self.touch();
        Ok(())
    }

    fn reject(
        &mut self,
        adjuster: String,
        reason: String,
        notes: Option<String>,
    ) -> Result<(), ClaimError> {
        let next = self.transition_for(WorkflowEvent::AdjusterRejected)?;
        require_actor(&adjuster, "adjuster")?;
        if reason.trim().is_empty() {
            return Err(ClaimError::ReasonRequired);
        }

        let now = Utc::now();
        self.record(ClaimEvent::ClaimRejected {
            claim_id: self.id,
            adjuster: adjuster.clone(),
            reason: reason.clone(),
            timestamp: now,
        });
        self.decision = Some(AdjusterDecision {
            outcome: DecisionOutcome::Rejected,
            adjuster,
            reason: Some(reason),
            revision_notes: None,
            notes: non_blank(notes),
            final_estimate: None,
            decided_at: now,
        });
        self.approval_status = ApprovalStatus::Rejected;
        self.status = next;
        self.touch();
        Ok(())
    }

    fn request_revision(
        &mut self,
        adjuster: String,
        revision_notes: String,
        notes: Option<String>,
    ) -> Result<(), ClaimError> {
        let next = self.transition_for(WorkflowEvent::RevisionRequested)?;
        require_actor(&adjuster, "adjuster")?;
        if revision_notes.trim().is_empty() {
            return Err(ClaimError::RevisionNotesRequired);
        }

        let now = Utc::now();
        self.record(ClaimEvent::RevisionRequested {
            claim_id: self.id,
            adjuster: adjuster.clone(),
            revision_notes: revision_notes.clone(),
            timestamp: now,
        });
        self.decision = Some(AdjusterDecision {
            outcome: DecisionOutcome::RevisionRequested,
            adjuster,
            reason: None,
            revision_notes: Some(revision_notes),
            notes: non_blank(notes),
            final_estimate: None,
            decided_at: now,
        });
        self.approval_status = ApprovalStatus::RevisionRequested;
        self.status = next;
        self.touch();
        Ok(())
    }

    fn resume_review(&mut self, agent: String) -> Result<(), ClaimError> {
        let next = self.transition_for(WorkflowEvent::ReviewResumed)?;
        require_actor(&agent, "agent")?;

        self.record(ClaimEvent::ReviewResumed {
            claim_id: self.id,
            agent,
            timestamp: Utc::now(),
        });
        self.approval_status = ApprovalStatus::Pending;
        self.status = next;
        self.touch();
        Ok(())
    }

    fn record_notification(
        &mut self,
        kind: NotificationKind,
        channel: NotificationChannel,
        link: String,
    ) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::AwaitingPhotos {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                action: "request photos",
            });
        }

        self.record(ClaimEvent::UploadLinkSent {
            claim_id: self.id,
            kind,
            channel,
            timestamp: Utc::now(),
        });
        self.upload_link = Some(link);
        self.touch();
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::PendingReview {
            return Err(ClaimError::ClaimLocked { status: self.status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{standard_labor_rate, DamageLineDraft, RepairAction, Severity};
    use crate::claim::ClaimInput;
    use core_kernel::{Confidence, Currency, Money, PhotoId};
    use rust_decimal_macros::dec;

    fn photo() -> Photo {
        Photo::new(PhotoId::new(), "memory://photos/1", "front.jpg", "image/jpeg", 1024)
    }

    fn assessment() -> Assessment {
        Assessment::new(
            "Front bumper damage",
            Severity::Moderate,
            Confidence::new(92).unwrap(),
            standard_labor_rate(Currency::USD).unwrap(),
            vec![],
            vec![DamageLineDraft {
                part: "Front Bumper".into(),
                severity: Severity::Moderate,
                action: RepairAction::Replace,
                labor_hours: dec!(3.5),
                parts_cost: Money::new(dec!(450), Currency::USD),
                confidence: Confidence::new(94).unwrap(),
                evidence_reference: "CCC Valuescope".into(),
                priority: Default::default(),
            }],
        )
        .unwrap()
    }

    fn claim_in_review() -> Claim {
        let policy = WorkflowPolicy::default();
        let mut claim = Claim::open(ClaimInput::new("POL-1", "A"), "CLM-2024-001").unwrap();
        claim.apply(ClaimCommand::AttachPhoto(photo()), &policy).unwrap();
        claim.apply(ClaimCommand::AttachAssessment(assessment()), &policy).unwrap();
        claim
    }

    #[test]
    fn test_transition_table() {
        use ClaimStatus::*;
        let cases = [
            (AwaitingPhotos, WorkflowEvent::PhotosReceived, Some(AiInProgress)),
            (AiInProgress, WorkflowEvent::AssessmentProduced, Some(PendingReview)),
            (PendingReview, WorkflowEvent::ReviewSubmitted, Some(PendingApproval)),
            (PendingApproval, WorkflowEvent::AdjusterApproved, Some(Completed)),
            (PendingApproval, WorkflowEvent::AdjusterRejected, Some(Rejected)),
            (PendingApproval, WorkflowEvent::RevisionRequested, Some(RevisionRequested)),
            (RevisionRequested, WorkflowEvent::ReviewResumed, Some(PendingReview)),
            (Completed, WorkflowEvent::AdjusterApproved, None),
            (AwaitingPhotos, WorkflowEvent::AssessmentProduced, None),
            (PendingReview, WorkflowEvent::AdjusterApproved, None),
        ];
        for (from, event, expected) in cases {
            assert_eq!(next_status(from, event), expected, "{from} + {event:?}");
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        assert!(allowed_events(ClaimStatus::Completed).is_empty());
        assert!(allowed_events(ClaimStatus::Rejected).is_empty());
        assert_eq!(
            allowed_events(ClaimStatus::PendingApproval).len(),
            3
        );
    }

    #[test]
    fn test_submit_requires_reviewed_lines() {
        let mut claim = claim_in_review();
        let result = claim.apply(
            ClaimCommand::SubmitReview {
                agent: "agent-1".into(),
                adjustment_reason: None,
            },
            &WorkflowPolicy::default(),
        );
        assert!(matches!(result, Err(ClaimError::ReviewIncomplete { unreviewed: 1 })));
        assert_eq!(claim.status(), ClaimStatus::PendingReview);

        let lenient = WorkflowPolicy {
            require_all_lines_reviewed: false,
            ..Default::default()
        };
        claim
            .apply(ClaimCommand::SubmitReview {
                agent: "agent-1".into(),
                adjustment_reason: None,
            }, &lenient)
            .unwrap();
        assert_eq!(claim.status(), ClaimStatus::PendingApproval);
    }

    #[test]
    fn test_save_without_modifying_is_refused() {
        let mut claim = claim_in_review();
        let line_id = claim.assessment().unwrap().lines()[0].id();
        let result = claim.apply(
            ClaimCommand::ReviewLine {
                line_id,
                action: LineReviewAction::SaveModifications,
            },
            &WorkflowPolicy::default(),
        );
        assert!(matches!(result, Err(ClaimError::Validation(_))));
    }

    #[test]
    fn test_remove_photo_keeps_at_least_one() {
        let policy = WorkflowPolicy::default();
        let mut claim = Claim::open(ClaimInput::new("POL-1", "A"), "CLM-2024-001").unwrap();
        let first = photo();
        let first_id = first.id;
        claim.apply(ClaimCommand::AttachPhoto(first), &policy).unwrap();
        claim.apply(ClaimCommand::AttachPhoto(photo()), &policy).unwrap();

        claim.apply(ClaimCommand::RemovePhoto(first_id), &policy).unwrap();
        assert_eq!(claim.photos().len(), 1);
        assert!(claim.photos().iter().all(|p| p.id != first_id));

        let only = claim.photos()[0].id;
        let result = claim.apply(ClaimCommand::RemovePhoto(only), &policy);
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert_eq!(claim.photos().len(), 1);

        let result = claim.apply(ClaimCommand::RemovePhoto(PhotoId::new()), &policy);
        assert!(matches!(result, Err(ClaimError::PhotoNotFound(_))));
    }

    #[test]
    fn test_remove_photo_after_assessment_refused() {
        let mut claim = claim_in_review();
        let photo_id = claim.photos()[0].id;
        let result = claim.apply(ClaimCommand::RemovePhoto(photo_id), &WorkflowPolicy::default());
        assert!(matches!(result, Err(ClaimError::InvalidStatusTransition { .. })));
    }

    #[test]
    fn test_reset_review_discards_adjustments() {
        let policy = WorkflowPolicy::default();
        let mut claim = claim_in_review();
        let line_id = claim.assessment().unwrap().lines()[0].id();
        let edit = LineEdit {
            parts_cost: Some(dec!(600)),
            notes: Some("bracket cracked".into()),
            ..Default::default()
        };
        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id,
                    action: LineReviewAction::Edit(edit),
                },
                &policy,
            )
            .unwrap();
        claim.adjustment_reason = Some("hidden damage".into());
        assert!(claim.assessment().unwrap().has_adjustments());

        claim.apply(ClaimCommand::ResetReview, &policy).unwrap();
        let assessment = claim.assessment().unwrap();
        assert!(!assessment.has_adjustments());
        assert_eq!(assessment.lines()[0].agent_notes(), None);
        assert_eq!(assessment.unreviewed_lines().len(), 1);
        assert_eq!(claim.adjustment_reason(), None);
    }

    #[test]
    fn test_submit_records_adjustment_reason() {
        let lenient = WorkflowPolicy {
            require_all_lines_reviewed: false,
            ..Default::default()
        };
        let mut claim = claim_in_review();
        claim
            .apply(
                ClaimCommand::SubmitReview {
                    agent: "agent-1".into(),
                    adjustment_reason: Some("mounting points damaged".into()),
                },
                &lenient,
            )
            .unwrap();
        assert_eq!(claim.adjustment_reason(), Some("mounting points damaged"));
        assert_eq!(claim.reviewed_by(), Some("agent-1"));
    }

    #[test]
    fn test_photo_limit() {
        let policy = WorkflowPolicy {
            max_photos: 1,
            ..Default::default()
        };
        let mut claim = Claim::open(ClaimInput::new("POL-1", "A"), "CLM-2024-001").unwrap();
        claim.apply(ClaimCommand::AttachPhoto(photo()), &policy).unwrap();
        let result = claim.apply(ClaimCommand::AttachPhoto(photo()), &policy);
        assert!(matches!(result, Err(ClaimError::PhotoLimitExceeded { max: 1 })));
        assert_eq!(claim.photos().len(), 1);
    }

    #[test]
    fn test_non_image_rejected() {
        let mut claim = Claim::open(ClaimInput::new("POL-1", "A"), "CLM-2024-001").unwrap();
        let doc = Photo::new(PhotoId::new(), "memory://x", "estimate.pdf", "application/pdf", 10);
        let result = claim.apply(ClaimCommand::AttachPhoto(doc), &WorkflowPolicy::default());
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert_eq!(claim.status(), ClaimStatus::AwaitingPhotos);
    }

    #[test]
    fn test_assessment_failure_keeps_claim_in_progress() {
        let policy = WorkflowPolicy::default();
        let mut claim = Claim::open(ClaimInput::new("POL-1", "A"), "CLM-2024-001").unwrap();
        claim.apply(ClaimCommand::AttachPhoto(photo()), &policy).unwrap();
        claim
            .apply(
                ClaimCommand::RecordAssessmentFailure(AssessmentFailure::Timeout { after_ms: 100 }),
                &policy,
            )
            .unwrap();
        assert_eq!(claim.status(), ClaimStatus::AiInProgress);
        assert!(claim.last_assessment_failure().is_some());

        claim.apply(ClaimCommand::AttachAssessment(assessment()), &policy).unwrap();
        assert!(claim.last_assessment_failure().is_none());
    }
}
