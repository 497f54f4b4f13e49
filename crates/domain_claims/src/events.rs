//! Domain events for the claim aggregate
//!
//! Every accepted command records one event. The service drains them after
//! a successful commit and writes them to the audit log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AssessmentId, ClaimId, DamageLineId, PhotoId};

use crate::assessment::AgentStatus;
use crate::ports::{NotificationChannel, NotificationKind};

/// Domain events emitted by the Claim aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// Intake completed
    ClaimOpened {
        claim_id: ClaimId,
        claim_number: String,
        policy_number: String,
        timestamp: DateTime<Utc>,
    },

    /// A damage photo was stored against the claim
    PhotoAttached {
        claim_id: ClaimId,
        photo_id: PhotoId,
        photo_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A photo was taken off the claim before assessment
    PhotoRemoved {
        claim_id: ClaimId,
        photo_id: PhotoId,
        photo_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// AI assessment completed
    AssessmentAttached {
        claim_id: ClaimId,
        assessment_id: AssessmentId,
        estimated_cost: Decimal,
        line_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// AI assessment failed; the claim waits for a retry
    AssessmentFailed {
        claim_id: ClaimId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The agent acted on a damage line
    DamageLineReviewed {
        claim_id: ClaimId,
        line_id: DamageLineId,
        agent_status: Option<AgentStatus>,
        total_cost: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// The agent discarded every line adjustment
    ReviewReset {
        claim_id: ClaimId,
        estimated_cost: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Agent review submitted for approval
    ReviewSubmitted {
        claim_id: ClaimId,
        agent: String,
        estimated_cost: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Adjuster approved the claim
    ClaimApproved {
        claim_id: ClaimId,
        adjuster: String,
        final_estimate: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Adjuster rejected the claim
    ClaimRejected {
        claim_id: ClaimId,
        adjuster: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Adjuster sent the claim back to the agent
    RevisionRequested {
        claim_id: ClaimId,
        adjuster: String,
        revision_notes: String,
        timestamp: DateTime<Utc>,
    },

    /// Agent picked a returned claim back up
    ReviewResumed {
        claim_id: ClaimId,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    /// Upload link or reminder sent to the customer
    UploadLinkSent {
        claim_id: ClaimId,
        kind: NotificationKind,
        channel: NotificationChannel,
        timestamp: DateTime<Utc>,
    },
}

impl ClaimEvent {
    /// Returns the claim ID associated with this event
    pub fn claim_id(&self) -> ClaimId {
        match self {
            ClaimEvent::ClaimOpened { claim_id, .. }
            | ClaimEvent::PhotoAttached { claim_id, .. }
            | ClaimEvent::PhotoRemoved { claim_id, .. }
            | ClaimEvent::AssessmentAttached { claim_id, .. }
            | ClaimEvent::AssessmentFailed { claim_id, .. }
            | ClaimEvent::DamageLineReviewed { claim_id, .. }
            | ClaimEvent::ReviewReset { claim_id, .. }
            | ClaimEvent::ReviewSubmitted { claim_id, .. }
            | ClaimEvent::ClaimApproved { claim_id, .. }
            | ClaimEvent::ClaimRejected { claim_id, .. }
            | ClaimEvent::RevisionRequested { claim_id, .. }
            | ClaimEvent::ReviewResumed { claim_id, .. }
            | ClaimEvent::UploadLinkSent { claim_id, .. } => *claim_id,
        }
    }

    /// Returns when the event occurred
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::ClaimOpened { timestamp, .. }
            | ClaimEvent::PhotoAttached { timestamp, .. }
            | ClaimEvent::PhotoRemoved { timestamp, .. }
            | ClaimEvent::AssessmentAttached { timestamp, .. }
            | ClaimEvent::AssessmentFailed { timestamp, .. }
            | ClaimEvent::DamageLineReviewed { timestamp, .. }
            | ClaimEvent::ReviewReset { timestamp, .. }
            | ClaimEvent::ReviewSubmitted { timestamp, .. }
            | ClaimEvent::ClaimApproved { timestamp, .. }
            | ClaimEvent::ClaimRejected { timestamp, .. }
            | ClaimEvent::RevisionRequested { timestamp, .. }
            | ClaimEvent::ReviewResumed { timestamp, .. }
            | ClaimEvent::UploadLinkSent { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::ClaimOpened { .. } => "ClaimOpened",
            ClaimEvent::PhotoAttached { .. } => "PhotoAttached",
            ClaimEvent::PhotoRemoved { .. } => "PhotoRemoved",
            ClaimEvent::AssessmentAttached { .. } => "AssessmentAttached",
            ClaimEvent::AssessmentFailed { .. } => "AssessmentFailed",
            ClaimEvent::DamageLineReviewed { .. } => "DamageLineReviewed",
            ClaimEvent::ReviewReset { .. } => "ReviewReset",
            ClaimEvent::ReviewSubmitted { .. } => "ReviewSubmitted",
            ClaimEvent::ClaimApproved { .. } => "ClaimApproved",
            ClaimEvent::ClaimRejected { .. } => "ClaimRejected",
            ClaimEvent::RevisionRequested { .. } => "RevisionRequested",
            ClaimEvent::ReviewResumed { .. } => "ReviewResumed",
            ClaimEvent::UploadLinkSent { .. } => "UploadLinkSent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let claim_id = ClaimId::new();
        let now = Utc::now();
        let event = ClaimEvent::ClaimRejected {
            claim_id,
            adjuster: "adj-7".into(),
            reason: "cost-too-high".into(),
            timestamp: now,
        };
        assert_eq!(event.claim_id(), claim_id);
        assert_eq!(event.timestamp(), now);
        assert_eq!(event.event_type(), "ClaimRejected");
    }
}
