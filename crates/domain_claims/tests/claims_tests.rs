//! Comprehensive tests for domain_claims

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, DamageLineId, Money};

use domain_claims::claim::{ApprovalStatus, Claim, ClaimInput, ClaimStatus, DecisionOutcome};
use domain_claims::events::ClaimEvent;
use domain_claims::workflow::{
    allowed_events, next_status, ClaimCommand, LineReviewAction, WorkflowEvent, WorkflowPolicy,
};
use domain_claims::{AgentStatus, ClaimError, LineEdit, NegativeAmountPolicy};

use test_utils::{
    assert_assessment_consistent, assert_guard_violation, assert_invalid_transition,
    assert_money_eq, assert_status, claim_status_strategy, damage_lines_strategy,
    labor_hours_strategy, line_edit_strategy, negative_decimal_strategy, parts_cost_strategy,
    raw_labor_hours_strategy, workflow_event_strategy, AssessmentBuilder, ClaimFixtures, LineFixtures, PhotoFixtures,
};

fn policy() -> WorkflowPolicy {
    WorkflowPolicy::default()
}

fn open(input: ClaimInput) -> Claim {
    Claim::open(input, "CLM-2024-001").unwrap()
}

fn claim_with_photo() -> Claim {
    let mut claim = open(ClaimFixtures::minimal_input());
    claim
        .apply(ClaimCommand::AttachPhoto(PhotoFixtures::jpeg("front.jpg")), &policy())
        .unwrap();
    claim
}

fn claim_in_review(builder: AssessmentBuilder) -> Claim {
    let mut claim = claim_with_photo();
    claim
        .apply(ClaimCommand::AttachAssessment(builder.build()), &policy())
        .unwrap();
    claim
}

fn line_ids(claim: &Claim) -> Vec<DamageLineId> {
    claim
        .assessment()
        .unwrap()
        .lines()
        .iter()
        .map(|l| l.id())
        .collect()
}

fn approve_all(claim: &mut Claim) {
    for line_id in line_ids(claim) {
        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id,
                    action: LineReviewAction::Approve,
                },
                &policy(),
            )
            .unwrap();
    }
}

fn claim_pending_approval() -> Claim {
    let mut claim = claim_in_review(AssessmentBuilder::front_collision());
    approve_all(&mut claim);
    claim
        .apply(ClaimCommand::SubmitReview { agent: "agent.smith".into(), adjustment_reason: None }, &policy())
        .unwrap();
    claim
}

fn edit_hours(line_id: DamageLineId, hours: Decimal) -> ClaimCommand {
    ClaimCommand::ReviewLine {
        line_id,
        action: LineReviewAction::Edit(LineEdit {
            labor_hours: Some(hours),
            ..Default::default()
        }),
    }
}

// ============================================================================
// Lifecycle Scenarios
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_intake_to_edited_estimate() {
        let mut claim = open(ClaimInput::new("POL-1", "A"));
        assert_status(&claim, ClaimStatus::AwaitingPhotos);
        assert!(claim.photos().is_empty());

        claim
            .apply(ClaimCommand::AttachPhoto(PhotoFixtures::jpeg("front.jpg")), &policy())
            .unwrap();
        assert_status(&claim, ClaimStatus::AiInProgress);

        let assessment = AssessmentBuilder::new()
            .with_line(LineFixtures::front_bumper())
            .build();
        claim
            .apply(ClaimCommand::AttachAssessment(assessment), &policy())
            .unwrap();
        assert_status(&claim, ClaimStatus::PendingReview);

        let line = &claim.assessment().unwrap().lines()[0];
        assert_money_eq(&line.labor_cost(), dec!(525));
        assert_money_eq(&line.total_cost(), dec!(975));
        assert_money_eq(&claim.assessment().unwrap().estimated_cost(), dec!(975));

        let line_id = line.id();
        claim.apply(edit_hours(line_id, dec!(2)), &policy()).unwrap();

        let assessment = claim.assessment().unwrap();
        let line = assessment.line(line_id).unwrap();
        assert_money_eq(&line.labor_cost(), dec!(300));
        assert_money_eq(&line.total_cost(), dec!(750));
        assert_money_eq(&assessment.estimated_cost(), dec!(750));
        assert_eq!(line.agent_status(), Some(AgentStatus::Modifying));
        assert!(claim.check_invariants());
    }

    #[test]
    fn test_full_approval() {
        let mut claim = claim_pending_approval();
        assert_status(&claim, ClaimStatus::PendingApproval);
        assert_eq!(claim.reviewed_by(), Some("agent.smith"));
        assert!(claim.reviewed_at().is_some());

        claim
            .apply(
                ClaimCommand::Approve {
                    adjuster: "adjuster.jones".into(),
                    notes: Some("Within guidelines".into()),
                },
                &policy(),
            )
            .unwrap();

        assert_status(&claim, ClaimStatus::Completed);
        assert_eq!(claim.approval_status(), ApprovalStatus::Approved);
        let decision = claim.decision().unwrap();
        assert_eq!(decision.outcome, DecisionOutcome::Approved);
        assert_eq!(decision.final_estimate, Some(Money::new(dec!(1905), Currency::USD)));
    }

    #[test]
    fn test_rejection_locks_lines() {
        let mut claim = claim_pending_approval();
        claim
            .apply(
                ClaimCommand::Reject {
                    adjuster: "adjuster.jones".into(),
                    reason: "cost-too-high".into(),
                    notes: None,
                },
                &policy(),
            )
            .unwrap();

        assert_status(&claim, ClaimStatus::Rejected);
        assert_eq!(claim.approval_status(), ApprovalStatus::Rejected);
        assert_eq!(claim.decision().unwrap().reason.as_deref(), Some("cost-too-high"));

        let line_id = line_ids(&claim)[0];
        let before = claim.assessment().unwrap().estimated_cost();
        let result = claim.apply(edit_hours(line_id, dec!(1)), &policy());
        assert!(matches!(
            result,
            Err(ClaimError::ClaimLocked { status: ClaimStatus::Rejected })
        ));
        assert_eq!(claim.assessment().unwrap().estimated_cost(), before);
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut claim = claim_pending_approval();
        let result = claim.apply(
            ClaimCommand::Reject {
                adjuster: "adjuster.jones".into(),
                reason: "   ".into(),
                notes: None,
            },
            &policy(),
        );
        assert!(matches!(result, Err(ClaimError::ReasonRequired)));
        assert_status(&claim, ClaimStatus::PendingApproval);
    }

    #[test]
    fn test_revision_loop_returns_to_review() {
        let mut claim = claim_pending_approval();
        claim
            .apply(
                ClaimCommand::RequestRevision {
                    adjuster: "adjuster.jones".into(),
                    revision_notes: "Headlight should be repaired, not replaced".into(),
                    notes: None,
                },
                &policy(),
            )
            .unwrap();
        assert_status(&claim, ClaimStatus::RevisionRequested);
        assert_eq!(claim.approval_status(), ApprovalStatus::RevisionRequested);

        // Lines stay locked until the agent picks the claim back up
        let line_id = line_ids(&claim)[1];
        assert_guard_violation(claim.apply(edit_hours(line_id, dec!(1)), &policy()));

        claim
            .apply(ClaimCommand::ResumeReview { agent: "agent.smith".into() }, &policy())
            .unwrap();
        assert_status(&claim, ClaimStatus::PendingReview);
        assert_eq!(claim.approval_status(), ApprovalStatus::Pending);

        claim.apply(edit_hours(line_id, dec!(1)), &policy()).unwrap();
        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id,
                    action: LineReviewAction::SaveModifications,
                },
                &policy(),
            )
            .unwrap();
        claim
            .apply(ClaimCommand::SubmitReview { agent: "agent.smith".into(), adjustment_reason: None }, &policy())
            .unwrap();
        assert_status(&claim, ClaimStatus::PendingApproval);
        assert_money_eq(&claim.assessment().unwrap().estimated_cost(), dec!(1830));
    }

    #[test]
    fn test_revision_requires_notes() {
        let mut claim = claim_pending_approval();
        let result = claim.apply(
            ClaimCommand::RequestRevision {
                adjuster: "adjuster.jones".into(),
                revision_notes: String::new(),
                notes: None,
            },
            &policy(),
        );
        assert!(matches!(result, Err(ClaimError::RevisionNotesRequired)));
    }

    #[test]
    fn test_approving_completed_claim_fails_loudly() {
        let mut claim = claim_pending_approval();
        let approve = ClaimCommand::Approve {
            adjuster: "adjuster.jones".into(),
            notes: None,
        };
        claim.apply(approve.clone(), &policy()).unwrap();
        let decided_at = claim.decision().unwrap().decided_at;

        assert_invalid_transition(claim.apply(approve, &policy()), ClaimStatus::Completed);
        assert_eq!(claim.decision().unwrap().decided_at, decided_at);
    }

    #[test]
    fn test_approving_without_assessment_is_refused() {
        let mut claim = claim_with_photo();
        assert_invalid_transition(
            claim.apply(
                ClaimCommand::Approve {
                    adjuster: "adjuster.jones".into(),
                    notes: None,
                },
                &policy(),
            ),
            ClaimStatus::AiInProgress,
        );
    }

    #[test]
    fn test_assessment_needs_photos() {
        let mut claim = open(ClaimFixtures::minimal_input());
        let result = claim.apply(
            ClaimCommand::AttachAssessment(AssessmentBuilder::front_collision().build()),
            &policy(),
        );
        assert_invalid_transition(result, ClaimStatus::AwaitingPhotos);
    }

    #[test]
    fn test_submit_with_unreviewed_lines() {
        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        let first = line_ids(&claim)[0];
        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id: first,
                    action: LineReviewAction::Approve,
                },
                &policy(),
            )
            .unwrap();

        let result = claim.apply(ClaimCommand::SubmitReview { agent: "agent".into(), adjustment_reason: None }, &policy());
        assert!(matches!(result, Err(ClaimError::ReviewIncomplete { unreviewed: 2 })));

        let lenient = WorkflowPolicy {
            require_all_lines_reviewed: false,
            ..WorkflowPolicy::default()
        };
        claim
            .apply(ClaimCommand::SubmitReview { agent: "agent".into(), adjustment_reason: None }, &lenient)
            .unwrap();
        assert_status(&claim, ClaimStatus::PendingApproval);
    }

    #[test]
    fn test_events_follow_the_lifecycle() {
        let mut claim = claim_pending_approval();
        claim
            .apply(
                ClaimCommand::Approve {
                    adjuster: "adjuster.jones".into(),
                    notes: None,
                },
                &policy(),
            )
            .unwrap();

        let events = claim.take_events();
        assert!(matches!(events.first(), Some(ClaimEvent::ClaimOpened { .. })));
        assert!(matches!(events.last(), Some(ClaimEvent::ClaimApproved { .. })));
        assert!(events.iter().all(|e| e.claim_id() == claim.id()));
        assert!(claim.events().is_empty());
    }
}

// ============================================================================
// Damage Line Review Tests
// ============================================================================

mod line_review_tests {
    use super::*;

    #[test]
    fn test_negative_parts_cost_rejected() {
        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        let line_id = line_ids(&claim)[0];
        let result = claim.apply(
            ClaimCommand::ReviewLine {
                line_id,
                action: LineReviewAction::Edit(LineEdit {
                    parts_cost: Some(dec!(-10)),
                    labor_hours: Some(dec!(1)),
                    ..Default::default()
                }),
            },
            &policy(),
        );
        assert!(matches!(result, Err(ClaimError::NegativeAmount { .. })));

        let line = claim.assessment().unwrap().line(line_id).unwrap();
        assert_money_eq(&line.parts_cost(), dec!(450));
        assert_eq!(line.labor_hours(), dec!(3.5));
        assert_eq!(line.agent_status(), None);
    }

    #[test]
    fn test_negative_hours_clamped_when_configured() {
        let clamp = WorkflowPolicy {
            negative_amounts: NegativeAmountPolicy::Clamp,
            ..WorkflowPolicy::default()
        };
        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        let line_id = line_ids(&claim)[0];
        claim.apply(edit_hours(line_id, dec!(-2)), &clamp).unwrap();

        let line = claim.assessment().unwrap().line(line_id).unwrap();
        assert_eq!(line.labor_hours(), Decimal::ZERO);
        assert_money_eq(&line.total_cost(), dec!(450));
    }

    #[test]
    fn test_modify_save_and_revert() {
        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        let line_id = line_ids(&claim)[2];

        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id,
                    action: LineReviewAction::BeginModification,
                },
                &policy(),
            )
            .unwrap();
        claim.apply(edit_hours(line_id, dec!(1)), &policy()).unwrap();
        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id,
                    action: LineReviewAction::SaveModifications,
                },
                &policy(),
            )
            .unwrap();

        let summary = claim.assessment().unwrap().cost_summary().unwrap();
        assert_money_eq(&summary.total, dec!(1755));
        assert_money_eq(&summary.delta, dec!(-150));
        assert_eq!(
            claim.assessment().unwrap().line(line_id).unwrap().agent_status(),
            Some(AgentStatus::Modified)
        );

        claim
            .apply(
                ClaimCommand::ReviewLine {
                    line_id,
                    action: LineReviewAction::Revert,
                },
                &policy(),
            )
            .unwrap();
        let assessment = claim.assessment().unwrap();
        assert_money_eq(&assessment.estimated_cost(), dec!(1905));
        assert!(!assessment.has_adjustments());
        assert_eq!(assessment.line(line_id).unwrap().agent_status(), None);
    }

    #[test]
    fn test_overflowing_hours_rejected_without_change() {
        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        let line_id = line_ids(&claim)[0];
        let before = claim.assessment().unwrap().clone();

        let result = claim.apply(edit_hours(line_id, Decimal::MAX), &policy());
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert_eq!(claim.assessment().unwrap(), &before);

        let result = claim.apply(
            ClaimCommand::ReviewLine {
                line_id,
                action: LineReviewAction::Edit(LineEdit {
                    parts_cost: Some(Decimal::MAX),
                    ..Default::default()
                }),
            },
            &policy(),
        );
        assert!(result.is_err());
        assert_eq!(claim.assessment().unwrap(), &before);
    }

    #[test]
    fn test_unknown_line_is_not_found() {
        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        let result = claim.apply(edit_hours(DamageLineId::new(), dec!(1)), &policy());
        assert!(matches!(result, Err(ClaimError::DamageLineNotFound(_))));
    }

    #[test]
    fn test_notes_only_in_review() {
        let mut claim = claim_with_photo();
        assert_guard_violation(
            claim.apply(ClaimCommand::SetAgentNotes { notes: "x".into() }, &policy()),
        );

        let mut claim = claim_in_review(AssessmentBuilder::front_collision());
        claim
            .apply(
                ClaimCommand::SetAgentNotes {
                    notes: "Customer confirmed no prior damage".into(),
                },
                &policy(),
            )
            .unwrap();
        assert_eq!(claim.agent_notes(), Some("Customer confirmed no prior damage"));
    }
}

// ============================================================================
// Transition Table Tests
// ============================================================================

mod transition_tests {
    use super::*;

    #[test]
    fn test_every_status_but_terminal_has_a_way_out() {
        for status in ClaimStatus::ALL {
            assert_eq!(
                allowed_events(status).is_empty(),
                status.is_terminal(),
                "{status}"
            );
        }
    }

    #[test]
    fn test_happy_path_chain() {
        let path = [
            WorkflowEvent::PhotosReceived,
            WorkflowEvent::AssessmentProduced,
            WorkflowEvent::ReviewSubmitted,
            WorkflowEvent::AdjusterApproved,
        ];
        let end = path
            .iter()
            .try_fold(ClaimStatus::AwaitingPhotos, |status, event| next_status(status, *event));
        assert_eq!(end, Some(ClaimStatus::Completed));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_assessment_costs_are_derived(drafts in damage_lines_strategy()) {
            let assessment = AssessmentBuilder::new().with_lines(drafts).build();
            assert_assessment_consistent(&assessment);
            for line in assessment.lines() {
                prop_assert_eq!(
                    line.total_cost().amount(),
                    line.parts_cost().amount() + line.labor_hours() * dec!(150)
                );
            }
        }

        #[test]
        fn prop_edits_keep_costs_consistent(
            drafts in damage_lines_strategy(),
            edits in proptest::collection::vec((any::<prop::sample::Index>(), line_edit_strategy()), 1..6),
        ) {
            let mut claim = claim_in_review(AssessmentBuilder::new().with_lines(drafts));
            let ids = line_ids(&claim);
            for (index, edit) in edits {
                let line_id = ids[index.index(ids.len())];
                claim
                    .apply(
                        ClaimCommand::ReviewLine { line_id, action: LineReviewAction::Edit(edit) },
                        &policy(),
                    )
                    .unwrap();
            }
            let assessment = claim.assessment().unwrap();
            assert_assessment_consistent(assessment);
            let summary = assessment.cost_summary().unwrap();
            prop_assert_eq!(summary.parts_total + summary.labor_total, summary.total);
            prop_assert_eq!(summary.original_total + summary.delta, summary.total);
        }

        #[test]
        fn prop_edited_total_is_parts_plus_rounded_labor(
            drafts in damage_lines_strategy(),
            parts in parts_cost_strategy(),
            hours in raw_labor_hours_strategy(),
        ) {
            let mut claim = claim_in_review(AssessmentBuilder::new().with_lines(drafts));
            let line_id = line_ids(&claim)[0];
            let edit = LineEdit { parts_cost: Some(parts), labor_hours: Some(hours), ..Default::default() };
            claim
                .apply(ClaimCommand::ReviewLine { line_id, action: LineReviewAction::Edit(edit) }, &policy())
                .unwrap();

            let line = claim.assessment().unwrap().line(line_id).unwrap();
            prop_assert_eq!(line.labor_hours(), hours.round_dp(2));
            prop_assert_eq!(
                line.total_cost().amount(),
                line.parts_cost().amount() + line.labor_hours() * dec!(150)
            );
            assert_assessment_consistent(claim.assessment().unwrap());
        }

        #[test]
        fn prop_negative_edits_change_nothing(
            drafts in damage_lines_strategy(),
            negative in negative_decimal_strategy(),
            hours in labor_hours_strategy(),
            parts_first in any::<bool>(),
        ) {
            let mut claim = claim_in_review(AssessmentBuilder::new().with_lines(drafts));
            let line_id = line_ids(&claim)[0];
            let before = claim.assessment().unwrap().clone();

            let edit = if parts_first {
                LineEdit { parts_cost: Some(negative), labor_hours: Some(hours), ..Default::default() }
            } else {
                LineEdit { labor_hours: Some(negative), ..Default::default() }
            };
            let result = claim.apply(
                ClaimCommand::ReviewLine { line_id, action: LineReviewAction::Edit(edit) },
                &policy(),
            );
            prop_assert!(result.is_err());
            prop_assert_eq!(claim.assessment().unwrap(), &before);
        }

        #[test]
        fn prop_revert_restores_original(
            drafts in damage_lines_strategy(),
            parts in parts_cost_strategy(),
            hours in labor_hours_strategy(),
        ) {
            let mut claim = claim_in_review(AssessmentBuilder::new().with_lines(drafts));
            let original = claim.assessment().unwrap().estimated_cost();
            let line_id = line_ids(&claim)[0];
            let edit = LineEdit { parts_cost: Some(parts), labor_hours: Some(hours), ..Default::default() };
            claim
                .apply(ClaimCommand::ReviewLine { line_id, action: LineReviewAction::Edit(edit) }, &policy())
                .unwrap();
            claim
                .apply(ClaimCommand::ReviewLine { line_id, action: LineReviewAction::Revert }, &policy())
                .unwrap();
            prop_assert_eq!(claim.assessment().unwrap().estimated_cost(), original);
        }

        #[test]
        fn prop_terminal_states_accept_no_events(
            status in claim_status_strategy(),
            event in workflow_event_strategy(),
        ) {
            if status.is_terminal() {
                prop_assert_eq!(next_status(status, event), None);
            }
            if let Some(next) = next_status(status, event) {
                prop_assert_ne!(next, status);
            }
        }
    }
}
