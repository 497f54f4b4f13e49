//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Confidence, Currency, Money};
use domain_claims::{
    ClaimStatus, DamageLineDraft, LineEdit, Priority, RepairAction, Severity, WorkflowEvent,
    MAX_LABOR_HOURS,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for labor hours in hundredths up to 40h
pub fn labor_hours_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=4_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy for labor hours as an agent might type them: up to six
/// decimal places anywhere in the accepted range
pub fn raw_labor_hours_strategy() -> impl Strategy<Value = Decimal> {
    let max = MAX_LABOR_HOURS.mantissa() as i64 * 1_000_000;
    (0i64..=max).prop_map(|millionths| Decimal::new(millionths, 6))
}

/// Strategy for parts costs in cents up to $10,000
pub fn parts_cost_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for values below zero
pub fn negative_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

pub fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Minor),
        Just(Severity::Moderate),
        Just(Severity::Major),
        Just(Severity::Severe),
    ]
}

pub fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

pub fn repair_action_strategy() -> impl Strategy<Value = RepairAction> {
    prop_oneof![
        Just(RepairAction::Repair),
        Just(RepairAction::Replace),
        Just(RepairAction::TouchUp),
    ]
}

/// Strategy for valid USD damage line drafts
pub fn damage_line_draft_strategy() -> impl Strategy<Value = DamageLineDraft> {
    (
        "[A-Z][a-z]{2,12}( [A-Z][a-z]{2,8})?",
        severity_strategy(),
        repair_action_strategy(),
        labor_hours_strategy(),
        parts_cost_strategy(),
        0u8..=100u8,
        priority_strategy(),
    )
        .prop_map(|(part, severity, action, labor_hours, parts_cost, confidence, priority)| {
            DamageLineDraft {
                evidence_reference: format!("Parts catalog - {part}"),
                part,
                severity,
                action,
                labor_hours,
                parts_cost: Money::new(parts_cost, Currency::USD),
                confidence: Confidence::new(confidence).expect("confidence in range"),
                priority,
            }
        })
}

/// Strategy for one to eight drafts
pub fn damage_lines_strategy() -> impl Strategy<Value = Vec<DamageLineDraft>> {
    proptest::collection::vec(damage_line_draft_strategy(), 1..=8)
}

/// Strategy for non-negative edits that change at least one figure
///
/// Hours are drawn at full input precision so the two-place rounding is
/// exercised.
pub fn line_edit_strategy() -> impl Strategy<Value = LineEdit> {
    (
        proptest::option::of(parts_cost_strategy()),
        proptest::option::of(raw_labor_hours_strategy()),
    )
        .prop_filter("edit must change something", |(parts, hours)| {
            parts.is_some() || hours.is_some()
        })
        .prop_map(|(parts_cost, labor_hours)| LineEdit {
            parts_cost,
            labor_hours,
            ..Default::default()
        })
}

pub fn claim_status_strategy() -> impl Strategy<Value = ClaimStatus> {
    proptest::sample::select(ClaimStatus::ALL.to_vec())
}

pub fn workflow_event_strategy() -> impl Strategy<Value = WorkflowEvent> {
    proptest::sample::select(WorkflowEvent::ALL.to_vec())
}
