//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_claims::{Assessment, Claim, ClaimError, ClaimStatus};
use rust_decimal::Decimal;

/// Asserts that a Money value has exactly the given amount
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts every line total and the aggregate follow the cost rules
///
/// # Panics
///
/// Panics naming the first line whose figures do not add up.
pub fn assert_assessment_consistent(assessment: &Assessment) {
    let rate = assessment.labor_rate();
    for line in assessment.lines() {
        assert_eq!(
            line.labor_cost(),
            rate.cost_for(line.labor_hours()).expect("labor cost in range"),
            "{}: labor cost {} does not match {}h at {}",
            line.part(),
            line.labor_cost(),
            line.labor_hours(),
            rate.per_hour()
        );
        assert_eq!(
            line.total_cost(),
            line.parts_cost() + line.labor_cost(),
            "{}: total {} is not parts {} plus labor {}",
            line.part(),
            line.total_cost(),
            line.parts_cost(),
            line.labor_cost()
        );
    }
    let sum = assessment
        .lines()
        .iter()
        .fold(Money::zero(assessment.currency()), |acc, l| acc + l.total_cost());
    assert_eq!(
        assessment.estimated_cost(),
        sum,
        "Estimated cost {} is not the sum of line totals {}",
        assessment.estimated_cost(),
        sum
    );
}

/// Asserts that a claim is in the expected status
pub fn assert_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status(),
        expected,
        "Claim {} is {}, expected {}",
        claim.claim_number(),
        claim.status(),
        expected
    );
}

/// Asserts that a result failed with an invalid transition from `from`
pub fn assert_invalid_transition<T: std::fmt::Debug>(result: Result<T, ClaimError>, from: ClaimStatus) {
    match result {
        Err(ClaimError::InvalidStatusTransition { from: actual, .. }) => assert_eq!(
            actual, from,
            "Transition refused from {}, expected {}",
            actual, from
        ),
        other => panic!("Expected an invalid transition from {from}, got {other:?}"),
    }
}

/// Asserts that a result failed a workflow guard
pub fn assert_guard_violation<T: std::fmt::Debug>(result: Result<T, ClaimError>) {
    match result {
        Err(e) if e.is_guard_violation() => {}
        other => panic!("Expected a guard violation, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::AssessmentBuilder;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assert_money_eq() {
        assert_money_eq(&Money::new(dec!(975), Currency::USD), dec!(975));
    }

    #[test]
    #[should_panic(expected = "Money amount mismatch")]
    fn test_assert_money_eq_fails() {
        assert_money_eq(&Money::new(dec!(975), Currency::USD), dec!(750));
    }

    #[test]
    fn test_assert_assessment_consistent() {
        assert_assessment_consistent(&AssessmentBuilder::front_collision().build());
    }
}
