//! Canned assessments and demo claims
//!
//! Assessments are keyed by claim number so the dashboard's demo claims
//! always get the same analysis. Anything else falls back to the front
//! collision fixture.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Confidence, HourlyRate, Money};

use crate::assessment::{
    Assessment, DamageLineDraft, EvidenceKind, EvidenceSource, RepairAction, RiskFactor,
    RiskImpact, Severity,
};
use crate::claim::{ClaimInput, ClaimStatus, CustomerContact, Priority, Vehicle};
use crate::error::ClaimError;

/// One damage line of a canned assessment
#[derive(Debug, Clone)]
pub struct FixtureLine {
    pub part: &'static str,
    pub severity: Severity,
    pub action: RepairAction,
    pub labor_hours: Decimal,
    pub parts_cost: Decimal,
    pub confidence: u8,
    pub evidence_reference: &'static str,
    pub priority: Priority,
}

/// A canned AI assessment
#[derive(Debug, Clone)]
pub struct AssessmentFixture {
    pub summary: &'static str,
    pub severity: Severity,
    pub confidence: u8,
    pub evidence: Vec<(EvidenceKind, &'static str, &'static str, u8)>,
    pub risk_factors: Vec<(&'static str, RiskImpact, &'static str)>,
    pub lines: Vec<FixtureLine>,
}

impl AssessmentFixture {
    /// Builds the assessment at the given labor rate
    pub fn build(&self, labor_rate: HourlyRate) -> Result<Assessment, ClaimError> {
        let currency = labor_rate.currency();
        let evidence = self
            .evidence
            .iter()
            .map(|(kind, source, reference, confidence)| {
                Ok(EvidenceSource::new(*kind, *source, *reference, Confidence::new(*confidence)?))
            })
            .collect::<Result<Vec<_>, ClaimError>>()?;
        let drafts = self
            .lines
            .iter()
            .map(|line| {
                Ok(DamageLineDraft {
                    part: line.part.to_string(),
                    severity: line.severity,
                    action: line.action,
                    labor_hours: line.labor_hours,
                    parts_cost: Money::new(line.parts_cost, currency),
                    confidence: Confidence::new(line.confidence)?,
                    evidence_reference: line.evidence_reference.to_string(),
                    priority: line.priority,
                })
            })
            .collect::<Result<Vec<_>, ClaimError>>()?;

        let risk_factors = self
            .risk_factors
            .iter()
            .map(|(factor, impact, description)| RiskFactor::new(*factor, *impact, *description))
            .collect();

        Ok(Assessment::new(
            self.summary,
            self.severity,
            Confidence::new(self.confidence)?,
            labor_rate,
            evidence,
            drafts,
        )?
        .with_risk_factors(risk_factors))
    }
}

/// Front-end collision on a 2022 Honda Accord
pub fn front_collision() -> AssessmentFixture {
    AssessmentFixture {
        summary: "Front bumper damage, headlight crack",
        severity: Severity::Moderate,
        confidence: 92,
        evidence: vec![
            (EvidenceKind::Database, "CCC Valuescope", "Honda Accord 2022 - Front Bumper Assembly", 94),
            (EvidenceKind::Manual, "Mitchell Labor Guide", "Body Panel Replacement - Standard", 89),
            (EvidenceKind::Database, "Audatex Parts Catalog", "OEM Headlight Assembly - Driver Side", 91),
        ],
        risk_factors: vec![
            (
                "Hidden structural damage",
                RiskImpact::Medium,
                "Bumper reinforcement bar may be bent behind the cover",
            ),
            (
                "Sensor calibration",
                RiskImpact::Low,
                "Parking sensors in the bumper may need recalibration",
            ),
        ],
        lines: vec![
            FixtureLine {
                part: "Front Bumper",
                severity: Severity::Moderate,
                action: RepairAction::Replace,
                labor_hours: dec!(3.5),
                parts_cost: dec!(450),
                confidence: 94,
                evidence_reference: "CCC Valuescope - Honda Accord 2022 Front Bumper Assembly",
                priority: Priority::High,
            },
            FixtureLine {
                part: "Headlight Assembly (Driver)",
                severity: Severity::Minor,
                action: RepairAction::Replace,
                labor_hours: dec!(1.5),
                parts_cost: dec!(320),
                confidence: 89,
                evidence_reference: "Audatex Parts Catalog - OEM Headlight Assembly",
                priority: Priority::Medium,
            },
            FixtureLine {
                part: "Paint Work",
                severity: Severity::Minor,
                action: RepairAction::TouchUp,
                labor_hours: dec!(2.0),
                parts_cost: dec!(85),
                confidence: 91,
                evidence_reference: "Mitchell Labor Guide - Paint & Refinish Standard",
                priority: Priority::Low,
            },
        ],
    }
}

/// Hail damage across hood and roof
pub fn hail_damage() -> AssessmentFixture {
    AssessmentFixture {
        summary: "Hail damage to hood and roof, multiple dents",
        severity: Severity::Moderate,
        confidence: 87,
        evidence: vec![
            (EvidenceKind::Manual, "Mitchell Labor Guide", "Paintless Dent Repair - Hail", 88),
            (EvidenceKind::Database, "CCC Valuescope", "Ford F-150 2023 - Hood Panel", 86),
        ],
        risk_factors: vec![(
            "Paint cracking",
            RiskImpact::Medium,
            "Deeper dents may crack the clear coat and need conventional repair",
        )],
        lines: vec![
            FixtureLine {
                part: "Hood",
                severity: Severity::Moderate,
                action: RepairAction::Repair,
                labor_hours: dec!(6.0),
                parts_cost: dec!(0),
                confidence: 88,
                evidence_reference: "Mitchell Labor Guide - Paintless Dent Repair",
                priority: Priority::High,
            },
            FixtureLine {
                part: "Roof Panel",
                severity: Severity::Moderate,
                action: RepairAction::Repair,
                labor_hours: dec!(8.0),
                parts_cost: dec!(0),
                confidence: 85,
                evidence_reference: "Mitchell Labor Guide - Paintless Dent Repair",
                priority: Priority::High,
            },
            FixtureLine {
                part: "Paint Work",
                severity: Severity::Minor,
                action: RepairAction::TouchUp,
                labor_hours: dec!(3.0),
                parts_cost: dec!(150),
                confidence: 90,
                evidence_reference: "Mitchell Labor Guide - Paint & Refinish Standard",
                priority: Priority::Low,
            },
        ],
    }
}

/// Rear quarter panel and taillight on a 2020 BMW X5
pub fn rear_quarter_panel() -> AssessmentFixture {
    AssessmentFixture {
        summary: "Rear quarter panel damage, taillight replacement",
        severity: Severity::Major,
        confidence: 89,
        evidence: vec![
            (EvidenceKind::Database, "Audatex Parts Catalog", "BMW X5 2020 - Rear Quarter Panel", 90),
            (EvidenceKind::Manual, "Mitchell Labor Guide", "Quarter Panel Sectioning", 87),
        ],
        risk_factors: vec![
            (
                "Frame damage",
                RiskImpact::High,
                "Quarter panel impact can reach the unibody rail",
            ),
            (
                "Parts availability",
                RiskImpact::Medium,
                "OEM quarter panels for this model are often back-ordered",
            ),
        ],
        lines: vec![
            FixtureLine {
                part: "Rear Quarter Panel (Passenger)",
                severity: Severity::Major,
                action: RepairAction::Replace,
                labor_hours: dec!(8.0),
                parts_cost: dec!(1200),
                confidence: 88,
                evidence_reference: "Audatex Parts Catalog - OEM Quarter Panel",
                priority: Priority::High,
            },
            FixtureLine {
                part: "Taillight Assembly",
                severity: Severity::Minor,
                action: RepairAction::Replace,
                labor_hours: dec!(1.0),
                parts_cost: dec!(410),
                confidence: 93,
                evidence_reference: "Audatex Parts Catalog - OEM Taillight Assembly",
                priority: Priority::Medium,
            },
            FixtureLine {
                part: "Paint Work",
                severity: Severity::Moderate,
                action: RepairAction::Repair,
                labor_hours: dec!(4.0),
                parts_cost: dec!(180),
                confidence: 90,
                evidence_reference: "Mitchell Labor Guide - Paint & Refinish Standard",
                priority: Priority::Medium,
            },
        ],
    }
}

/// Mirror and door scuff on a 2019 Subaru Outback
pub fn side_mirror() -> AssessmentFixture {
    AssessmentFixture {
        summary: "Side mirror replacement, door scratch",
        severity: Severity::Minor,
        confidence: 95,
        evidence: vec![(
            EvidenceKind::Database,
            "CCC Valuescope",
            "Subaru Outback 2019 - Side Mirror Assembly",
            96,
        )],
        risk_factors: vec![(
            "Mirror wiring",
            RiskImpact::Low,
            "Heated mirror harness may need replacing with the assembly",
        )],
        lines: vec![
            FixtureLine {
                part: "Side Mirror (Driver)",
                severity: Severity::Minor,
                action: RepairAction::Replace,
                labor_hours: dec!(0.5),
                parts_cost: dec!(280),
                confidence: 96,
                evidence_reference: "CCC Valuescope - Subaru Outback 2019 Side Mirror Assembly",
                priority: Priority::High,
            },
            FixtureLine {
                part: "Driver Door",
                severity: Severity::Minor,
                action: RepairAction::TouchUp,
                labor_hours: dec!(1.5),
                parts_cost: dec!(60),
                confidence: 93,
                evidence_reference: "Mitchell Labor Guide - Paint & Refinish Standard",
                priority: Priority::Low,
            },
        ],
    }
}

/// A dashboard claim and the status it should be driven to
#[derive(Debug, Clone)]
pub struct DemoClaim {
    pub input: ClaimInput,
    pub target: ClaimStatus,
    pub photos: Vec<&'static str>,
    pub assessment: Option<AssessmentFixture>,
}

fn demo(
    policy_number: &str,
    customer: CustomerContact,
    vehicle: Vehicle,
    incident: (i32, u32, u32),
    description: &str,
    priority: Priority,
) -> ClaimInput {
    ClaimInput {
        policy_number: policy_number.to_string(),
        customer,
        vehicle,
        incident_date: NaiveDate::from_ymd_opt(incident.0, incident.1, incident.2),
        incident_description: Some(description.to_string()),
        priority: Some(priority),
    }
}

/// The six claims shown on a fresh dashboard, in creation order
pub fn demo_claims() -> Vec<DemoClaim> {
    vec![
        DemoClaim {
            input: demo(
                "POL-789456",
                CustomerContact::new("Sarah Johnson")
                    .with_email("sarah.johnson@email.com")
                    .with_phone("(555) 123-4567"),
                Vehicle::new(2022, "Honda", "Accord").with_vin("1HGCV1F30NA123456"),
                (2024, 1, 15),
                "Rear-ended at traffic light, damage to front bumper and headlight",
                Priority::High,
            ),
            target: ClaimStatus::PendingReview,
            photos: vec!["front-damage-1.jpg", "headlight-damage.jpg", "license-plate.jpg"],
            assessment: Some(front_collision()),
        },
        DemoClaim {
            input: demo(
                "POL-123789",
                CustomerContact::new("Michael Chen")
                    .with_email("michael.chen@email.com")
                    .with_phone("(555) 987-6543"),
                Vehicle::new(2021, "Toyota", "Camry").with_vin("4T1C11AK5MU123456"),
                (2024, 1, 14),
                "Side-swiped in parking lot, damage to driver side door and mirror",
                Priority::Medium,
            ),
            target: ClaimStatus::AwaitingPhotos,
            photos: vec![],
            assessment: None,
        },
        DemoClaim {
            input: demo(
                "POL-456123",
                CustomerContact::new("Emily Rodriguez")
                    .with_email("emily.rodriguez@email.com")
                    .with_phone("(555) 456-7890"),
                Vehicle::new(2023, "Ford", "F-150").with_vin("1FTFW1E50NFA12345"),
                (2024, 1, 13),
                "Hail damage to hood and roof, multiple dents",
                Priority::Low,
            ),
            target: ClaimStatus::AiInProgress,
            photos: vec![
                "hood-damage-1.jpg",
                "roof-damage-1.jpg",
                "damage-closeup.jpg",
                "vehicle-overview.jpg",
                "side-view.jpg",
            ],
            assessment: None,
        },
        DemoClaim {
            input: demo(
                "POL-987654",
                CustomerContact::new("David Kim"),
                Vehicle::new(2020, "BMW", "X5"),
                (2024, 1, 12),
                "Backed into a pole, rear quarter panel and taillight damaged",
                Priority::High,
            ),
            target: ClaimStatus::PendingApproval,
            photos: vec![
                "rear-quarter-1.jpg",
                "rear-quarter-2.jpg",
                "taillight.jpg",
                "bumper-corner.jpg",
                "overview-rear.jpg",
                "overview-side.jpg",
                "vin-plate.jpg",
            ],
            assessment: Some(rear_quarter_panel()),
        },
        DemoClaim {
            input: demo(
                "POL-555888",
                CustomerContact::new("Lisa Thompson"),
                Vehicle::new(2019, "Subaru", "Outback"),
                (2024, 1, 11),
                "Mirror clipped by passing vehicle, scratch along driver door",
                Priority::Low,
            ),
            target: ClaimStatus::Completed,
            photos: vec!["mirror-1.jpg", "mirror-2.jpg", "door-scratch.jpg", "overview.jpg"],
            assessment: Some(side_mirror()),
        },
        DemoClaim {
            input: demo(
                "POL-777999",
                CustomerContact::new("Robert Martinez"),
                Vehicle::new(2022, "Chevrolet", "Silverado"),
                (2024, 1, 16),
                "Tailgate dented in loading dock incident",
                Priority::Medium,
            ),
            target: ClaimStatus::AwaitingPhotos,
            photos: vec![],
            assessment: None,
        },
    ]
}

/// Fixture used for a claim number, if one is registered
pub fn fixture_for(claim_number: &str) -> Option<AssessmentFixture> {
    let index = claim_number.rsplit('-').next()?.parse::<usize>().ok()?;
    match index {
        1 => Some(front_collision()),
        3 => Some(hail_damage()),
        4 => Some(rear_quarter_panel()),
        5 => Some(side_mirror()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::standard_labor_rate;
    use core_kernel::Currency;

    #[test]
    fn test_front_collision_totals() {
        let assessment = front_collision()
            .build(standard_labor_rate(Currency::USD).unwrap())
            .unwrap();
        let totals: Vec<_> = assessment
            .lines()
            .iter()
            .map(|l| l.total_cost().amount())
            .collect();
        assert_eq!(totals, vec![dec!(975), dec!(545), dec!(385)]);
        assert_eq!(assessment.estimated_cost().amount(), dec!(1905));
        assert_eq!(assessment.evidence_sources().len(), 3);
        assert_eq!(assessment.risk_factors().len(), 2);
        assert_eq!(assessment.lines()[0].priority(), Priority::High);
    }

    #[test]
    fn test_every_fixture_builds_consistently() {
        let rate = standard_labor_rate(Currency::USD).unwrap();
        for fixture in [front_collision(), hail_damage(), rear_quarter_panel(), side_mirror()] {
            let assessment = fixture.build(rate).unwrap();
            assert!(assessment.is_consistent(), "{}", fixture.summary);
        }
    }

    #[test]
    fn test_fixture_for_claim_number() {
        assert!(fixture_for("CLM-2024-003").is_some());
        assert!(fixture_for("CLM-2024-002").is_none());
        assert!(fixture_for("garbage").is_none());
    }

    #[test]
    fn test_demo_claims_are_valid() {
        let claims = demo_claims();
        assert_eq!(claims.len(), 6);
        for claim in &claims {
            claim.input.validate().unwrap();
            assert_eq!(claim.assessment.is_some(), claim.target.has_assessment());
        }
    }
}
