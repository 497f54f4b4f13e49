//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use core_kernel::{Confidence, HourlyRate};
use domain_claims::{
    Assessment, ClaimInput, CustomerContact, DamageLineDraft, EvidenceKind, EvidenceSource,
    Priority, Severity, Vehicle,
};

use crate::fixtures::{LineFixtures, MoneyFixtures};

/// Builder for intake data
pub struct ClaimInputBuilder {
    input: ClaimInput,
}

impl Default for ClaimInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimInputBuilder {
    /// Starts from a minimal intake with a 2022 Honda Accord
    pub fn new() -> Self {
        let mut input = ClaimInput::new("POL-TEST-0001", "Test Customer");
        input.vehicle = Vehicle::new(2022, "Honda", "Accord");
        Self { input }
    }

    /// Sets the policy number
    pub fn with_policy_number(mut self, number: impl Into<String>) -> Self {
        self.input.policy_number = number.into();
        self
    }

    /// Sets the customer name, keeping any contact details
    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.input.customer.name = name.into();
        self
    }

    /// Sets the customer email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.input.customer.email = Some(email.into());
        self
    }

    /// Sets the customer phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.input.customer.phone = Some(phone.into());
        self
    }

    /// Replaces the whole customer record
    pub fn with_customer(mut self, customer: CustomerContact) -> Self {
        self.input.customer = customer;
        self
    }

    /// Sets the vehicle
    pub fn with_vehicle(mut self, vehicle: Vehicle) -> Self {
        self.input.vehicle = vehicle;
        self
    }

    /// Sets the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.input.priority = Some(priority);
        self
    }

    /// Builds the intake
    pub fn build(self) -> ClaimInput {
        self.input
    }
}

/// Builder for assessments
pub struct AssessmentBuilder {
    summary: String,
    severity: Severity,
    confidence: u8,
    labor_rate: HourlyRate,
    evidence: Vec<EvidenceSource>,
    lines: Vec<DamageLineDraft>,
}

impl Default for AssessmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentBuilder {
    /// An empty assessment at the standard labor rate
    pub fn new() -> Self {
        Self {
            summary: "Test assessment".to_string(),
            severity: Severity::Moderate,
            confidence: 90,
            labor_rate: MoneyFixtures::labor_rate(),
            evidence: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// The three-line front collision estimate
    pub fn front_collision() -> Self {
        Self::new()
            .with_summary("Front bumper damage, headlight crack")
            .with_line(LineFixtures::front_bumper())
            .with_line(LineFixtures::headlight())
            .with_line(LineFixtures::paint())
            .with_evidence(
                EvidenceKind::Database,
                "CCC Valuescope",
                "Honda Accord 2022 - Front Bumper Assembly",
            )
    }

    /// Sets the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the overall severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the labor rate
    pub fn with_labor_rate(mut self, rate: HourlyRate) -> Self {
        self.labor_rate = rate;
        self
    }

    /// Adds a damage line
    pub fn with_line(mut self, line: DamageLineDraft) -> Self {
        self.lines.push(line);
        self
    }

    /// Replaces all damage lines
    pub fn with_lines(mut self, lines: Vec<DamageLineDraft>) -> Self {
        self.lines = lines;
        self
    }

    /// Adds a cited source at 90% confidence
    pub fn with_evidence(mut self, kind: EvidenceKind, source: &str, reference: &str) -> Self {
        let confidence = Confidence::new(90).expect("valid confidence");
        self.evidence
            .push(EvidenceSource::new(kind, source, reference, confidence));
        self
    }

    /// Builds the assessment
    ///
    /// # Panics
    ///
    /// Panics if a line is invalid; use [`AssessmentBuilder::try_build`]
    /// to test rejection.
    pub fn build(self) -> Assessment {
        self.try_build().expect("valid assessment")
    }

    /// Builds the assessment, returning any validation error
    pub fn try_build(self) -> Result<Assessment, domain_claims::ClaimError> {
        Assessment::new(
            self.summary,
            self.severity,
            Confidence::new(self.confidence)?,
            self.labor_rate,
            self.evidence,
            self.lines,
        )
    }
}
