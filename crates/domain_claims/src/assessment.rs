//! AI damage assessment and cost aggregation
//!
//! An [`Assessment`] is produced once AI processing completes and holds one
//! [`DamageLine`] per affected part. Line costs are derived, never set:
//!
//! ```text
//! labor_cost     = labor_hours * labor_rate
//! total_cost     = parts_cost + labor_cost
//! estimated_cost = sum(line.total_cost)
//! ```
//!
//! The only mutation path is [`Assessment::edit_line`] and friends, which
//! recompute the affected line and the aggregate before returning. Labor
//! hours are held to two decimal places, so with a labor rate in whole
//! cents every derived figure is exact.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AssessmentId, Confidence, Currency, DamageLineId, HourlyRate, Money, MoneyError};

use crate::claim::Priority;
use crate::error::ClaimError;

/// Standard body-shop labor rate per hour
pub const STANDARD_LABOR_RATE: Decimal = dec!(150);

/// Decimal places kept on labor hours
pub const LABOR_HOURS_DP: u32 = 2;

/// Largest labor estimate accepted for one line
pub const MAX_LABOR_HOURS: Decimal = dec!(1000);

/// Largest parts cost accepted for one line
pub const MAX_PARTS_COST: Decimal = dec!(10000000);

/// The standard labor rate in the given currency
pub fn standard_labor_rate(currency: Currency) -> Result<HourlyRate, MoneyError> {
    HourlyRate::new(Money::new(STANDARD_LABOR_RATE, currency))
}

/// Damage severity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Major => "Major",
            Severity::Severe => "Severe",
        };
        f.write_str(label)
    }
}

/// What the shop will do to the part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepairAction {
    Repair,
    Replace,
    TouchUp,
}

/// Agent review state of a single damage line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Accepted as estimated by the AI
    Approved,
    /// Agent is adjusting the figures
    Modifying,
    /// Agent adjustments saved
    Modified,
}

/// Where a cited estimate comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    /// Parts or labor database lookup
    Database,
    /// Manual repair or labor guide
    Manual,
}

/// A cited reference backing the estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub kind: EvidenceKind,
    pub source: String,
    pub reference: String,
    pub confidence: Confidence,
}

impl EvidenceSource {
    pub fn new(
        kind: EvidenceKind,
        source: impl Into<String>,
        reference: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            reference: reference.into(),
            confidence,
        }
    }
}

/// How much a risk factor could move the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskImpact {
    Low,
    Medium,
    High,
}

/// Something the AI flagged that could change the repair cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub impact: RiskImpact,
    pub description: String,
}

impl RiskFactor {
    pub fn new(factor: impl Into<String>, impact: RiskImpact, description: impl Into<String>) -> Self {
        Self {
            factor: factor.into(),
            impact,
            description: description.into(),
        }
    }
}

/// How the analysis was produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub photos_analyzed: usize,
    pub models_used: Vec<String>,
    pub processing_time_ms: u64,
}

/// What to do when an edit would make a cost input negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeAmountPolicy {
    /// Refuse the edit and leave the line untouched
    #[default]
    Reject,
    /// Apply the edit with the negative value replaced by zero
    Clamp,
}

/// A damage line as proposed by the AI, before costs are derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageLineDraft {
    pub part: String,
    pub severity: Severity,
    pub action: RepairAction,
    pub labor_hours: Decimal,
    pub parts_cost: Money,
    pub confidence: Confidence,
    pub evidence_reference: String,
    #[serde(default)]
    pub priority: Priority,
}

/// One repairable part's cost and labor breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageLine {
    id: DamageLineId,
    part: String,
    severity: Severity,
    action: RepairAction,
    labor_hours: Decimal,
    parts_cost: Money,
    labor_cost: Money,
    total_cost: Money,
    confidence: Confidence,
    evidence_reference: String,
    priority: Priority,
    agent_status: Option<AgentStatus>,
    agent_notes: Option<String>,
    original_labor_hours: Decimal,
    original_parts_cost: Money,
    original_priority: Priority,
}

impl DamageLine {
    fn from_draft(draft: DamageLineDraft, rate: &HourlyRate) -> Result<Self, ClaimError> {
        if draft.part.trim().is_empty() {
            return Err(ClaimError::validation("damage line part name is required"));
        }
        if draft.labor_hours.is_sign_negative() && !draft.labor_hours.is_zero() {
            return Err(ClaimError::NegativeAmount {
                field: "labor_hours",
                value: draft.labor_hours,
            });
        }
        if draft.parts_cost.is_negative() {
            return Err(ClaimError::NegativeAmount {
                field: "parts_cost",
                value: draft.parts_cost.amount(),
            });
        }
        let labor_hours = normalize_hours(draft.labor_hours)?;
        check_limit("parts_cost", draft.parts_cost.amount(), MAX_PARTS_COST)?;

        let mut line = Self {
            id: DamageLineId::new_v7(),
            part: draft.part,
            severity: draft.severity,
            action: draft.action,
            labor_hours,
            parts_cost: draft.parts_cost,
            labor_cost: Money::zero(rate.currency()),
            total_cost: Money::zero(rate.currency()),
            confidence: draft.confidence,
            evidence_reference: draft.evidence_reference,
            priority: draft.priority,
            agent_status: None,
            agent_notes: None,
            original_labor_hours: labor_hours,
            original_parts_cost: draft.parts_cost,
            original_priority: draft.priority,
        };
        // Also surfaces a parts cost in a different currency from the rate
        line.recompute(rate)?;
        Ok(line)
    }

    fn recompute(&mut self, rate: &HourlyRate) -> Result<(), ClaimError> {
        self.labor_cost = rate.cost_for(self.labor_hours)?;
        self.total_cost = self.parts_cost.checked_add(&self.labor_cost)?;
        Ok(())
    }

    fn reverted(&self, rate: &HourlyRate) -> Result<Self, ClaimError> {
        let mut line = self.clone();
        line.labor_hours = line.original_labor_hours;
        line.parts_cost = line.original_parts_cost;
        line.priority = line.original_priority;
        line.agent_status = None;
        line.agent_notes = None;
        line.recompute(rate)?;
        Ok(line)
    }

    pub fn id(&self) -> DamageLineId {
        self.id
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn action(&self) -> RepairAction {
        self.action
    }

    pub fn labor_hours(&self) -> Decimal {
        self.labor_hours
    }

    pub fn parts_cost(&self) -> Money {
        self.parts_cost
    }

    pub fn labor_cost(&self) -> Money {
        self.labor_cost
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn evidence_reference(&self) -> &str {
        &self.evidence_reference
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn agent_status(&self) -> Option<AgentStatus> {
        self.agent_status
    }

    pub fn agent_notes(&self) -> Option<&str> {
        self.agent_notes.as_deref()
    }

    /// True if the agent changed hours or parts cost away from the AI figures
    pub fn is_adjusted(&self) -> bool {
        self.labor_hours != self.original_labor_hours || self.parts_cost != self.original_parts_cost
    }
}

/// A partial edit of a damage line by the reviewing agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineEdit {
    /// New parts cost, in the assessment currency
    pub parts_cost: Option<Decimal>,
    /// New labor hours, rounded to two decimal places
    pub labor_hours: Option<Decimal>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
}

impl LineEdit {
    pub fn is_empty(&self) -> bool {
        self.parts_cost.is_none()
            && self.labor_hours.is_none()
            && self.notes.is_none()
            && self.priority.is_none()
    }
}

/// Totals and the agent's adjustment relative to the AI estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub parts_total: Money,
    pub labor_total: Money,
    pub total: Money,
    pub original_total: Money,
    pub delta: Money,
    /// Change relative to the AI estimate, one decimal place
    pub delta_percent: Option<Decimal>,
}

/// The AI-produced damage and cost analysis for a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    id: AssessmentId,
    summary: String,
    severity: Severity,
    confidence: Confidence,
    processed_at: DateTime<Utc>,
    labor_rate: HourlyRate,
    evidence_sources: Vec<EvidenceSource>,
    #[serde(default)]
    risk_factors: Vec<RiskFactor>,
    #[serde(default)]
    metadata: AnalysisMetadata,
    lines: Vec<DamageLine>,
    estimated_cost: Money,
    original_estimated_cost: Money,
}

impl Assessment {
    /// Builds an assessment from AI output, deriving every cost figure
    ///
    /// # Errors
    ///
    /// Fails if a draft has a negative or out-of-range input, no part name,
    /// or a parts cost in a different currency from the labor rate.
    pub fn new(
        summary: impl Into<String>,
        severity: Severity,
        confidence: Confidence,
        labor_rate: HourlyRate,
        evidence_sources: Vec<EvidenceSource>,
        drafts: Vec<DamageLineDraft>,
    ) -> Result<Self, ClaimError> {
        let lines = drafts
            .into_iter()
            .map(|draft| DamageLine::from_draft(draft, &labor_rate))
            .collect::<Result<Vec<_>, _>>()?;

        let estimated_cost =
            Money::checked_sum(labor_rate.currency(), lines.iter().map(|l| &l.total_cost))?;
        Ok(Self {
            id: AssessmentId::new_v7(),
            summary: summary.into(),
            severity,
            confidence,
            processed_at: Utc::now(),
            labor_rate,
            evidence_sources,
            risk_factors: Vec::new(),
            metadata: AnalysisMetadata::default(),
            lines,
            estimated_cost,
            original_estimated_cost: estimated_cost,
        })
    }

    pub fn with_risk_factors(mut self, risk_factors: Vec<RiskFactor>) -> Self {
        self.risk_factors = risk_factors;
        self
    }

    pub fn with_metadata(mut self, metadata: AnalysisMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> AssessmentId {
        self.id
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    pub fn labor_rate(&self) -> HourlyRate {
        self.labor_rate
    }

    pub fn currency(&self) -> Currency {
        self.labor_rate.currency()
    }

    pub fn evidence_sources(&self) -> &[EvidenceSource] {
        &self.evidence_sources
    }

    pub fn risk_factors(&self) -> &[RiskFactor] {
        &self.risk_factors
    }

    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.metadata
    }

    pub fn lines(&self) -> &[DamageLine] {
        &self.lines
    }

    pub fn line(&self, id: DamageLineId) -> Option<&DamageLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Sum of all line totals
    pub fn estimated_cost(&self) -> Money {
        self.estimated_cost
    }

    /// The estimate as produced by the AI, before any agent edits
    pub fn original_estimated_cost(&self) -> Money {
        self.original_estimated_cost
    }

    /// Applies an agent edit to one line and recomputes the aggregate
    ///
    /// The edit is validated in full before anything changes, so a rejected
    /// edit leaves the assessment exactly as it was. A successful edit marks
    /// the line as being modified.
    pub fn edit_line(
        &mut self,
        line_id: DamageLineId,
        edit: &LineEdit,
        policy: NegativeAmountPolicy,
    ) -> Result<&DamageLine, ClaimError> {
        if edit.is_empty() {
            return Err(ClaimError::validation("edit changes nothing"));
        }
        let rate = self.labor_rate;
        let currency = rate.currency();

        let parts_cost = edit
            .parts_cost
            .map(|value| resolve_amount("parts_cost", value, policy))
            .transpose()?
            .map(|value| check_limit("parts_cost", value, MAX_PARTS_COST))
            .transpose()?
            .map(|value| Money::new(value, currency));
        let labor_hours = edit
            .labor_hours
            .map(|value| resolve_amount("labor_hours", value, policy))
            .transpose()?
            .map(normalize_hours)
            .transpose()?;

        let index = self.index_of(line_id)?;
        let mut line = self.lines[index].clone();
        if let Some(parts_cost) = parts_cost {
            line.parts_cost = parts_cost;
        }
        if let Some(hours) = labor_hours {
            line.labor_hours = hours;
        }
        if let Some(notes) = &edit.notes {
            line.agent_notes = Some(notes.clone()).filter(|n| !n.trim().is_empty());
        }
        if let Some(priority) = edit.priority {
            line.priority = priority;
        }
        line.agent_status = Some(AgentStatus::Modifying);
        line.recompute(&rate)?;

        self.commit_line(index, line)
    }

    /// Sets the review state of a line without touching its figures
    pub fn set_line_status(
        &mut self,
        line_id: DamageLineId,
        status: AgentStatus,
    ) -> Result<&DamageLine, ClaimError> {
        let index = self.index_of(line_id)?;
        self.lines[index].agent_status = Some(status);
        Ok(&self.lines[index])
    }

    /// Restores a line to the AI figures and clears its review state
    pub fn revert_line(&mut self, line_id: DamageLineId) -> Result<&DamageLine, ClaimError> {
        let index = self.index_of(line_id)?;
        let line = self.lines[index].reverted(&self.labor_rate)?;
        self.commit_line(index, line)
    }

    /// Restores every line to the AI figures and clears all review state
    pub fn revert_all(&mut self) -> Result<(), ClaimError> {
        let lines = self
            .lines
            .iter()
            .map(|l| l.reverted(&self.labor_rate))
            .collect::<Result<Vec<_>, _>>()?;
        let estimated_cost =
            Money::checked_sum(self.currency(), lines.iter().map(|l| &l.total_cost))?;
        self.lines = lines;
        self.estimated_cost = estimated_cost;
        Ok(())
    }

    /// Lines the agent has not touched yet
    pub fn unreviewed_lines(&self) -> Vec<DamageLineId> {
        self.lines
            .iter()
            .filter(|l| l.agent_status.is_none())
            .map(|l| l.id)
            .collect()
    }

    /// True if any line differs from the AI figures
    pub fn has_adjustments(&self) -> bool {
        self.lines.iter().any(DamageLine::is_adjusted)
    }

    /// Totals across all lines plus the delta against the AI estimate
    pub fn cost_summary(&self) -> Result<CostSummary, MoneyError> {
        let currency = self.currency();
        let parts_total = Money::checked_sum(currency, self.lines.iter().map(|l| &l.parts_cost))?;
        let labor_total = Money::checked_sum(currency, self.lines.iter().map(|l| &l.labor_cost))?;
        let delta = self.estimated_cost.checked_sub(&self.original_estimated_cost)?;
        let delta_percent = if self.original_estimated_cost.is_zero() {
            None
        } else {
            delta
                .amount()
                .checked_div(self.original_estimated_cost.amount())
                .and_then(|ratio| ratio.checked_mul(dec!(100)))
                .map(|percent| percent.round_dp(1))
        };

        Ok(CostSummary {
            parts_total,
            labor_total,
            total: self.estimated_cost,
            original_total: self.original_estimated_cost,
            delta,
            delta_percent,
        })
    }

    /// Checks the derived-cost rules on every line and the aggregate
    pub fn is_consistent(&self) -> bool {
        let lines_ok = self.lines.iter().all(|l| {
            self.labor_rate.cost_for(l.labor_hours).ok() == Some(l.labor_cost)
                && l.parts_cost.checked_add(&l.labor_cost).ok() == Some(l.total_cost)
        });
        let sum = Money::checked_sum(self.currency(), self.lines.iter().map(|l| &l.total_cost));
        lines_ok && sum.ok() == Some(self.estimated_cost)
    }

    fn index_of(&self, line_id: DamageLineId) -> Result<usize, ClaimError> {
        self.lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| ClaimError::DamageLineNotFound(line_id.to_string()))
    }

    /// Replaces one line and the aggregate, or changes nothing on overflow
    fn commit_line(&mut self, index: usize, line: DamageLine) -> Result<&DamageLine, ClaimError> {
        let totals = self.lines.iter().enumerate().map(|(i, l)| {
            if i == index {
                &line.total_cost
            } else {
                &l.total_cost
            }
        });
        let estimated_cost = Money::checked_sum(self.currency(), totals)?;
        self.lines[index] = line;
        self.estimated_cost = estimated_cost;
        Ok(&self.lines[index])
    }
}

fn normalize_hours(hours: Decimal) -> Result<Decimal, ClaimError> {
    check_limit("labor_hours", hours, MAX_LABOR_HOURS).map(|h| h.round_dp(LABOR_HOURS_DP))
}

fn check_limit(field: &'static str, value: Decimal, max: Decimal) -> Result<Decimal, ClaimError> {
    if value > max {
        return Err(ClaimError::validation(format!(
            "{field} exceeds the maximum of {max}"
        )));
    }
    Ok(value)
}

fn resolve_amount(
    field: &'static str,
    value: Decimal,
    policy: NegativeAmountPolicy,
) -> Result<Decimal, ClaimError> {
    if !(value.is_sign_negative() && !value.is_zero()) {
        return Ok(value);
    }
    match policy {
        NegativeAmountPolicy::Reject => Err(ClaimError::NegativeAmount { field, value }),
        NegativeAmountPolicy::Clamp => Ok(Decimal::ZERO),
    }
}
