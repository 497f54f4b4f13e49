//! Vehicle Damage Claims Domain
//!
//! This crate implements the claim lifecycle from intake through photo
//! collection, AI damage assessment, agent review and adjuster decision.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Awaiting Photos -> AI In Progress -> Pending Review -> Pending Approval -> Completed
//!                                            ^                  |
//!                                            +-- Revision ------+--> Rejected
//! ```
//!
//! # Components
//!
//! - [`store`]: the claim store port and its in-memory adapter
//! - [`assessment`]: damage lines and cost aggregation
//! - [`workflow`]: the transition table and the command entry point
//! - [`service`]: the facade that wires the store to the collaborator ports

pub mod claim;
pub mod photo;
pub mod assessment;
pub mod workflow;
pub mod events;
pub mod store;
pub mod ports;
pub mod adapters;
pub mod upload;
pub mod jobs;
pub mod service;
pub mod error;

pub use claim::{
    AdjusterDecision, ApprovalStatus, Claim, ClaimInput, ClaimPatch, ClaimStatus,
    CustomerContact, DecisionOutcome, Priority, Vehicle,
};
pub use photo::Photo;
pub use assessment::{
    AgentStatus, AnalysisMetadata, Assessment, CostSummary, DamageLine, DamageLineDraft,
    EvidenceKind, EvidenceSource, LineEdit, NegativeAmountPolicy, RepairAction, RiskFactor,
    RiskImpact, Severity, MAX_LABOR_HOURS, MAX_PARTS_COST, STANDARD_LABOR_RATE,
};
pub use workflow::{
    next_status, ClaimCommand, LineReviewAction, WorkflowEvent, WorkflowPolicy,
};
pub use events::ClaimEvent;
pub use store::{ClaimStore, DashboardSummary, InMemoryClaimStore};
pub use ports::{
    AssessmentFailure, AssessmentPort, DeliveryReceipt, NotificationChannel, NotificationKind,
    NotificationPort, PhotoIngestionPort,
};
pub use upload::{UploadConfig, UploadHandle, UploadProgress, UploadState};
pub use jobs::{AssessmentJob, JobSnapshot, JobStatus};
pub use service::{ClaimService, ServiceSettings, DEFAULT_JOB_RETENTION};
pub use error::ClaimError;
