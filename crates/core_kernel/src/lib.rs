//! Core Kernel - Foundational types for the vehicle claims system
//!
//! This crate provides the building blocks used by the claims domain and
//! the API layer:
//! - Money types with precise decimal arithmetic and hourly labor rates
//! - Strongly-typed identifiers
//! - Confidence scores
//! - Port infrastructure shared by every adapter

pub mod money;
pub mod identifiers;
pub mod confidence;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, HourlyRate};
pub use identifiers::{
    ClaimId, PhotoId, AssessmentId, DamageLineId, UploadId, JobId, DeliveryId,
};
pub use confidence::Confidence;
pub use ports::{
    PortError, DomainPort, RetryPolicy, AdapterHealth, HealthCheckResult,
    HealthCheckable,
};
pub use error::CoreError;
