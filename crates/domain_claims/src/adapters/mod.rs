//! In-process adapters for the claims ports
//!
//! These stand in for the external collaborators a deployment would wire
//! up: an object store for photos, an AI assessment service, and an
//! email/SMS gateway. They are used by the API server's default wiring and
//! by the test suites.
//!
//! # Available Adapters
//!
//! - **InMemoryPhotoStore**: chunked photo ingestion held in memory
//! - **FixtureAssessmentEngine**: canned assessments selected by claim number
//! - **LoggingNotifier**: records and logs customer messages
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::adapters::{FixtureAssessmentEngine, InMemoryPhotoStore, LoggingNotifier};
//! use domain_claims::{ClaimService, InMemoryClaimStore, ServiceSettings};
//! use std::sync::Arc;
//!
//! let service = ClaimService::new(
//!     Arc::new(InMemoryClaimStore::new()),
//!     Arc::new(InMemoryPhotoStore::new()),
//!     Arc::new(FixtureAssessmentEngine::new()),
//!     Arc::new(LoggingNotifier::new()),
//!     ServiceSettings::standard()?,
//! );
//! ```

pub mod photo_store;
pub mod fixture_assessor;
pub mod notifier;
pub mod fixtures;

pub use photo_store::InMemoryPhotoStore;
pub use fixture_assessor::FixtureAssessmentEngine;
pub use notifier::LoggingNotifier;
