//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for claims, damage lines and services.
//! These fixtures are designed to be consistent and predictable for unit tests.

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{Confidence, Currency, HourlyRate, Money, PhotoId};
use domain_claims::adapters::{FixtureAssessmentEngine, InMemoryPhotoStore, LoggingNotifier};
use domain_claims::assessment::standard_labor_rate;
use domain_claims::{
    ClaimInput, ClaimService, CustomerContact, DamageLineDraft, InMemoryClaimStore, Photo,
    Priority, RepairAction, ServiceSettings, Severity, Vehicle,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The standard $150/h USD labor rate, built once
pub static STANDARD_RATE: Lazy<HourlyRate> =
    Lazy::new(|| standard_labor_rate(Currency::USD).expect("standard rate is positive"));

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A USD amount
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// Creates a zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// The standard labor rate
    pub fn labor_rate() -> HourlyRate {
        *STANDARD_RATE
    }

    /// A EUR rate for currency mismatch tests
    pub fn eur_labor_rate() -> HourlyRate {
        HourlyRate::new(Money::new(dec!(120), Currency::EUR)).expect("positive rate")
    }
}

/// Fixture for intake data
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// The smallest valid intake
    pub fn minimal_input() -> ClaimInput {
        ClaimInput::new("POL-1", "A")
    }

    /// A complete intake for a 2022 Honda Accord
    pub fn accord_input() -> ClaimInput {
        let mut input = ClaimInput::new("POL-2024-001234", "John Smith");
        input.customer = CustomerContact::new("John Smith")
            .with_email("john.smith@email.com")
            .with_phone("(555) 123-4567");
        input.vehicle = Vehicle::new(2022, "Honda", "Accord").with_vin("1HGCV1F34NA000001");
        input.incident_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        input.incident_description = Some("Rear-ended at a stop light".into());
        input.priority = Some(Priority::High);
        input
    }

    /// An intake whose customer gave no contact details
    pub fn no_contact_input() -> ClaimInput {
        let mut input = ClaimInput::new("POL-2024-006789", "Lisa Anderson");
        input.vehicle = Vehicle::new(2023, "Chevrolet", "Silverado");
        input
    }
}

/// Fixture for photos
pub struct PhotoFixtures;

impl PhotoFixtures {
    /// A stored JPEG
    pub fn jpeg(name: &str) -> Photo {
        Photo::new(
            PhotoId::new(),
            format!("memory://photos/{name}"),
            name,
            "image/jpeg",
            2_048,
        )
    }

    /// A stored file that is not an image
    pub fn pdf(name: &str) -> Photo {
        Photo::new(PhotoId::new(), format!("memory://docs/{name}"), name, "application/pdf", 512)
    }

    /// Raw bytes for an upload of the given size
    pub fn bytes(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8).collect()
    }
}

/// Fixture for damage line drafts
pub struct LineFixtures;

impl LineFixtures {
    /// Front bumper replacement: $450 parts, 3.5h labor
    pub fn front_bumper() -> DamageLineDraft {
        Self::draft("Front Bumper", Severity::Moderate, RepairAction::Replace, dec!(3.5), dec!(450))
    }

    /// Driver headlight replacement: $320 parts, 1.5h labor
    pub fn headlight() -> DamageLineDraft {
        Self::draft(
            "Headlight Assembly (Driver)",
            Severity::Minor,
            RepairAction::Replace,
            dec!(1.5),
            dec!(320),
        )
    }

    /// Paint touch-up: $85 parts, 2h labor
    pub fn paint() -> DamageLineDraft {
        Self::draft("Paint Work", Severity::Minor, RepairAction::TouchUp, dec!(2.0), dec!(85))
    }

    /// A USD draft with a 90% confidence
    pub fn draft(
        part: &str,
        severity: Severity,
        action: RepairAction,
        labor_hours: Decimal,
        parts_cost: Decimal,
    ) -> DamageLineDraft {
        DamageLineDraft {
            part: part.to_string(),
            severity,
            action,
            labor_hours,
            parts_cost: Money::new(parts_cost, Currency::USD),
            confidence: Confidence::new(90).expect("valid confidence"),
            evidence_reference: format!("Parts catalog - {part}"),
            priority: Priority::Medium,
        }
    }
}

/// A claim service wired to in-memory adapters, with handles to the fakes
pub struct TestHarness {
    pub service: ClaimService,
    pub store: Arc<InMemoryClaimStore>,
    pub photos: Arc<InMemoryPhotoStore>,
    pub assessor: Arc<FixtureAssessmentEngine>,
    pub notifier: Arc<LoggingNotifier>,
}

impl TestHarness {
    /// Harness with the standard settings
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::new(MoneyFixtures::labor_rate()))
    }

    /// Harness with custom settings
    pub fn with_settings(settings: ServiceSettings) -> Self {
        Self::with_assessor(FixtureAssessmentEngine::new(), settings)
    }

    /// Harness with a preconfigured assessment engine
    pub fn with_assessor(assessor: FixtureAssessmentEngine, settings: ServiceSettings) -> Self {
        let store = Arc::new(InMemoryClaimStore::new());
        let photos = Arc::new(InMemoryPhotoStore::new());
        let assessor = Arc::new(assessor);
        let notifier = Arc::new(LoggingNotifier::new());
        let service = ClaimService::new(
            store.clone(),
            photos.clone(),
            assessor.clone(),
            notifier.clone(),
            settings,
        );
        Self {
            service,
            store,
            photos,
            assessor,
            notifier,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a future on a fresh current-thread runtime
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
        .block_on(future)
}
