//! Fixture-driven assessment engine

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable};

use crate::assessment::{AnalysisMetadata, Assessment};
use crate::ports::{AssessmentFailure, AssessmentPort, AssessmentRequest};

use super::fixtures::{fixture_for, front_collision};

/// Model names reported in the analysis metadata
pub const FIXTURE_MODELS: [&str; 3] = ["damage-detection-v3", "parts-classifier-v2", "cost-estimator-v4"];

/// Answers assessment requests with canned analyses
///
/// The fixture is chosen by claim number; unknown claims get the front
/// collision fixture. An optional processing delay stands in for model
/// latency, and queued failures are returned before any fixture.
#[derive(Debug, Default)]
pub struct FixtureAssessmentEngine {
    processing_delay: Duration,
    queued_failures: Mutex<VecDeque<AssessmentFailure>>,
}

impl FixtureAssessmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps this long before answering
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Makes the next request fail with `failure`
    pub async fn fail_next(&self, failure: AssessmentFailure) {
        self.queued_failures.lock().await.push_back(failure);
    }
}

impl DomainPort for FixtureAssessmentEngine {}

#[async_trait]
impl HealthCheckable for FixtureAssessmentEngine {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("fixture-assessment-engine")
    }
}

#[async_trait]
impl AssessmentPort for FixtureAssessmentEngine {
    async fn assess(&self, request: AssessmentRequest) -> Result<Assessment, AssessmentFailure> {
        let started = tokio::time::Instant::now();
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }
        if let Some(failure) = self.queued_failures.lock().await.pop_front() {
            return Err(failure);
        }
        if request.photos.is_empty() {
            return Err(AssessmentFailure::NoPhotos);
        }

        let fixture = fixture_for(&request.claim_number).unwrap_or_else(front_collision);
        tracing::debug!(
            claim_number = %request.claim_number,
            photos = request.photos.len(),
            summary = fixture.summary,
            "Producing fixture assessment"
        );
        let assessment = fixture
            .build(request.labor_rate)
            .map_err(|e| AssessmentFailure::Unavailable { reason: e.to_string() })?;
        Ok(assessment.with_metadata(AnalysisMetadata {
            photos_analyzed: request.photos.len(),
            models_used: FIXTURE_MODELS.iter().map(|m| m.to_string()).collect(),
            processing_time_ms: started.elapsed().as_millis() as u64,
        }))
    }
}
