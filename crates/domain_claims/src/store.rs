//! Claim Store
//!
//! The authoritative set of claims. [`ClaimStore`] is the port the workflow
//! service is handed; [`InMemoryClaimStore`] is the default adapter.
//!
//! Every successful write bumps the claim's `version`. Writers pass the
//! version they read, and a mismatch fails with
//! [`ClaimError::VersionConflict`] without touching the stored claim.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable};

use crate::claim::{Claim, ClaimInput, ClaimPatch, ClaimStatus};
use crate::error::ClaimError;

/// Claim counts for the dashboard cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub awaiting_photos: usize,
    pub ai_in_progress: usize,
    pub pending_review: usize,
    pub pending_approval: usize,
    pub revision_requested: usize,
    pub completed: usize,
    pub rejected: usize,
}

impl DashboardSummary {
    /// Count for a single status
    pub fn count(&self, status: ClaimStatus) -> usize {
        match status {
            ClaimStatus::AwaitingPhotos => self.awaiting_photos,
            ClaimStatus::AiInProgress => self.ai_in_progress,
            ClaimStatus::PendingReview => self.pending_review,
            ClaimStatus::PendingApproval => self.pending_approval,
            ClaimStatus::RevisionRequested => self.revision_requested,
            ClaimStatus::Completed => self.completed,
            ClaimStatus::Rejected => self.rejected,
        }
    }

    fn increment(&mut self, status: ClaimStatus) {
        let slot = match status {
            ClaimStatus::AwaitingPhotos => &mut self.awaiting_photos,
            ClaimStatus::AiInProgress => &mut self.ai_in_progress,
            ClaimStatus::PendingReview => &mut self.pending_review,
            ClaimStatus::PendingApproval => &mut self.pending_approval,
            ClaimStatus::RevisionRequested => &mut self.revision_requested,
            ClaimStatus::Completed => &mut self.completed,
            ClaimStatus::Rejected => &mut self.rejected,
        };
        *slot += 1;
        self.total += 1;
    }
}

/// Port for claim storage
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Opens a claim, assigning its id and claim number
    async fn create(&self, input: ClaimInput) -> Result<Claim, ClaimError>;

    async fn get(&self, id: ClaimId) -> Result<Claim, ClaimError>;

    async fn get_by_number(&self, claim_number: &str) -> Result<Claim, ClaimError>;

    /// Claims with the given status, in creation order
    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, ClaimError>;

    /// All claims, in creation order
    async fn list_all(&self) -> Result<Vec<Claim>, ClaimError>;

    /// Applies a descriptive patch
    async fn update(
        &self,
        id: ClaimId,
        patch: ClaimPatch,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError>;

    /// Commits a claim mutated by the workflow
    ///
    /// `expected_version` is the version the caller loaded. The stored
    /// claim is returned with its new version and no pending events.
    async fn save(&self, claim: Claim, expected_version: u64) -> Result<Claim, ClaimError>;

    async fn summary(&self) -> Result<DashboardSummary, ClaimError>;
}

#[derive(Debug, Default)]
struct StoreState {
    claims: HashMap<ClaimId, Claim>,
    order: Vec<ClaimId>,
    by_number: HashMap<String, ClaimId>,
    next_seq: u32,
}

impl StoreState {
    fn ordered(&self) -> impl Iterator<Item = &Claim> {
        self.order.iter().filter_map(|id| self.claims.get(id))
    }

    fn next_claim_number(&mut self) -> String {
        self.next_seq += 1;
        format!("CLM-{}-{:03}", Utc::now().year(), self.next_seq)
    }
}

/// In-process claim store
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    state: RwLock<StoreState>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored claims
    pub async fn len(&self) -> usize {
        self.state.read().await.claims.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let count = self.len().await;
        HealthCheckResult::healthy("in-memory-claim-store")
            .with_message(format!("{count} claims"))
    }
}

fn check_version(stored: &Claim, expected: u64) -> Result<(), ClaimError> {
    if stored.version != expected {
        return Err(ClaimError::VersionConflict {
            expected,
            actual: stored.version,
        });
    }
    Ok(())
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn create(&self, input: ClaimInput) -> Result<Claim, ClaimError> {
        input.validate()?;
        let mut state = self.state.write().await;
        let claim_number = state.next_claim_number();
        let mut claim = Claim::open(input, claim_number.clone())?;
        claim.take_events();

        state.by_number.insert(claim_number, claim.id);
        state.order.push(claim.id);
        state.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.state
            .read()
            .await
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| ClaimError::ClaimNotFound(id.to_string()))
    }

    async fn get_by_number(&self, claim_number: &str) -> Result<Claim, ClaimError> {
        let state = self.state.read().await;
        state
            .by_number
            .get(claim_number)
            .and_then(|id| state.claims.get(id))
            .cloned()
            .ok_or_else(|| ClaimError::ClaimNotFound(claim_number.to_string()))
    }

    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, ClaimError> {
        let state = self.state.read().await;
        Ok(state
            .ordered()
            .filter(|claim| claim.status == status)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Claim>, ClaimError> {
        let state = self.state.read().await;
        Ok(state.ordered().cloned().collect())
    }

    async fn update(
        &self,
        id: ClaimId,
        patch: ClaimPatch,
        expected_version: Option<u64>,
    ) -> Result<Claim, ClaimError> {
        let mut state = self.state.write().await;
        let stored = state
            .claims
            .get_mut(&id)
            .ok_or_else(|| ClaimError::ClaimNotFound(id.to_string()))?;
        if let Some(expected) = expected_version {
            check_version(stored, expected)?;
        }

        let mut updated = stored.clone();
        updated.apply_patch(patch)?;
        updated.version += 1;
        updated.take_events();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn save(&self, mut claim: Claim, expected_version: u64) -> Result<Claim, ClaimError> {
        let mut state = self.state.write().await;
        let stored = state
            .claims
            .get_mut(&claim.id)
            .ok_or_else(|| ClaimError::ClaimNotFound(claim.id.to_string()))?;
        check_version(stored, expected_version)?;

        claim.version = expected_version + 1;
        claim.take_events();
        *stored = claim.clone();
        Ok(claim)
    }

    async fn summary(&self) -> Result<DashboardSummary, ClaimError> {
        let state = self.state.read().await;
        Ok(state.ordered().fold(DashboardSummary::default(), |mut acc, claim| {
            acc.increment(claim.status);
            acc
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_sequential_numbers() {
        let store = InMemoryClaimStore::new();
        let first = store.create(ClaimInput::new("POL-1", "A")).await.unwrap();
        let second = store.create(ClaimInput::new("POL-2", "B")).await.unwrap();

        let year = Utc::now().year();
        assert_eq!(first.claim_number(), format!("CLM-{year}-001"));
        assert_eq!(second.claim_number(), format!("CLM-{year}-002"));
        assert!(first.events().is_empty());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let store = InMemoryClaimStore::new();
        let result = store.create(ClaimInput::new("", "A")).await;
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let store = InMemoryClaimStore::new();
        let result = store.get(ClaimId::new()).await;
        assert!(matches!(result, Err(ClaimError::ClaimNotFound(_))));
    }

    #[tokio::test]
    async fn test_save_with_stale_version_conflicts() {
        let store = InMemoryClaimStore::new();
        let claim = store.create(ClaimInput::new("POL-1", "A")).await.unwrap();

        let saved = store.save(claim.clone(), 0).await.unwrap();
        assert_eq!(saved.version(), 1);

        let result = store.save(claim, 0).await;
        assert!(matches!(
            result,
            Err(ClaimError::VersionConflict { expected: 0, actual: 1 })
        ));
    }

    #[tokio::test]
    async fn test_summary_counts_by_status() {
        let store = InMemoryClaimStore::new();
        store.create(ClaimInput::new("POL-1", "A")).await.unwrap();
        store.create(ClaimInput::new("POL-2", "B")).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.count(ClaimStatus::AwaitingPhotos), 2);
        assert_eq!(summary.count(ClaimStatus::Completed), 0);
    }
}
