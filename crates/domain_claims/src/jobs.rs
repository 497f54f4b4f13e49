//! Background assessment jobs
//!
//! An AI assessment runs as a spawned task. Callers get an
//! [`AssessmentJob`] handle to poll or await, and the [`JobRegistry`] keeps
//! a status receiver per job so the status can be looked up by id later.
//! Finished jobs are kept for a retention period and then pruned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use core_kernel::{ClaimId, JobId, PortError};

use crate::claim::Claim;
use crate::error::ClaimError;

/// Lifecycle of an assessment job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed { reason: String },
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed { .. } | JobStatus::Cancelled
        )
    }
}

/// Status of a registered job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub claim_id: ClaimId,
    pub status: JobStatus,
}

/// Handle to a dispatched assessment
#[derive(Debug)]
pub struct AssessmentJob {
    id: JobId,
    claim_id: ClaimId,
    status: watch::Receiver<JobStatus>,
    cancel: CancellationToken,
    task: JoinHandle<Result<Claim, ClaimError>>,
}

impl AssessmentJob {
    pub(crate) fn new(
        id: JobId,
        claim_id: ClaimId,
        status: watch::Receiver<JobStatus>,
        cancel: CancellationToken,
        task: JoinHandle<Result<Claim, ClaimError>>,
    ) -> Self {
        Self {
            id,
            claim_id,
            status,
            cancel,
            task,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn claim_id(&self) -> ClaimId {
        self.claim_id
    }

    /// Current status
    pub fn status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    /// Subscribes to status changes
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.clone()
    }

    /// Asks the job to stop; the claim records the cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the job and returns the updated claim
    ///
    /// An assessment failure is recorded on the claim and returned as
    /// [`ClaimError::AssessmentFailed`].
    pub async fn wait(self) -> Result<Claim, ClaimError> {
        self.task.await.map_err(|e| {
            ClaimError::port(
                "assessment job",
                PortError::internal(format!("job task failed: {e}")),
            )
        })?
    }

    /// Lets the job run to completion without holding the handle
    pub fn detach(self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id,
            claim_id: self.claim_id,
            status: self.status(),
        }
    }
}

#[derive(Debug, Clone)]
struct RegisteredJob {
    claim_id: ClaimId,
    status: watch::Receiver<JobStatus>,
    registered_at: Instant,
}

impl RegisteredJob {
    fn is_active(&self) -> bool {
        !self.status.borrow().is_finished()
    }
}

/// Status lookup for dispatched jobs
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, RegisteredJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job unless the claim already has one running
    ///
    /// The check and the insert happen under one write lock; returns
    /// false, registering nothing, if another job is still active.
    pub async fn register_if_idle(
        &self,
        id: JobId,
        claim_id: ClaimId,
        status: watch::Receiver<JobStatus>,
    ) -> bool {
        let mut jobs = self.jobs.write().await;
        if jobs.values().any(|job| job.claim_id == claim_id && job.is_active()) {
            return false;
        }
        jobs.insert(
            id,
            RegisteredJob {
                claim_id,
                status,
                registered_at: Instant::now(),
            },
        );
        true
    }

    pub async fn get(&self, id: JobId) -> Option<JobSnapshot> {
        self.jobs.read().await.get(&id).map(|job| JobSnapshot {
            job_id: id,
            claim_id: job.claim_id,
            status: job.status.borrow().clone(),
        })
    }

    /// Jobs for a claim that have not finished
    pub async fn active_for(&self, claim_id: ClaimId) -> Vec<JobId> {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|(_, job)| job.claim_id == claim_id && job.is_active())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Drops finished jobs registered at least `retention` ago; returns how
    /// many were removed
    pub async fn prune_finished(&self, retention: Duration) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.is_active() || job.registered_at.elapsed() < retention);
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
