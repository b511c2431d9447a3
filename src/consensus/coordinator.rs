use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::consensus::aggregator::{Consensus, MajorityVote, Submissions};
use crate::consensus::worker::{Label, Worker};
use crate::error::{LabelError, Result};
use crate::scheduler::job::{BatchDescriptor, Job, JobId, JobStatus};

pub const DEFAULT_QUORUM: usize = 3;

/// Final answer for a job, produced once when quorum is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusResult {
    pub job_id: JobId,
    pub labels: Vec<Label>,
    /// Workers whose submissions were aggregated, in registration order
    pub participants: Vec<String>,
    pub closed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Submission recorded, quorum not yet reached
    Pending { submitted: usize, quorum: usize },
    /// This submission reached quorum and closed the job
    Finalized(ConsensusResult),
}

#[derive(Debug)]
struct CoordinatorState {
    status: JobStatus,
    /// Append-only, in registration order
    workers: Vec<Worker>,
    index: HashMap<String, usize>,
    submitted_count: usize,
    result: Option<ConsensusResult>,
}

impl CoordinatorState {
    fn submissions(&self) -> Submissions {
        self.workers
            .iter()
            .filter(|w| w.has_submitted)
            .map(|w| (w.identity.clone(), w.labels.clone()))
            .collect()
    }

    fn participants(&self) -> Vec<String> {
        self.workers
            .iter()
            .filter(|w| w.has_submitted)
            .map(|w| w.identity.clone())
            .collect()
    }
}

/// Owns one job's lifecycle: worker registration, label submission and the
/// quorum-triggered consensus.
///
/// All mutations go through a single per-job lock, so the duplicate checks and
/// the Open -> Closed transition are atomic with the change they guard.
#[derive(Debug)]
pub struct JobCoordinator {
    job: Job,
    quorum: usize,
    consensus: Arc<dyn Consensus>,
    state: RwLock<CoordinatorState>,
}

impl JobCoordinator {
    pub fn new(job: Job) -> Self {
        Self::with_consensus(job, DEFAULT_QUORUM, Arc::new(MajorityVote))
    }

    /// A quorum of zero is treated as one.
    pub fn with_consensus(job: Job, quorum: usize, consensus: Arc<dyn Consensus>) -> Self {
        Self {
            job,
            quorum: quorum.max(1),
            consensus,
            state: RwLock::new(CoordinatorState {
                status: JobStatus::Open,
                workers: Vec::new(),
                index: HashMap::new(),
                submitted_count: 0,
                result: None,
            }),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn job_id(&self) -> JobId {
        self.job.id
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Register a participant and hand back the batch it should work on.
    pub async fn register_worker(&self, identity: &str) -> Result<BatchDescriptor> {
        let mut state = self.state.write().await;

        if state.status == JobStatus::Closed {
            return Err(LabelError::JobClosed(self.job.id));
        }
        if state.index.contains_key(identity) {
            return Err(LabelError::WorkerAlreadyRegistered(identity.to_string()));
        }

        let position = state.workers.len();
        state.workers.push(Worker::new(identity));
        state.index.insert(identity.to_string(), position);

        tracing::info!(
            job_id = self.job.id,
            worker = identity,
            registered = state.workers.len(),
            "Worker registered"
        );
        Ok(self.job.batch())
    }

    /// Record a worker's labels. The submission that brings the number of
    /// submitted workers to the quorum closes the job and returns the
    /// consolidated labels of every submitted worker.
    pub async fn submit_labels(
        &self,
        job_id: JobId,
        identity: &str,
        labels: Vec<Label>,
    ) -> Result<SubmitOutcome> {
        if job_id != self.job.id {
            return Err(LabelError::JobMismatch {
                active: self.job.id,
                submitted: job_id,
            });
        }
        if labels.len() != self.job.num_items {
            return Err(LabelError::LabelCountMismatch {
                expected: self.job.num_items,
                actual: labels.len(),
            });
        }

        let mut state = self.state.write().await;

        if state.status == JobStatus::Closed {
            return Err(LabelError::JobClosed(self.job.id));
        }
        let position = *state
            .index
            .get(identity)
            .ok_or_else(|| LabelError::UnknownWorker(identity.to_string()))?;
        if state.workers[position].has_submitted {
            return Err(LabelError::DuplicateSubmission(identity.to_string()));
        }

        state.workers[position].record_submission(labels);
        state.submitted_count += 1;
        tracing::debug!(
            job_id = self.job.id,
            worker = identity,
            submitted = state.submitted_count,
            quorum = self.quorum,
            "Labels submitted"
        );

        if state.submitted_count < self.quorum {
            return Ok(SubmitOutcome::Pending {
                submitted: state.submitted_count,
                quorum: self.quorum,
            });
        }

        let result = ConsensusResult {
            job_id: self.job.id,
            labels: self.consensus.aggregate(&state.submissions()),
            participants: state.participants(),
            closed_at: Utc::now(),
        };
        state.status = JobStatus::Closed;
        state.result = Some(result.clone());

        tracing::info!(
            job_id = self.job.id,
            consensus = self.consensus.name(),
            participants = result.participants.len(),
            "Consensus reached, job closed"
        );
        Ok(SubmitOutcome::Finalized(result))
    }

    /// Labels of every registered worker (empty for workers that have not
    /// submitted yet).
    pub async fn snapshot_labels(&self) -> Submissions {
        let state = self.state.read().await;
        state
            .workers
            .iter()
            .map(|w| (w.identity.clone(), w.labels.clone()))
            .collect()
    }

    /// Identities of the workers that have submitted
    pub async fn participants(&self) -> Vec<String> {
        self.state.read().await.participants()
    }

    pub async fn workers(&self) -> Vec<Worker> {
        self.state.read().await.workers.clone()
    }

    pub async fn status(&self) -> JobStatus {
        self.state.read().await.status
    }

    pub async fn submitted_count(&self) -> usize {
        self.state.read().await.submitted_count
    }

    pub async fn worker_count(&self) -> usize {
        self.state.read().await.workers.len()
    }

    /// The consensus result, once the job has closed
    pub async fn result(&self) -> Option<ConsensusResult> {
        self.state.read().await.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(num_items: usize) -> JobCoordinator {
        JobCoordinator::new(Job::new(1, "data", "model", num_items, "owner", 10))
    }

    fn ints(values: &[i64]) -> Vec<Label> {
        values.iter().copied().map(Label::from).collect()
    }

    #[tokio::test]
    async fn register_returns_same_batch_for_every_worker() {
        let coord = coordinator(3);
        let a = coord.register_worker("a").await.unwrap();
        let b = coord.register_worker("b").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.index_range, (0, 3));
    }

    #[tokio::test]
    async fn submitted_count_tracks_submitted_workers() {
        let coord = coordinator(1);
        for id in ["a", "b", "c", "d"] {
            coord.register_worker(id).await.unwrap();
        }
        coord.submit_labels(1, "b", ints(&[1])).await.unwrap();
        coord.submit_labels(1, "d", ints(&[1])).await.unwrap();

        let submitted = coord.workers().await.iter().filter(|w| w.has_submitted).count();
        assert_eq!(coord.submitted_count().await, submitted);
        assert_eq!(coord.participants().await, vec!["b", "d"]);
    }

    #[tokio::test]
    async fn zero_quorum_is_clamped() {
        let job = Job::new(1, "data", "model", 1, "owner", 10);
        let coord = JobCoordinator::with_consensus(job, 0, Arc::new(MajorityVote));
        assert_eq!(coord.quorum(), 1);
        coord.register_worker("a").await.unwrap();
        let outcome = coord.submit_labels(1, "a", ints(&[4])).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Finalized(_)));
    }

    #[tokio::test]
    async fn label_count_checked_before_registration() {
        let coord = coordinator(2);
        let err = coord
            .submit_labels(1, "never-registered", ints(&[1]))
            .await
            .unwrap_err();
        assert_eq!(err, LabelError::LabelCountMismatch { expected: 2, actual: 1 });
    }
}
