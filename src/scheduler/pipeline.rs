use std::sync::Arc;

use tokio::sync::Mutex;

use crate::consensus::{Consensus, JobCoordinator, MajorityVote, DEFAULT_QUORUM};
use crate::error::{LabelError, Result};
use crate::scheduler::job::{Job, JobId};
use crate::scheduler::queue::{JobQueue, DEFAULT_MAX_JOBS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub active: Option<JobId>,
    pub backlog_len: usize,
}

#[derive(Debug)]
struct SchedulerState {
    backlog: JobQueue,
    active: Option<Arc<JobCoordinator>>,
}

impl SchedulerState {
    fn is_active(&self, id: &JobId) -> bool {
        self.active.as_ref().is_some_and(|c| c.job_id() == *id)
    }
}

/// Bid-ordered backlog plus the single active job.
///
/// Jobs are activated lazily: the highest-bid job only becomes active when a
/// caller first asks for work. Backlog and active slot share one lock; the
/// returned coordinator handle is used after that lock is released.
#[derive(Debug)]
pub struct Scheduler {
    state: Mutex<SchedulerState>,
    quorum: usize,
    consensus: Arc<dyn Consensus>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_MAX_JOBS, DEFAULT_QUORUM, Arc::new(MajorityVote))
    }

    pub fn with_settings(max_backlog: usize, quorum: usize, consensus: Arc<dyn Consensus>) -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                backlog: JobQueue::with_capacity(max_backlog),
                active: None,
            }),
            quorum,
            consensus,
        }
    }

    /// Queue a job. Fails if the id is already queued or active, or if the
    /// backlog is full.
    pub async fn enqueue(&self, job: Job) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.is_active(&job.id) {
            return Err(LabelError::DuplicateJob(job.id));
        }

        let (job_id, bid) = (job.id, job.bid);
        if let Err(e) = state.backlog.push(job) {
            if let LabelError::BacklogFull(_) = e {
                tracing::warn!(job_id, "Job backlog at capacity, job rejected");
            }
            return Err(e);
        }
        tracing::info!(job_id, bid, backlog = state.backlog.len(), "Job enqueued");
        Ok(())
    }

    /// The current job, activating the highest-bid backlog job if none is
    /// active. `None` only when nothing is queued at all.
    pub async fn active_job(&self) -> Option<Arc<JobCoordinator>> {
        let mut state = self.state.lock().await;
        self.activate(&mut state)
    }

    /// Drop the active job and activate the next one, if any.
    pub async fn advance(&self) -> Option<Arc<JobCoordinator>> {
        let mut state = self.state.lock().await;
        if let Some(done) = state.active.take() {
            tracing::info!(job_id = done.job_id(), "Active job retired");
        }
        self.activate(&mut state)
    }

    /// Advance only if `job_id` is still the active job. Returns whether it was.
    ///
    /// External expiry policies and callers that just finalized a job should
    /// use this rather than [`Scheduler::advance`], so a late call can never
    /// discard a job that has since replaced it.
    pub async fn retire(&self, job_id: JobId) -> bool {
        let mut state = self.state.lock().await;
        if !state.is_active(&job_id) {
            tracing::debug!(job_id, "Retire ignored, job is not active");
            return false;
        }
        state.active = None;
        tracing::info!(job_id, "Active job retired");
        self.activate(&mut state);
        true
    }

    /// The active job without activating a new one
    pub async fn current(&self) -> Option<Arc<JobCoordinator>> {
        self.state.lock().await.active.clone()
    }

    /// The active job (without activating one) and the backlog length, read
    /// under a single lock acquisition.
    pub async fn overview(&self) -> (Option<Arc<JobCoordinator>>, usize) {
        let state = self.state.lock().await;
        (state.active.clone(), state.backlog.len())
    }

    pub async fn status(&self) -> SchedulerStatus {
        let state = self.state.lock().await;
        SchedulerStatus {
            active: state.active.as_ref().map(|c| c.job_id()),
            backlog_len: state.backlog.len(),
        }
    }

    /// Queued (not yet active) jobs in dispatch order
    pub async fn backlog_jobs(&self) -> Vec<Job> {
        let state = self.state.lock().await;
        state.backlog.jobs().into_iter().cloned().collect()
    }

    fn activate(&self, state: &mut SchedulerState) -> Option<Arc<JobCoordinator>> {
        if state.active.is_none() {
            let job = state.backlog.pop()?;
            tracing::info!(job_id = job.id, bid = job.bid, "Job activated");
            state.active = Some(Arc::new(JobCoordinator::with_consensus(
                job,
                self.quorum,
                self.consensus.clone(),
            )));
        }
        state.active.clone()
    }
}
