use thiserror::Error;

use crate::scheduler::JobId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("Job {0} is already queued or active")]
    DuplicateJob(JobId),

    #[error("Job backlog is at capacity ({0} jobs)")]
    BacklogFull(usize),

    #[error("Worker {0} is already registered for this job")]
    WorkerAlreadyRegistered(String),

    #[error("Submission targets job {submitted}, but the active job is {active}")]
    JobMismatch { active: JobId, submitted: JobId },

    #[error("Expected {expected} labels, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },

    #[error("Worker not registered for this job: {0}")]
    UnknownWorker(String),

    #[error("Worker {0} has already submitted labels for this job")]
    DuplicateSubmission(String),

    #[error("Job {0} has reached consensus and is closed")]
    JobClosed(JobId),
}

pub type Result<T> = std::result::Result<T, LabelError>;
