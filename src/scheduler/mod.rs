pub mod job;
pub mod pipeline;
pub mod queue;

pub use job::{BatchDescriptor, Job, JobId, JobStatus};
pub use pipeline::{Scheduler, SchedulerStatus};
pub use queue::JobQueue;
