use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::error::{LabelError, Result};
use crate::scheduler::job::{Job, JobId};

pub const DEFAULT_MAX_JOBS: usize = 10_000;

/// Heap entry ordered by `(bid, Reverse(seq))`: highest bid first, and the
/// earliest enqueued job first among equal bids.
#[derive(Debug)]
struct QueuedJob {
    seq: u64,
    job: Job,
}

impl QueuedJob {
    fn key(&self) -> (u64, Reverse<u64>) {
        (self.job.bid, Reverse(self.seq))
    }
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Bid-ordered backlog of jobs that are not yet active
#[derive(Debug)]
pub struct JobQueue {
    heap: BinaryHeap<QueuedJob>,
    ids: HashSet<JobId>,
    next_seq: u64,
    max_jobs: usize,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_JOBS)
    }

    pub fn with_capacity(max_jobs: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            ids: HashSet::new(),
            next_seq: 0,
            max_jobs,
        }
    }

    /// Add a job to the backlog. Fails if a job with the same id is already
    /// queued or the backlog is at capacity; the backlog is left untouched.
    pub fn push(&mut self, job: Job) -> Result<()> {
        if self.ids.contains(&job.id) {
            return Err(LabelError::DuplicateJob(job.id));
        }
        if self.is_full() {
            return Err(LabelError::BacklogFull(self.max_jobs));
        }
        self.ids.insert(job.id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedJob { seq, job });
        Ok(())
    }

    /// Remove and return the highest-bid job
    pub fn pop(&mut self) -> Option<Job> {
        let entry = self.heap.pop()?;
        self.ids.remove(&entry.job.id);
        Some(entry.job)
    }

    /// All queued jobs in dispatch order
    pub fn jobs(&self) -> Vec<&Job> {
        let mut entries: Vec<&QueuedJob> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|entry| &entry.job).collect()
    }

    /// Returns the current number of queued jobs
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the backlog is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns true if the backlog is at capacity
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.max_jobs
    }
}
