use chrono::{DateTime, Utc};

/// Caller-supplied job identifier (the request id of the submitting client).
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepting registrations and submissions
    Open,
    /// Quorum reached and consensus computed
    Closed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Open => write!(f, "open"),
            JobStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A unit of labeling work. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub dataset_source: String,
    pub model_source: String,
    /// Expected length of every submitted label sequence
    pub num_items: usize,
    pub owner: String,
    /// Priority; higher bids are dispatched first
    pub bid: u64,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        id: JobId,
        dataset_source: impl Into<String>,
        model_source: impl Into<String>,
        num_items: usize,
        owner: impl Into<String>,
        bid: u64,
    ) -> Self {
        Self {
            id,
            dataset_source: dataset_source.into(),
            model_source: model_source.into(),
            num_items,
            owner: owner.into(),
            bid,
            created_at: Utc::now(),
        }
    }

    /// The work description handed to every worker of this job.
    pub fn batch(&self) -> BatchDescriptor {
        BatchDescriptor {
            job_id: self.id,
            dataset_source: self.dataset_source.clone(),
            model_source: self.model_source.clone(),
            index_range: (0, self.num_items),
        }
    }
}

/// What a worker needs to perform a job off-system. Identical for all workers
/// of the same job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDescriptor {
    pub job_id: JobId,
    pub dataset_source: String,
    pub model_source: String,
    /// Half-open range of dataset items to label
    pub index_range: (usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_covers_all_items() {
        let job = Job::new(7, "s3://data", "s3://model", 100, "0xabc", 5);
        let batch = job.batch();
        assert_eq!(batch.job_id, 7);
        assert_eq!(batch.dataset_source, "s3://data");
        assert_eq!(batch.model_source, "s3://model");
        assert_eq!(batch.index_range, (0, 100));
    }

    #[test]
    fn job_status_display() {
        assert_eq!(JobStatus::Open.to_string(), "open");
        assert_eq!(JobStatus::Closed.to_string(), "closed");
    }
}
