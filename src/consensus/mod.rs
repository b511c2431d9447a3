//! Per-job worker coordination and label consensus.
//!
//! - [`JobCoordinator`]: one job's Open -> Closed lifecycle. Workers register,
//!   submit one label sequence each, and the submission that reaches quorum
//!   closes the job with a consolidated answer.
//! - [`Consensus`]: pluggable aggregation strategy; [`MajorityVote`] is the
//!   per-position plurality vote used by default.
//! - [`Worker`] / [`Label`]: participant state and label values.

pub mod aggregator;
pub mod coordinator;
pub mod worker;

pub use aggregator::{Consensus, MajorityVote, Submissions};
pub use coordinator::{ConsensusResult, JobCoordinator, SubmitOutcome, DEFAULT_QUORUM};
pub use worker::{Label, Worker};
