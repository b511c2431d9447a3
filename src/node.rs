use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{run_api, ApiState};
use crate::config::NodeConfig;
use crate::consensus::MajorityVote;
use crate::scheduler::Scheduler;

/// Owns the scheduler and serves it over HTTP
pub struct Node {
    pub config: NodeConfig,
    pub scheduler: Arc<Scheduler>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        let scheduler = Scheduler::with_settings(
            config.max_backlog,
            config.quorum_size,
            Arc::new(MajorityVote),
        );
        Self {
            config,
            scheduler: Arc::new(scheduler),
        }
    }

    /// Serve the HTTP API until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), Box<dyn std::error::Error>> {
        let state = ApiState {
            scheduler: self.scheduler.clone(),
        };
        run_api(self.config.listen_addr, state, shutdown).await?;

        let status = self.scheduler.status().await;
        tracing::info!(
            active = ?status.active,
            backlog = status.backlog_len,
            "Server stopped"
        );
        Ok(())
    }
}
