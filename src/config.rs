use std::net::SocketAddr;

use crate::consensus::DEFAULT_QUORUM;
use crate::scheduler::queue::DEFAULT_MAX_JOBS;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen_addr: SocketAddr,
    /// Number of distinct worker submissions that closes a job
    pub quorum_size: usize,
    /// Maximum number of queued, not-yet-active jobs
    pub max_backlog: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:8000"
                .parse()
                .expect("default listen address is valid"),
            quorum_size: DEFAULT_QUORUM,
            max_backlog: DEFAULT_MAX_JOBS,
        }
    }
}

impl NodeConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_quorum(mut self, quorum_size: usize) -> Self {
        self.quorum_size = quorum_size;
        self
    }

    pub fn with_max_backlog(mut self, max_backlog: usize) -> Self {
        self.max_backlog = max_backlog;
        self
    }
}
