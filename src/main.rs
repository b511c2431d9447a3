use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use quorum_label::config::NodeConfig;
use quorum_label::node::Node;
use quorum_label::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "quorum-label")]
#[command(version)]
#[command(about = "Labeling job scheduler with bid-ordered dispatch and quorum consensus")]
struct Args {
    /// Address to bind the HTTP API on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Number of worker submissions required to close a job
    #[arg(long, default_value = "3")]
    quorum: usize,

    /// Maximum number of queued jobs
    #[arg(long, default_value = "10000")]
    max_backlog: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let listen_addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let config = NodeConfig::new(listen_addr)
        .with_quorum(args.quorum)
        .with_max_backlog(args.max_backlog);

    tracing::info!(
        listen_addr = %config.listen_addr,
        quorum = config.quorum_size,
        max_backlog = config.max_backlog,
        "Starting quorum-label node"
    );

    let shutdown = install_shutdown_handler();
    Node::new(config).run(shutdown).await
}
