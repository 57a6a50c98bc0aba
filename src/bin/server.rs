//! zcache Daemon Binary
//!
//! Starts the TCP server for the page cache.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use zcache::config::UNLIMITED;
use zcache::network::Server;
use zcache::{Backend, Config};

/// zcache Daemon
#[derive(Parser, Debug)]
#[command(name = "zcached")]
#[command(about = "Memory-bounded compressed page cache daemon")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7380")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Size of the pool table
    #[arg(short = 'p', long, default_value = "16")]
    max_pools: usize,

    /// Page size for pools created with page size 0
    #[arg(long, default_value = "4096")]
    page_size: usize,

    /// Default per-pool memory limit in MB (unlimited if omitted)
    #[arg(long)]
    memlimit_mb: Option<u64>,

    /// zlib compression level (0-9)
    #[arg(short = 'z', long, default_value = "1")]
    compression_level: u32,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zcache=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!(version = zcache::VERSION, "zcache daemon starting");
    tracing::info!(listen = %args.listen, "listen address");

    let memlimit = args
        .memlimit_mb
        .map(|mb| mb.saturating_mul(1024 * 1024))
        .unwrap_or(UNLIMITED);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_pools(args.max_pools)
        .default_page_size(args.page_size)
        .default_memlimit(memlimit)
        .compression_level(args.compression_level)
        .build();

    let backend = match Backend::new(config.clone()) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            tracing::error!(error = %e, "backend failed to start");
            std::process::exit(1);
        }
    };

    let mut server = Server::new(config, backend);
    if let Err(e) = server.run() {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }

    tracing::info!("server stopped");
}
