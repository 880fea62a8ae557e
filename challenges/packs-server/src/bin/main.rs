use std::sync::Arc;

use clap::Parser;
use packs_server::handler::{Settings, SolveProcessor};
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Parser, Debug)]
#[clap(name = "packs-server")]
struct Cli {
    #[clap(short = 'p', default_value = "9999")]
    port: u16,

    /// Largest quantity accepted in a request
    #[clap(long, default_value = "10000000")]
    max_quantity: i64,

    /// Most distinct pack sizes accepted in a request
    #[clap(long, default_value = "32")]
    max_pack_sizes: usize,

    /// Largest graph, in edges (quantity times pack sizes), a request may need
    #[clap(long, default_value = "50000000")]
    max_edges: u64,

    /// Number of solved requests kept in memory
    #[clap(long, default_value = "10000")]
    cache_capacity: u64,

    /// Solves allowed to run at the same time [default: number of CPUs]
    #[clap(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // install global collector configured based on RUST_LOG env var.
    tracing_subscriber::fmt::init();

    let args = Cli::parse();
    let defaults = Settings::default();
    let processor = Arc::new(SolveProcessor::new(Settings {
        max_quantity: args.max_quantity,
        max_pack_sizes: args.max_pack_sizes,
        max_edges: args.max_edges,
        cache_capacity: args.cache_capacity,
        workers: args.workers.unwrap_or(defaults.workers),
    }));

    let listener = TcpListener::bind(&format!("127.0.0.1:{}", args.port)).await?;
    packs_server::server::run(listener, processor, signal::ctrl_c()).await;
    Ok(())
}
