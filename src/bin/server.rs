//! ShardKV Server Binary
//!
//! Starts the TCP server for ShardKV.

use clap::Parser;
use shardkv::network::Server;
use shardkv::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// ShardKV Server
#[derive(Parser, Debug)]
#[command(name = "shardkv-server")]
#[command(about = "Sharded in-memory key-value store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    listen: String,

    /// Number of engine shards
    #[arg(short, long, default_value = "16")]
    shards: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Maximum number of stored entries (unlimited if omitted)
    #[arg(long)]
    max_entries: Option<usize>,

    /// Maximum total bytes of keys and values (unlimited if omitted)
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Idle read timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shardkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ShardKV Server v{}", shardkv::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Shards: {}", args.shards);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .shard_count(args.shards)
        .max_connections(args.max_connections)
        .max_entries(args.max_entries)
        .max_bytes(args.max_bytes)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    // Engine first, then the listener
    let server = match Server::open(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized, accepting connections on {}", server.local_addr());

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
