//! ShardKV CLI Client
//!
//! Command-line interface for interacting with ShardKV.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shardkv::loadgen::{self, LoadConfig};
use shardkv::{Client, Result};

/// ShardKV CLI
#[derive(Parser, Debug)]
#[command(name = "shardkv-cli")]
#[command(about = "CLI for ShardKV key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Put a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,

    /// Run put, get and delete load phases and print latency stats
    Bench {
        /// Number of concurrent connections
        #[arg(short, long, default_value = "50")]
        concurrency: usize,

        /// Requests per phase
        #[arg(short = 'n', long, default_value = "1000")]
        requests: usize,

        /// Directory to save a CSV of the results in
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Suffix for the CSV file name
        #[arg(short, long)]
        tag: Option<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let server = args.server;

    let code = match args.command {
        Commands::Get { key } => match Client::connect(server.as_str())?.get(key.as_bytes())? {
            Some(value) => {
                println!("{}", String::from_utf8_lossy(&value));
                ExitCode::SUCCESS
            }
            None => {
                println!("(not found)");
                ExitCode::FAILURE
            }
        },
        Commands::Put { key, value } => {
            report(Client::connect(server.as_str())?.put(key.as_bytes(), value.as_bytes())?)
        }
        Commands::Del { key } => report(Client::connect(server.as_str())?.delete(key.as_bytes())?),
        Commands::Ping => {
            Client::connect(server.as_str())?.ping()?;
            println!("PONG");
            ExitCode::SUCCESS
        }
        Commands::Bench {
            concurrency,
            requests,
            output,
            tag,
        } => {
            let config = LoadConfig {
                server_addr: server,
                concurrency,
                total_requests: requests,
            };
            let reports = loadgen::run_all(&config)?;
            for report in &reports {
                println!("{}", report);
            }
            let path = loadgen::save_csv(&output, tag.as_deref(), &reports)?;
            println!("Results saved to {}", path.display());
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

fn report(success: bool) -> ExitCode {
    if success {
        println!("OK");
        ExitCode::SUCCESS
    } else {
        println!("(no change)");
        ExitCode::FAILURE
    }
}
