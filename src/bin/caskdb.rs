//! caskdb CLI
//!
//! Command-line interface over a local caskdb data directory.

use caskdb::{Config, Engine, SyncPolicy};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// caskdb CLI
#[derive(Parser, Debug)]
#[command(name = "caskdb")]
#[command(about = "Log-structured key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./caskdb_data")]
    dir: String,

    /// Data file size limit in bytes before rotation
    #[arg(short = 'm', long, default_value_t = 256 * 1024 * 1024)]
    max_file_size: u64,

    /// When to fsync the active data file
    #[arg(short, long, value_enum, default_value_t = SyncArg::Always)]
    sync: SyncArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SyncArg {
    /// fsync after every write
    Always,
    /// fsync only on rotation and close
    Manual,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// List all keys in ascending order
    List,

    /// Print key/value pairs in ascending key order
    Scan {
        /// Stop after this many pairs
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print engine statistics
    Stat,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,caskdb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let sync_policy = match args.sync {
        SyncArg::Always => SyncPolicy::Always,
        SyncArg::Manual => SyncPolicy::Manual,
    };

    let config = Config::builder()
        .dir_path(&args.dir)
        .max_file_size(args.max_file_size)
        .sync_policy(sync_policy)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let result = run(&engine, args.command);

    // Close before exiting: process::exit skips destructors
    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(engine: &Engine, command: Commands) -> caskdb::Result<()> {
    match command {
        Commands::Get { key } => {
            let value = engine.get(key.as_bytes())?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::Put { key, value } => {
            engine.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Delete { key } => {
            engine.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::List => {
            for key in engine.list_keys() {
                println!("{}", String::from_utf8_lossy(&key));
            }
        }
        Commands::Scan { limit } => {
            let limit = limit.unwrap_or(usize::MAX);
            let mut printed = 0;
            engine.fold(|key, value| {
                if printed >= limit {
                    return false;
                }
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(value)
                );
                printed += 1;
                true
            })?;
        }
        Commands::Stat => {
            let stat = engine.stat()?;
            println!("keys:       {}", stat.key_count);
            println!("data files: {}", stat.data_file_count);
            println!("disk size:  {} bytes", stat.disk_size);
        }
    }
    Ok(())
}
