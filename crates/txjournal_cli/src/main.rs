//! txjournal CLI
//!
//! Command-line tools for txjournal files.
//!
//! # Commands
//!
//! - `dump` - List the frames of a journal file
//! - `verify` - Check checksums and LSN ordering
//! - `simulate` - Run the journal lifecycle against a file
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use txjournal_core::WalMode;

/// txjournal command-line tools.
#[derive(Parser)]
#[command(name = "txjournal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the frames of a journal file
    Dump {
        /// Journal file
        file: PathBuf,

        /// Maximum number of frames to list
        #[arg(short, long)]
        limit: Option<usize>,

        /// Start from this offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check frame checksums and LSN ordering
    Verify {
        /// Journal file
        file: PathBuf,
    },

    /// Run bootstrap, recovery and live phases against a journal file
    Simulate {
        /// Journal file, created if missing
        file: PathBuf,

        /// Entries to submit once live
        #[arg(short, long, default_value = "100")]
        entries: usize,

        /// Rows per entry
        #[arg(short, long, default_value = "1")]
        rows: usize,

        /// WAL mode (none, write, fsync)
        #[arg(short, long, default_value = "write")]
        wal_mode: WalMode,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Dump {
            file,
            limit,
            offset,
            format,
        } => {
            commands::dump::run(&file, limit, offset, &format)?;
        }
        Commands::Verify { file } => {
            commands::verify::run(&file)?;
        }
        Commands::Simulate {
            file,
            entries,
            rows,
            wal_mode,
        } => {
            commands::simulate::run(&file, entries, rows, wal_mode)?;
        }
        Commands::Version => {
            println!("txjournal CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("txjournal core v{}", txjournal_core::VERSION);
        }
    }

    Ok(())
}
