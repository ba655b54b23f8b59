//! Tagset CLI
//!
//! Command-line tools for serialized tagset records.
//!
//! # Commands
//!
//! - `inspect` - Display envelope sizes and pairs of each record in a file
//! - `verify` - Decode, re-encode and compare every record in a file
//! - `dump` - Print records as an indented tree
//! - `demo` - Write a sample record file

mod commands;
mod error;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Tagset record tools.
#[derive(Parser)]
#[command(name = "tagset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the record file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display envelope sizes and pairs
    Inspect {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Verify that every record re-encodes to identical bytes
    Verify,

    /// Print records as an indented tree
    Dump {
        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Write a sample record file
    Demo,

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
        Commands::Inspect { format } => {
            let path = cli.path.ok_or(CliError::MissingPath("inspect"))?;
            commands::inspect::run(&path, format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or(CliError::MissingPath("verify"))?;
            commands::verify::run(&path)?;
        }
        Commands::Dump { limit } => {
            let path = cli.path.ok_or(CliError::MissingPath("dump"))?;
            commands::dump::run(&path, limit)?;
        }
        Commands::Demo => {
            let path = cli.path.ok_or(CliError::MissingPath("demo"))?;
            commands::demo::run(&path)?;
        }
        Commands::Version => {
            println!("tagset CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
