//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Palletwatch: warehouse inventory anomaly diagnostics
#[derive(Parser)]
#[command(name = "palletwatch")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every active rule against a snapshot and print the findings
    Audit {
        /// Path to the snapshot CSV
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Path to the warehouse registry JSON
        #[arg(short, long, value_name = "FILE")]
        warehouses: PathBuf,

        /// Path to the rule registry JSON
        #[arg(short, long, value_name = "FILE")]
        rules: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve which warehouse a snapshot belongs to
    Detect {
        /// Path to the snapshot CSV
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Path to the warehouse registry JSON
        #[arg(short, long, value_name = "FILE")]
        warehouses: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate location codes against a warehouse grammar
    Validate {
        /// Location codes to check
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,

        /// Path to the warehouse registry JSON
        #[arg(short, long, value_name = "FILE")]
        warehouses: PathBuf,

        /// Warehouse id to validate against
        #[arg(short = 'W', long, value_name = "ID")]
        warehouse: String,
    },

    /// Show aggregate location counts for a warehouse
    Summary {
        /// Path to the warehouse registry JSON
        #[arg(short, long, value_name = "FILE")]
        warehouses: PathBuf,

        /// Warehouse id to summarize
        #[arg(short = 'W', long, value_name = "ID")]
        warehouse: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
