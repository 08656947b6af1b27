//! Palletwatch CLI - warehouse inventory anomaly diagnostics.

mod cli;
mod commands;
mod loader;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Audit {
            snapshot,
            warehouses,
            rules,
            json,
        } => commands::audit::run(snapshot, warehouses, rules, json, cli.verbose),

        Commands::Detect {
            snapshot,
            warehouses,
            json,
        } => commands::detect::run(snapshot, warehouses, json, cli.verbose),

        Commands::Validate {
            codes,
            warehouses,
            warehouse,
        } => commands::validate::run(codes, warehouses, warehouse, cli.verbose),

        Commands::Summary {
            warehouses,
            warehouse,
            json,
        } => commands::summary::run(warehouses, warehouse, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
