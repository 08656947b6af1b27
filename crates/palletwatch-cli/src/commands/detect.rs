//! Detect command - warehouse context resolution only.

use std::path::PathBuf;

use colored::Colorize;
use palletwatch::{ContextResolver, WarehouseRegistry};

use crate::loader;

pub fn run(
    snapshot_path: PathBuf,
    warehouses_path: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (snapshot, metadata) = loader::load_snapshot(&snapshot_path)?;
    let warehouses: WarehouseRegistry = loader::load_warehouses(&warehouses_path)?;

    let locations = snapshot.distinct_locations();
    let resolution = ContextResolver::new(&warehouses).detect(&locations);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!(
        "{} {} ({} distinct locations)",
        "Resolving context for".cyan().bold(),
        metadata.file.white(),
        locations.len()
    );
    println!(
        "Best match: {} (score {:.2}, {} confidence{})",
        resolution.warehouse_id.white().bold(),
        resolution.score,
        resolution.confidence.label(),
        if resolution.fallback { ", fallback" } else { "" }
    );

    if verbose {
        println!();
        println!("{}", "Scores:".yellow().bold());
        for score in &resolution.detailed_scores {
            println!(
                "  {:16} {:>3}/{:<3} ({:.2})",
                score.warehouse_id,
                score.matching_locations,
                score.distinct_snapshot_locations,
                score.score
            );
        }
    }

    Ok(())
}
