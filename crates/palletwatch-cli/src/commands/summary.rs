//! Summary command - aggregate location counts for a warehouse.

use std::path::PathBuf;

use colored::Colorize;
use palletwatch::VirtualLocationEngine;

use crate::loader;

pub fn run(
    warehouses_path: PathBuf,
    warehouse_id: String,
    json_output: bool,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let warehouses = loader::load_warehouses(&warehouses_path)?;
    let grammar = warehouses.require(&warehouse_id)?;
    let summary = VirtualLocationEngine::new(grammar).summary();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Warehouse".cyan().bold(),
        grammar.warehouse_id.white().bold(),
        grammar.name
    );
    println!(
        "Grid: {} aisles x {} racks x {} positions x {} levels",
        grammar.aisles,
        grammar.racks_per_aisle,
        grammar.positions_per_rack,
        grammar.level_names.len()
    );
    println!();
    println!("{}", "Locations by type:".yellow().bold());
    for (label, count) in &summary.locations_by_type {
        println!("  {:14} {:>8}", label, count);
    }
    println!();
    println!("Total locations: {}", summary.total_locations.to_string().white().bold());
    println!("Total capacity:  {}", summary.total_capacity.to_string().white().bold());
    if !summary.special_area_codes.is_empty() {
        println!("Special areas:   {}", summary.special_area_codes.join(", "));
    }

    Ok(())
}
