//! Validate command - location code diagnostics.

use std::path::PathBuf;

use colored::Colorize;
use palletwatch::VirtualLocationEngine;

use crate::loader;

pub fn run(
    codes: Vec<String>,
    warehouses_path: PathBuf,
    warehouse_id: String,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let warehouses = loader::load_warehouses(&warehouses_path)?;
    let grammar = warehouses.require(&warehouse_id)?;
    let engine = VirtualLocationEngine::new(grammar);

    for code in &codes {
        let validity = engine.validate(code);
        if validity.valid {
            println!("{:16} {}", code, "valid".green());
            if verbose {
                if let Some(record) = engine.resolve(code) {
                    println!(
                        "  type {} zone {} capacity {}",
                        record.location_type.label(),
                        record.zone.as_deref().unwrap_or("-"),
                        record.capacity
                    );
                }
            }
        } else {
            println!(
                "{:16} {} - {}",
                code,
                "invalid".red(),
                validity.reason.unwrap_or_default()
            );
        }
    }

    Ok(())
}
