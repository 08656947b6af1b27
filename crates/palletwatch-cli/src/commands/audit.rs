//! Audit command - run every active rule against a snapshot.

use std::path::PathBuf;

use colored::Colorize;
use palletwatch::{Palletwatch, RuleStatus, Severity};

use crate::loader;

pub fn run(
    snapshot_path: PathBuf,
    warehouses_path: PathBuf,
    rules_path: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (snapshot, metadata) = loader::load_snapshot(&snapshot_path)?;
    let warehouses = loader::load_warehouses(&warehouses_path)?;
    let rules = loader::load_rules(&rules_path)?;

    let engine = Palletwatch::new(warehouses, rules);
    let result = engine.audit(&snapshot)?;

    if json_output {
        let output = serde_json::json!({
            "snapshot": metadata,
            "audit": result,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} malformed)",
        "Auditing".cyan().bold(),
        metadata.file.white(),
        metadata.rows_loaded,
        metadata.rows_malformed
    );
    println!(
        "Warehouse: {} (score {:.2}, {} confidence{})",
        result.resolution.warehouse_id.white().bold(),
        result.resolution.score,
        result.resolution.confidence.label(),
        if result.resolution.fallback {
            ", fallback"
        } else {
            ""
        }
    );
    if result.low_confidence {
        println!(
            "{}",
            "Warning: low-confidence warehouse match; findings may be unreliable."
                .yellow()
        );
    }
    println!();

    for rule_result in &result.rule_results {
        let status = match rule_result.status {
            RuleStatus::Succeeded => "ok".green(),
            RuleStatus::Failed => "failed".red().bold(),
            RuleStatus::Pending | RuleStatus::Running => "pending".yellow(),
        };
        println!(
            "{:24} [{}] {} finding(s) in {}ms",
            rule_result.rule_id,
            status,
            rule_result.anomalies.len(),
            rule_result.execution_time_ms
        );
        if let Some(ref error) = rule_result.error {
            println!("  {}", error.red());
        }
        if verbose {
            for anomaly in &rule_result.anomalies {
                let severity = match anomaly.severity {
                    Severity::Critical => anomaly.severity.label().red(),
                    Severity::Warning => anomaly.severity.label().yellow(),
                    Severity::Info => anomaly.severity.label().blue(),
                };
                println!("  [{}] {}", severity, anomaly.description);
            }
        }
    }

    let summary = &result.summary;
    println!();
    println!(
        "Found {} finding(s) ({} critical, {} warnings, {} info) on {} pallet(s)",
        summary.total_anomalies.to_string().white().bold(),
        summary.anomalies_by_severity.critical.to_string().red(),
        summary.anomalies_by_severity.warning.to_string().yellow(),
        summary.anomalies_by_severity.info.to_string().blue(),
        summary.distinct_pallets_flagged
    );
    println!(
        "Health score: {}",
        format!("{:.0}%", summary.health_score * 100.0).white().bold()
    );
    println!("{}", summary.recommendation);

    Ok(())
}
