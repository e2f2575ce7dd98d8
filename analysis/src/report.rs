//! Operator-facing report output and result persistence.
//!
//! One stdout line per scored run, one per coverage shortfall, one per
//! defense omitted by the admissibility table. Saved output uses the
//! downstream tuple format:
//!
//! ```text
//! [run_id, defense_attack_type, defense_epsilon, [[attack_type, score], ...]]
//! ```

use crate::uar::{CoverageDiagnostic, RunReport};
use robusteval_core::{Result, RobustEvalError};
use serde_json::json;
use std::path::Path;

/// Print the one-line summary for a scored run.
pub fn print_run_line(report: &RunReport) {
    let scores: Vec<(&str, String)> = report
        .scores
        .iter()
        .map(|s| (s.attack_type.as_str(), format!("{:.3}", s.score)))
        .collect();
    println!(
        "{:8} {:9} Eps: {:.3}: {:?}",
        report.run_id.as_str(),
        report.defense_attack_type,
        report.defense_epsilon,
        scores,
    );
}

/// Print the shortfall line for an attack type with incomplete coverage.
pub fn print_coverage_diagnostic(diag: &CoverageDiagnostic) {
    println!(
        "Have {} eval runs for {} ({:9} eps {:.3}) with attack {:9} instead of {}; saw {:?}, need {:?}",
        diag.matched_count,
        diag.run_id.as_str(),
        diag.defense_attack_type,
        diag.defense_epsilon,
        diag.attack_type,
        diag.expected_count,
        diag.observed_epsilons,
        diag.calibrated_epsilons,
    );
}

/// Print the omission line for a defense whose attack type is missing from
/// the max-epsilon table.
pub fn print_omitted_line(attack_type: &str) {
    println!("Adversarially training against {attack_type} not found in max_eps, omitting");
}

/// Serialize reports to the downstream tuple format and write them as
/// pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn save_reports(reports: &[RunReport], path: &Path) -> Result<()> {
    let wire: Vec<serde_json::Value> = reports.iter().map(report_to_wire).collect();
    let json = serde_json::to_string_pretty(&wire)?;
    std::fs::write(path, json)
        .map_err(|e| RobustEvalError::Log(format!("Failed to write {}: {e}", path.display())))
}

fn report_to_wire(report: &RunReport) -> serde_json::Value {
    let scores: Vec<serde_json::Value> = report
        .scores
        .iter()
        .map(|s| json!([&s.attack_type, s.score]))
        .collect();
    json!([
        &report.run_id,
        &report.defense_attack_type,
        report.defense_epsilon,
        scores,
    ])
}
