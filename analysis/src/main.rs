//! UAR computation binary.
//!
//! Loads the evaluation log, training log, and calibrated baseline set,
//! scores every selected defense run, prints per-run results and coverage
//! diagnostics, and writes the scores as JSON.
//!
//! Usage:
//!   compute-uar --eval-log-file eval.jsonl --train-log-file train.jsonl \
//!       --calibrated-eps-file calibrated_eps.json --out-file uar.json
//!   compute-uar ... --run-id 3x7x3a1b --max-eps-file max_eps.json

use clap::Parser;
use robusteval_analysis::prelude::*;
use robusteval_analysis::report;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "compute-uar", about = "Compute UAR scores from experiment logs")]
struct Cli {
    /// Evaluation log (JSON array or JSON Lines).
    #[arg(long)]
    eval_log_file: PathBuf,

    /// Training log with one defense configuration per run.
    #[arg(long)]
    train_log_file: PathBuf,

    /// Calibrated epsilon / baseline accuracy set.
    #[arg(long)]
    calibrated_eps_file: PathBuf,

    /// Where to write the scores as JSON.
    #[arg(long)]
    out_file: PathBuf,

    /// Training run ID to compute UAR for. If not specified, computes for
    /// all runs seen in the evaluation log.
    #[arg(long)]
    run_id: Option<String>,

    /// Optional JSON table of maximum admissible training epsilon per
    /// attack type; defenses trained beyond their cap are omitted.
    #[arg(long)]
    max_eps_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let eval_records = LogLoader::load_eval_logs(&cli.eval_log_file)?;
    let defenses = LogLoader::load_train_logs(&cli.train_log_file)?;
    let calibration = LogLoader::load_calibration(&cli.calibrated_eps_file)?;
    validate_calibration(&calibration)?;

    let max_eps = cli
        .max_eps_file
        .as_deref()
        .map(LogLoader::load_max_eps)
        .transpose()?;

    let grouped = group_by_attack_type(&calibration);
    let run_ids = select_run_ids(cli.run_id.map(RunId::new), &eval_records);

    let mut reports = Vec::new();
    for run_id in &run_ids {
        let Some(defense) = defense_for_run(run_id, &defenses) else {
            warn!(%run_id, "no defense record for run, skipping");
            continue;
        };

        match check_admissibility(defense, max_eps.as_ref()) {
            Admissibility::AttackNotListed => {
                report::print_omitted_line(&defense.attack_type);
                continue;
            }
            Admissibility::EpsilonExceedsMax => continue,
            Admissibility::Admissible => {}
        }

        let evaluation = compute_uar(run_id, defense, &eval_records, &grouped);
        for diag in &evaluation.diagnostics {
            report::print_coverage_diagnostic(diag);
        }
        report::print_run_line(&evaluation.report);
        reports.push(evaluation.report);
    }

    report::save_reports(&reports, &cli.out_file)?;

    Ok(())
}
