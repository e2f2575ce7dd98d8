//! Per-run UAR aggregation.
//!
//! For one defense run, matches its evaluation records against every attack
//! type in the calibration set and produces one normalized score per attack
//! type with complete coverage:
//!
//! ```text
//! UAR(attack) = matched_acc_sum / sum(baseline_acc over calibrated entries)
//! ```
//!
//! Attack types whose evaluations do not cover the full calibrated epsilon
//! set are omitted from the report, never zero-filled; each omission is
//! surfaced as a [`CoverageDiagnostic`] so an operator can spot missing
//! evaluation coverage.

use crate::calibration::CALIBRATED_EPS_PER_ATTACK;
use crate::matching::match_epsilons;
use indexmap::IndexMap;
use robusteval_core::{CalibrationEntry, DefenseRecord, EvaluationRecord, RunId};
use serde::{Deserialize, Serialize};

/// Normalized robustness score for one attack type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UarScore {
    /// Attack type the score covers.
    pub attack_type: String,
    /// Ratio of the defended model's summed adversarial accuracy to the
    /// reference model's summed calibrated accuracy.
    pub score: f64,
}

/// Scores for one defense run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The scored training run.
    pub run_id: RunId,
    /// Attack type the defense was trained against (reporting context only;
    /// it plays no role in matching).
    pub defense_attack_type: String,
    /// Training epsilon of the defense (reporting context only).
    pub defense_epsilon: f64,
    /// One entry per attack type with complete coverage, in
    /// calibration-set order.
    pub scores: Vec<UarScore>,
}

/// Shortfall report for an attack type whose evaluations did not cover the
/// full calibrated epsilon set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageDiagnostic {
    /// The run under scoring.
    pub run_id: RunId,
    /// Attack type the defense was trained against.
    pub defense_attack_type: String,
    /// Training epsilon of the defense.
    pub defense_epsilon: f64,
    /// Attack type whose coverage fell short.
    pub attack_type: String,
    /// Number of evaluation records that matched.
    pub matched_count: usize,
    /// Required number of matches.
    pub expected_count: usize,
    /// Observed epsilon values that matched, sorted ascending.
    pub observed_epsilons: Vec<f64>,
    /// The calibrated epsilon set for the attack type.
    pub calibrated_epsilons: Vec<f64>,
}

/// Result of scoring one defense run: the report plus coverage diagnostics
/// for every attack type omitted from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEvaluation {
    /// Scores for the run.
    pub report: RunReport,
    /// One entry per attack type with incomplete coverage.
    pub diagnostics: Vec<CoverageDiagnostic>,
}

/// Compute UAR scores for one defense run.
///
/// Filters `eval_records` down to the run, then matches per attack type in
/// the grouped calibration set. A score is emitted only when the match
/// count equals [`CALIBRATED_EPS_PER_ATTACK`]; otherwise a
/// [`CoverageDiagnostic`] records the shortfall. The defense record
/// contributes reporting context only.
///
/// Pure with respect to its inputs: identical inputs produce identical
/// output.
pub fn compute_uar(
    run_id: &RunId,
    defense: &DefenseRecord,
    eval_records: &[EvaluationRecord],
    grouped: &IndexMap<String, Vec<CalibrationEntry>>,
) -> RunEvaluation {
    let run_records: Vec<&EvaluationRecord> = eval_records
        .iter()
        .filter(|r| r.run_id == *run_id)
        .collect();

    let mut scores = Vec::new();
    let mut diagnostics = Vec::new();

    for (attack_type, entries) in grouped {
        let calibrated: Vec<f64> = entries.iter().map(|e| e.config.epsilon).collect();
        let attack_records: Vec<&EvaluationRecord> = run_records
            .iter()
            .copied()
            .filter(|r| r.attack_type == *attack_type)
            .collect();

        let matched = match_epsilons(&calibrated, &attack_records);

        if matched.matched_count == CALIBRATED_EPS_PER_ATTACK {
            let baseline_sum: f64 = entries.iter().map(|e| e.baseline_acc).sum();
            scores.push(UarScore {
                attack_type: attack_type.clone(),
                score: matched.matched_acc_sum / baseline_sum,
            });
        } else {
            let mut observed = matched.matched_epsilons;
            observed.sort_by(f64::total_cmp);
            diagnostics.push(CoverageDiagnostic {
                run_id: run_id.clone(),
                defense_attack_type: defense.attack_type.clone(),
                defense_epsilon: defense.epsilon,
                attack_type: attack_type.clone(),
                matched_count: matched.matched_count,
                expected_count: CALIBRATED_EPS_PER_ATTACK,
                observed_epsilons: observed,
                calibrated_epsilons: calibrated,
            });
        }
    }

    RunEvaluation {
        report: RunReport {
            run_id: run_id.clone(),
            defense_attack_type: defense.attack_type.clone(),
            defense_epsilon: defense.epsilon,
            scores,
        },
        diagnostics,
    }
}
