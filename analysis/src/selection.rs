//! Run selection, defense lookup, and max-epsilon admissibility.
//!
//! Decides which defense runs get scored. The admissibility table is passed
//! explicitly as a parameter rather than held as ambient state, keeping the
//! pipeline pure and independently testable.

use robusteval_core::{DefenseRecord, EvaluationRecord, MaxEpsTable, RunId};
use tracing::debug;

/// Determine which defense runs to score.
///
/// An explicit run id restricts scoring to exactly that run, whether or not
/// evaluation records exist for it. Otherwise every run id appearing in the
/// evaluation records is scored, deduplicated in first-seen order.
pub fn select_run_ids(explicit: Option<RunId>, eval_records: &[EvaluationRecord]) -> Vec<RunId> {
    if let Some(run_id) = explicit {
        return vec![run_id];
    }
    let mut run_ids: Vec<RunId> = Vec::new();
    for record in eval_records {
        if !run_ids.contains(&record.run_id) {
            run_ids.push(record.run_id.clone());
        }
    }
    run_ids
}

/// Resolve the defense record for a run.
///
/// The first record carrying the run id wins when the training log holds
/// duplicates. `None` means the run cannot be scored; the caller skips it
/// and proceeds with the remaining runs.
pub fn defense_for_run<'a>(
    run_id: &RunId,
    defenses: &'a [DefenseRecord],
) -> Option<&'a DefenseRecord> {
    defenses.iter().find(|d| d.run_id == *run_id)
}

/// Admissibility of a defense under the optional max-epsilon table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admissibility {
    /// No table supplied, or the training epsilon is within the cap.
    Admissible,
    /// A table was supplied but does not list the defense's attack type;
    /// the run is skipped with an operator-facing diagnostic.
    AttackNotListed,
    /// The training epsilon exceeds the attack type's cap; the run is
    /// skipped.
    EpsilonExceedsMax,
}

/// Check a defense against the optional max-epsilon admissibility table.
pub fn check_admissibility(
    defense: &DefenseRecord,
    max_eps: Option<&MaxEpsTable>,
) -> Admissibility {
    let Some(table) = max_eps else {
        return Admissibility::Admissible;
    };
    match table.get(&defense.attack_type) {
        None => Admissibility::AttackNotListed,
        Some(max) if defense.epsilon <= *max => Admissibility::Admissible,
        Some(max) => {
            debug!(
                run_id = %defense.run_id,
                attack = %defense.attack_type,
                epsilon = defense.epsilon,
                max_epsilon = max,
                "defense trained beyond the admissible epsilon, skipping"
            );
            Admissibility::EpsilonExceedsMax
        }
    }
}
