//! RobustEval analysis pipeline
//!
//! Computes Unified Adversarial Robustness (UAR) scores for defended models
//! from experiment logs. For each trained defense, the pipeline finds the
//! matching evaluation records, checks that exactly the expected calibration
//! strengths were evaluated, and emits one normalized score per attack type:
//!
//! ```text
//! UAR(attack) = sum(adv_acc over matched evals) / sum(calibrated baseline acc)
//! ```
//!
//! # Modules
//!
//! - [`logs`] — Loaders for evaluation/training log files and the
//!   calibration and max-epsilon tables
//! - [`calibration`] — Attack-type grouping and calibration-set validation
//! - [`matching`] — Tolerance-based epsilon matching with deduplication
//! - [`uar`] — Per-run score aggregation and coverage diagnostics
//! - [`selection`] — Run selection, defense lookup, admissibility
//! - [`report`] — Operator-facing output and result persistence

pub mod calibration;
pub mod logs;
pub mod matching;
pub mod report;
pub mod selection;
pub mod uar;

/// Re-export commonly used types for pipeline consumers.
pub mod prelude {
    pub use crate::calibration::{
        group_by_attack_type, validate_calibration, CALIBRATED_EPS_PER_ATTACK,
    };
    pub use crate::logs::LogLoader;
    pub use crate::matching::{match_epsilons, EpsilonMatch, EPSILON_TOLERANCE};
    pub use crate::selection::{check_admissibility, defense_for_run, select_run_ids, Admissibility};
    pub use crate::uar::{compute_uar, CoverageDiagnostic, RunEvaluation, RunReport, UarScore};
    pub use robusteval_core::{
        AttackConfig, CalibrationEntry, DefenseRecord, EvaluationRecord, MaxEpsTable,
        RobustEvalError, RunId,
    };
}
