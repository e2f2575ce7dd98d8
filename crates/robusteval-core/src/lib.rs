//! Core types and errors for RobustEval
//!
//! This crate contains the foundational record types shared across all
//! RobustEval components: the identifiers and log records produced by the
//! external experiment-logging system, the calibration baseline entries, and
//! the error type used by the loaders and the analysis pipeline.
//!
//! All record types here are read-only query results: they are constructed
//! once by the loaders and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a training run, as assigned by the experiment logger.
///
/// Links a [`DefenseRecord`] to the zero-or-more [`EvaluationRecord`]s
/// produced by evaluating that trained model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Create a run ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Log record types
// ---------------------------------------------------------------------------

/// One model evaluated under one attack at one perturbation budget.
///
/// Produced by the external evaluation pipeline, one record per
/// (model, attack, epsilon) evaluation. Upstream log files may carry extra
/// fields; they are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Training run whose model was evaluated.
    #[serde(alias = "wandb_run_id")]
    pub run_id: RunId,
    /// Attack method used for this evaluation.
    #[serde(alias = "attack")]
    pub attack_type: String,
    /// Perturbation budget the attack ran at.
    pub epsilon: f64,
    /// Adversarial accuracy of the defended model under this attack.
    pub adv_acc: f64,
}

/// The attack configuration a model was *trained* to resist.
///
/// One record per training run. Only `attack_type`, `epsilon`, and `run_id`
/// feed into scoring; the remaining fields are carried for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseRecord {
    /// Attack method used during adversarial training.
    #[serde(alias = "attack")]
    pub attack_type: String,
    /// Perturbation budget used during training.
    pub epsilon: f64,
    /// Number of attack iterations used during training.
    #[serde(alias = "n_iters")]
    pub n_iter: u32,
    /// Attack step size used during training.
    pub step_size: f64,
    /// Identifier of the training run.
    #[serde(alias = "wandb_run_id")]
    pub run_id: RunId,
    /// Whether the model was adversarially trained at all.
    #[serde(alias = "adv_train")]
    pub adv_train_flag: bool,
    /// Standard (clean) accuracy of the trained model.
    pub std_acc: f64,
}

// ---------------------------------------------------------------------------
// Calibration types
// ---------------------------------------------------------------------------

/// A fixed, canonical attack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackConfig {
    /// Attack method.
    pub attack_type: String,
    /// Perturbation budget.
    pub epsilon: f64,
    /// Number of attack iterations.
    pub n_iter: u32,
    /// Attack step size.
    pub step_size: f64,
}

/// Calibration baseline entry (ATA): the accuracy an undefended reference
/// model achieves at a fixed, canonical attack strength.
///
/// The full calibration set is externally supplied and fixed; exactly six
/// distinct epsilon values are expected per attack type. Acts as the
/// denominator basis when normalizing a defended model's accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    /// The canonical attack configuration this baseline was measured at.
    pub config: AttackConfig,
    /// Accuracy of the undefended reference model.
    pub baseline_acc: f64,
    /// Run that produced the baseline measurement, when recorded.
    pub source_run_id: Option<RunId>,
}

/// Maximum admissible training epsilon per attack type.
///
/// Defenses trained beyond their attack's cap are excluded from scoring.
pub type MaxEpsTable = HashMap<String, f64>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Core error types.
#[derive(thiserror::Error, Debug)]
pub enum RobustEvalError {
    /// Log file could not be read or parsed. Fatal for the invocation: the
    /// pipeline assumes structurally well-formed records.
    #[error("Log error: {0}")]
    Log(String),

    /// Calibration set violates a structural invariant.
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// Serialization / deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for `std::result::Result<T, RobustEvalError>`.
pub type Result<T> = std::result::Result<T, RobustEvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_display() {
        let id = RunId::new("3x7x3a1b");
        assert_eq!(id.to_string(), "3x7x3a1b");
        assert_eq!(id.as_str(), "3x7x3a1b");
    }

    #[test]
    fn test_run_id_serde_transparent() {
        let id = RunId::from("r1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""r1""#);
        let back: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_evaluation_record_accepts_wandb_field_names() {
        let json = r#"{"wandb_run_id": "r1", "attack": "pgd_linf", "epsilon": 0.03, "adv_acc": 0.41}"#;
        let rec: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.run_id, RunId::from("r1"));
        assert_eq!(rec.attack_type, "pgd_linf");
        assert!((rec.epsilon - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn test_evaluation_record_ignores_extra_fields() {
        let json = r#"{"run_id": "r1", "attack_type": "fog", "epsilon": 0.5,
                       "adv_acc": 0.2, "std_acc": 0.9, "commit": "abc123"}"#;
        let rec: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.attack_type, "fog");
    }

    #[test]
    fn test_evaluation_record_missing_field_is_an_error() {
        let json = r#"{"run_id": "r1", "attack_type": "fog", "epsilon": 0.5}"#;
        assert!(serde_json::from_str::<EvaluationRecord>(json).is_err());
    }

    #[test]
    fn test_defense_record_accepts_aliases() {
        let json = r#"{"attack": "pgd_linf", "epsilon": 0.03, "n_iters": 50,
                       "step_size": 0.005, "wandb_run_id": "r9",
                       "adv_train": true, "std_acc": 0.87}"#;
        let rec: DefenseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.run_id, RunId::from("r9"));
        assert_eq!(rec.n_iter, 50);
        assert!(rec.adv_train_flag);
    }
}
