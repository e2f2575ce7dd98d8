//! Experiment log loading for the UAR pipeline.
//!
//! Provides structured loading of the three record collections (plus the
//! optional admissibility table) produced by the external experiment-logging
//! system:
//!
//! | Input | Shape | Loaded as |
//! |-------|-------|-----------|
//! | Evaluation log | objects with `wandb_run_id`, `attack`, `epsilon`, `adv_acc` | [`EvaluationRecord`] |
//! | Training log | objects with the defense configuration per run | [`DefenseRecord`] |
//! | Calibrated eps file | `[[attack, eps, n_iter, step_size], ata, run_id?]` tuples | [`CalibrationEntry`] |
//! | Max eps file | object mapping attack type to maximum epsilon | [`MaxEpsTable`] |
//!
//! Log files may be a single JSON array or JSON Lines (one record per line);
//! the two are distinguished by the first non-whitespace byte. Extra fields
//! in log records are ignored. Structurally malformed input is fatal for the
//! whole invocation: loaders return an error and the pipeline never sees the
//! records.

use robusteval_core::{
    AttackConfig, CalibrationEntry, DefenseRecord, EvaluationRecord, MaxEpsTable, Result,
    RobustEvalError, RunId,
};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Wire form of one calibration entry:
/// `[[attack_type, epsilon, n_iter, step_size], baseline_acc, source_run_id]`.
type RawCalibrationEntry = ((String, f64, u32, f64), f64, Option<RunId>);

/// Loads experiment logs and calibration tables from JSON files.
pub struct LogLoader;

impl LogLoader {
    /// Load evaluation records from a log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any record fails to
    /// parse.
    pub fn load_eval_logs(path: &Path) -> Result<Vec<EvaluationRecord>> {
        Self::load_records(path)
    }

    /// Parse evaluation records from a JSON array or JSON Lines string.
    pub fn eval_logs_from_str(content: &str) -> Result<Vec<EvaluationRecord>> {
        parse_records(content)
            .map_err(|e| RobustEvalError::Log(format!("Failed to parse evaluation log: {e}")))
    }

    /// Load defense (training) records from a log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any record fails to
    /// parse.
    pub fn load_train_logs(path: &Path) -> Result<Vec<DefenseRecord>> {
        Self::load_records(path)
    }

    /// Parse defense records from a JSON array or JSON Lines string.
    pub fn train_logs_from_str(content: &str) -> Result<Vec<DefenseRecord>> {
        parse_records(content)
            .map_err(|e| RobustEvalError::Log(format!("Failed to parse training log: {e}")))
    }

    /// Load the calibration baseline set from its JSON tuple format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the tuple structure
    /// does not match.
    pub fn load_calibration(path: &Path) -> Result<Vec<CalibrationEntry>> {
        let content = Self::read_file(path)?;
        let raw: Vec<RawCalibrationEntry> = serde_json::from_str(&content)
            .map_err(|e| RobustEvalError::Log(format!("Failed to parse {}: {e}", path.display())))?;
        Ok(raw.into_iter().map(calibration_entry_from_raw).collect())
    }

    /// Parse calibration entries from a JSON string (useful for embedded
    /// calibration sets).
    pub fn calibration_from_str(content: &str) -> Result<Vec<CalibrationEntry>> {
        let raw: Vec<RawCalibrationEntry> = serde_json::from_str(content)
            .map_err(|e| RobustEvalError::Log(format!("Failed to parse calibration set: {e}")))?;
        Ok(raw.into_iter().map(calibration_entry_from_raw).collect())
    }

    /// Load the optional max-epsilon admissibility table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object
    /// of attack type to epsilon.
    pub fn load_max_eps(path: &Path) -> Result<MaxEpsTable> {
        let content = Self::read_file(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RobustEvalError::Log(format!("Failed to parse {}: {e}", path.display())))
    }

    fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let content = Self::read_file(path)?;
        parse_records(&content)
            .map_err(|e| RobustEvalError::Log(format!("Failed to parse {}: {e}", path.display())))
    }

    fn read_file(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| RobustEvalError::Log(format!("Failed to read {}: {e}", path.display())))
    }
}

/// Parse a record collection from either a JSON array or JSON Lines.
fn parse_records<T: DeserializeOwned>(content: &str) -> serde_json::Result<Vec<T>> {
    if content.trim_start().starts_with('[') {
        serde_json::from_str(content)
    } else {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(serde_json::from_str)
            .collect()
    }
}

fn calibration_entry_from_raw(raw: RawCalibrationEntry) -> CalibrationEntry {
    let ((attack_type, epsilon, n_iter, step_size), baseline_acc, source_run_id) = raw;
    CalibrationEntry {
        config: AttackConfig {
            attack_type,
            epsilon,
            n_iter,
            step_size,
        },
        baseline_acc,
        source_run_id,
    }
}
