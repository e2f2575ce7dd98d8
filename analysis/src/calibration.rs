//! Attack-type grouping and validation of the calibration baseline set.
//!
//! The calibration set is externally supplied and fixed: for every attack
//! type it carries one baseline entry per canonical attack strength. The
//! grouping here is a pure function of that set; it does not depend on the
//! run being scored and is computed once per invocation.

use crate::matching::EPSILON_TOLERANCE;
use indexmap::IndexMap;
use robusteval_core::{CalibrationEntry, Result, RobustEvalError};

/// Number of calibrated attack strengths per attack type.
///
/// A UAR score is emitted for an attack type only when evaluations covering
/// all of them were found. Fixed by the calibration methodology, asserted by
/// [`validate_calibration`] rather than derived from the data.
pub const CALIBRATED_EPS_PER_ATTACK: usize = 6;

/// Partition calibration entries by attack type.
///
/// Preserves first-seen order of attack types and entry order within each
/// group. Empty input yields an empty map.
pub fn group_by_attack_type(
    entries: &[CalibrationEntry],
) -> IndexMap<String, Vec<CalibrationEntry>> {
    let mut groups: IndexMap<String, Vec<CalibrationEntry>> = IndexMap::new();
    for entry in entries {
        groups
            .entry(entry.config.attack_type.clone())
            .or_default()
            .push(entry.clone());
    }
    groups
}

/// Check the structural invariants of the calibration set.
///
/// Every attack type must carry exactly [`CALIBRATED_EPS_PER_ATTACK`]
/// entries, and its epsilons must be pairwise separated by at least the
/// matching tolerance; closer values would make tolerance matching
/// ambiguous.
///
/// # Errors
///
/// Returns [`RobustEvalError::Calibration`] naming the offending attack
/// type on the first violation found.
pub fn validate_calibration(entries: &[CalibrationEntry]) -> Result<()> {
    for (attack_type, group) in group_by_attack_type(entries) {
        if group.len() != CALIBRATED_EPS_PER_ATTACK {
            return Err(RobustEvalError::Calibration(format!(
                "attack {attack_type} has {} calibrated epsilons, expected {CALIBRATED_EPS_PER_ATTACK}",
                group.len(),
            )));
        }
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                let gap = (a.config.epsilon - b.config.epsilon).abs();
                if gap < EPSILON_TOLERANCE {
                    return Err(RobustEvalError::Calibration(format!(
                        "attack {attack_type} has calibrated epsilons {} and {} within the matching tolerance",
                        a.config.epsilon, b.config.epsilon,
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use robusteval_core::AttackConfig;

    fn entry(attack_type: &str, epsilon: f64) -> CalibrationEntry {
        CalibrationEntry {
            config: AttackConfig {
                attack_type: attack_type.to_string(),
                epsilon,
                n_iter: 50,
                step_size: epsilon / 10.0,
            },
            baseline_acc: 0.5,
            source_run_id: None,
        }
    }

    fn six_entries(attack_type: &str, start: f64) -> Vec<CalibrationEntry> {
        (0..6)
            .map(|i| entry(attack_type, start + 0.01 * i as f64))
            .collect()
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let mut entries = six_entries("pgd_linf", 0.01);
        entries.extend(six_entries("fog", 1.0));
        entries.extend(six_entries("elastic", 2.0));

        let grouped = group_by_attack_type(&entries);
        let keys: Vec<&String> = grouped.keys().collect();
        assert_eq!(keys, ["pgd_linf", "fog", "elastic"]);
        assert_eq!(grouped["fog"].len(), 6);
    }

    #[test]
    fn test_grouping_interleaved_entries_keep_entry_order() {
        let entries = vec![
            entry("pgd_linf", 0.01),
            entry("fog", 1.0),
            entry("pgd_linf", 0.02),
        ];
        let grouped = group_by_attack_type(&entries);
        assert_eq!(grouped.len(), 2);
        let pgd = &grouped["pgd_linf"];
        assert!(pgd[0].config.epsilon < pgd[1].config.epsilon);
    }

    #[test]
    fn test_grouping_empty_input() {
        let grouped = group_by_attack_type(&[]);
        assert!(grouped.is_empty());
    }

    #[test]
    fn test_validation_accepts_canonical_set() {
        let mut entries = six_entries("pgd_linf", 0.01);
        entries.extend(six_entries("fog", 128.0));
        assert!(validate_calibration(&entries).is_ok());
    }

    #[test]
    fn test_validation_rejects_short_group() {
        let entries: Vec<CalibrationEntry> = six_entries("pgd_linf", 0.01)
            .into_iter()
            .take(5)
            .collect();
        let err = validate_calibration(&entries).unwrap_err();
        assert!(err.to_string().contains("expected 6"));
    }

    #[test]
    fn test_validation_rejects_epsilons_within_tolerance() {
        let mut entries = six_entries("pgd_linf", 0.01);
        // 0.062 is only 0.002 away from the sixth epsilon
        entries[5] = entry("pgd_linf", 0.062);
        entries[4] = entry("pgd_linf", 0.06);
        let err = validate_calibration(&entries).unwrap_err();
        assert!(matches!(err, RobustEvalError::Calibration(_)));
    }

    #[test]
    fn test_validation_gap_of_exactly_the_tolerance_is_allowed() {
        // Canonical sets step by exactly 0.01
        let entries = six_entries("pgd_linf", 0.01);
        assert!(validate_calibration(&entries).is_ok());
    }
}
