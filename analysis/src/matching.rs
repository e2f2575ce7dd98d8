//! Tolerance-based matching of evaluation epsilons against the calibrated
//! epsilon set.
//!
//! Epsilon values logged by independent pipelines rarely compare equal
//! exactly, so matching is tolerance-based: any calibrated epsilon strictly
//! within [`EPSILON_TOLERANCE`] of the observed value counts, without
//! seeking the globally closest one.

use robusteval_core::EvaluationRecord;

/// Absolute tolerance when comparing an observed evaluation epsilon against
/// a calibrated one. The comparison is strict: a distance of exactly the
/// tolerance never matches.
pub const EPSILON_TOLERANCE: f64 = 0.01;

/// Outcome of matching one run's evaluation records against one attack
/// type's calibrated epsilon set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpsilonMatch {
    /// Sum of `adv_acc` over the matched records.
    pub matched_acc_sum: f64,
    /// Number of records that matched.
    pub matched_count: usize,
    /// Observed epsilon values consumed, in match order.
    pub matched_epsilons: Vec<f64>,
}

/// Match evaluation records against a calibrated epsilon set.
///
/// A record matches when some calibrated epsilon lies strictly within
/// [`EPSILON_TOLERANCE`] of its epsilon and its exact observed epsilon
/// value has not been consumed by an earlier record: the first record in
/// input order wins, later records carrying the same observed value are
/// skipped.
///
/// `records` must already be restricted to the attack type and run under
/// scoring.
pub fn match_epsilons(calibrated: &[f64], records: &[&EvaluationRecord]) -> EpsilonMatch {
    let mut outcome = EpsilonMatch::default();
    for record in records {
        let within_tolerance = calibrated
            .iter()
            .any(|eps| (eps - record.epsilon).abs() < EPSILON_TOLERANCE);
        // The seen-set is keyed by the observed epsilon, not the calibrated
        // slot it landed on.
        if within_tolerance && !outcome.matched_epsilons.contains(&record.epsilon) {
            outcome.matched_acc_sum += record.adv_acc;
            outcome.matched_count += 1;
            outcome.matched_epsilons.push(record.epsilon);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use robusteval_core::RunId;

    fn record(epsilon: f64, adv_acc: f64) -> EvaluationRecord {
        EvaluationRecord {
            run_id: RunId::from("r1"),
            attack_type: "pgd_linf".to_string(),
            epsilon,
            adv_acc,
        }
    }

    fn run(calibrated: &[f64], records: &[EvaluationRecord]) -> EpsilonMatch {
        let refs: Vec<&EvaluationRecord> = records.iter().collect();
        match_epsilons(calibrated, &refs)
    }

    #[test]
    fn test_exact_epsilons_all_match() {
        let calibrated = [0.01, 0.02, 0.03];
        let records = vec![record(0.01, 0.4), record(0.02, 0.3), record(0.03, 0.2)];
        let m = run(&calibrated, &records);
        assert_eq!(m.matched_count, 3);
        assert!((m.matched_acc_sum - 0.9).abs() < 1e-12);
        assert_eq!(m.matched_epsilons, vec![0.01, 0.02, 0.03]);
    }

    #[test]
    fn test_within_tolerance_matches() {
        let calibrated = [0.02];
        let m = run(&calibrated, &[record(0.025, 0.5)]);
        assert_eq!(m.matched_count, 1);
    }

    #[test]
    fn test_distance_of_exactly_the_tolerance_never_matches() {
        let calibrated = [0.02];
        let m = run(&calibrated, &[record(0.03, 0.5)]);
        assert_eq!(m.matched_count, 0);
        assert!(m.matched_epsilons.is_empty());
    }

    #[test]
    fn test_far_epsilon_never_matches() {
        let calibrated = [0.01, 0.02];
        let m = run(&calibrated, &[record(0.5, 0.9)]);
        assert_eq!(m.matched_count, 0);
        assert!((m.matched_acc_sum).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_observed_epsilon_counts_once_first_wins() {
        let calibrated = [0.02];
        let records = vec![record(0.02, 0.4), record(0.02, 0.9)];
        let m = run(&calibrated, &records);
        assert_eq!(m.matched_count, 1);
        // first record in input order wins
        assert!((m.matched_acc_sum - 0.4).abs() < 1e-12);
        assert_eq!(m.matched_epsilons, vec![0.02]);
    }

    #[test]
    fn test_empty_inputs() {
        let m = run(&[], &[record(0.02, 0.4)]);
        assert_eq!(m.matched_count, 0);
        let m = run(&[0.02], &[]);
        assert_eq!(m, EpsilonMatch::default());
    }
}
