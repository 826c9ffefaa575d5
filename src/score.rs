//! Alignment of extracted predictions with human labels, and correlation
//! scoring between the two.
//!
//! Predictions are matched to labels by relative order: the i-th extracted
//! value pairs with the i-th label whose index was not dropped.

use crate::error::{EvalError, Result};
use crate::stats::{kendall_tau, pearson, round4, spearman};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// What to do when predictions and labels differ in length and no dropped
/// indices explain the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Warn and score against the unfiltered labels.
    #[default]
    Lenient,
    /// Fail with [`EvalError::LengthMismatch`].
    Strict,
}

/// Rounded correlation coefficients for one slice.
///
/// A coefficient is `NaN` when it is undefined for the inputs (constant
/// sequence, fewer than two pairs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationScores {
    pub spearman: f64,
    pub pearson: f64,
    pub kendall: f64,
}

/// Build the label sequence that lines up with `values_len` predictions.
///
/// When the lengths already match, `labels` is returned as-is and `dropped`
/// is not consulted, even if it is non-empty.
pub fn align_labels(
    values_len: usize,
    labels: &[f64],
    dropped: &[usize],
    policy: AlignmentPolicy,
) -> Result<Vec<f64>> {
    if values_len == labels.len() {
        return Ok(labels.to_vec());
    }

    if !dropped.is_empty() {
        let dropped: HashSet<usize> = dropped.iter().copied().collect();
        return Ok(labels
            .iter()
            .enumerate()
            .filter(|(i, _)| !dropped.contains(i))
            .map(|(_, &label)| label)
            .collect());
    }

    match policy {
        AlignmentPolicy::Lenient => {
            warn!(
                predictions = values_len,
                labels = labels.len(),
                "The number of predictions and labels are not equal. Please check the data."
            );
            Ok(labels.to_vec())
        }
        AlignmentPolicy::Strict => Err(EvalError::LengthMismatch {
            values: values_len,
            labels: labels.len(),
        }),
    }
}

/// Align labels to predictions and compute Spearman, Pearson and Kendall
/// correlation, each rounded to four decimals.
///
/// If the aligned labels still differ in length from `values` (lenient
/// policy, or a drop set of the wrong size), pairs are formed positionally
/// up to the shorter of the two.
pub fn compute_correlation(
    values: &[f64],
    labels: &[f64],
    dropped: &[usize],
    policy: AlignmentPolicy,
) -> Result<CorrelationScores> {
    let aligned = align_labels(values.len(), labels, dropped, policy)?;

    let n = values.len().min(aligned.len());
    if n != values.len() || n != aligned.len() {
        warn!(
            predictions = values.len(),
            labels = aligned.len(),
            paired = n,
            "scoring on the common prefix of predictions and labels"
        );
    }
    let (x, y) = (&values[..n], &aligned[..n]);

    let rho = spearman(x, y);
    let r = pearson(x, y);
    let tau = kendall_tau(x, y);
    debug!(spearman = rho, pearson = r, kendall = tau, pairs = n, "correlation");

    Ok(CorrelationScores {
        spearman: round4(rho),
        pearson: round4(r),
        kendall: round4(tau),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_drops_listed_indices() {
        let aligned = align_labels(3, &[10.0, 20.0, 30.0, 40.0], &[2], AlignmentPolicy::Strict).unwrap();
        assert_eq!(aligned, vec![10.0, 20.0, 40.0]);
    }

    #[test]
    fn test_align_preserves_order_with_many_drops() {
        let labels: Vec<f64> = (0..10).map(f64::from).collect();
        let dropped = [0, 3, 4, 9];
        let aligned = align_labels(6, &labels, &dropped, AlignmentPolicy::Lenient).unwrap();
        assert_eq!(aligned, vec![1.0, 2.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_equal_lengths_ignore_drop_set() {
        // Length equality wins over an explicit drop set.
        let aligned = align_labels(3, &[1.0, 2.0, 3.0], &[0], AlignmentPolicy::Strict).unwrap();
        assert_eq!(aligned, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mismatch_without_drops_lenient_keeps_labels() {
        let aligned = align_labels(2, &[1.0, 2.0, 3.0], &[], AlignmentPolicy::Lenient).unwrap();
        assert_eq!(aligned, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mismatch_without_drops_strict_fails() {
        let err = align_labels(2, &[1.0, 2.0, 3.0], &[], AlignmentPolicy::Strict).unwrap_err();
        assert!(matches!(err, EvalError::LengthMismatch { values: 2, labels: 3 }));
    }

    #[test]
    fn test_correlation_after_drop() {
        let scores = compute_correlation(
            &[1.0, 2.0, 3.0],
            &[10.0, 20.0, 30.0, 40.0],
            &[2],
            AlignmentPolicy::Strict,
        )
        .unwrap();
        assert_eq!(scores.spearman, 1.0);
        assert_eq!(scores.kendall, 1.0);
        assert_eq!(scores.pearson, 0.982);
    }

    #[test]
    fn test_constant_labels_give_nan() {
        let scores =
            compute_correlation(&[1.0, 7.0, 3.0], &[5.0, 5.0, 5.0], &[], AlignmentPolicy::Lenient)
                .unwrap();
        assert!(scores.spearman.is_nan());
        assert!(scores.pearson.is_nan());
        assert!(scores.kendall.is_nan());
    }

    #[test]
    fn test_lenient_mismatch_pairs_common_prefix() {
        let scores = compute_correlation(
            &[1.0, 2.0, 3.0],
            &[3.0, 2.0, 1.0, 0.0],
            &[],
            AlignmentPolicy::Lenient,
        )
        .unwrap();
        assert_eq!(scores.spearman, -1.0);
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: AlignmentPolicy = serde_yaml::from_str("strict").unwrap();
        assert_eq!(policy, AlignmentPolicy::Strict);
    }
}
