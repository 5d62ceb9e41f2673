//! Helper functions for tree building algorithms.
//!
//! Split search works on row indices into the caller's feature table, so
//! bootstrap samples (indices with repeats) never copy the data.

use crate::primitives::Matrix;
use rand::seq::SliceRandom;
use rand::Rng;

/// Candidate split of a node: rows with `x[feature_idx] <= threshold` go left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Split {
    pub feature_idx: usize,
    pub threshold: f64,
    /// Impurity decrease of the split, weighted by the node size.
    pub gain: f64,
}

/// Gini impurity of a class-count vector.
///
/// Formula: Gini = 1 - `Σ(p_i²)` where `p_i` is the proportion of class i
pub(super) fn gini_impurity(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c / total).powi(2)).sum::<f64>()
}

/// Per-class counts of the labels at `indices`.
pub(super) fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &i in indices {
        counts[y[i]] += 1.0;
    }
    counts
}

/// `(value, row)` pairs of one feature, sorted by value.
fn sorted_column(x: &Matrix<f64>, indices: &[usize], feature_idx: usize) -> Vec<(f64, usize)> {
    let mut column: Vec<(f64, usize)> = indices
        .iter()
        .map(|&i| (x.get(i, feature_idx), i))
        .collect();
    column.sort_by(|a, b| a.0.total_cmp(&b.0));
    column
}

fn is_constant(column: &[(f64, usize)]) -> bool {
    match (column.first(), column.last()) {
        (Some(first), Some(last)) => first.0 == last.0,
        _ => true,
    }
}

/// Best Gini split of one feature, or `None` if the feature is constant.
fn best_gini_split_for_feature(
    x: &Matrix<f64>,
    y: &[usize],
    indices: &[usize],
    feature_idx: usize,
    parent_counts: &[f64],
) -> Option<Split> {
    let column = sorted_column(x, indices, feature_idx);
    if is_constant(&column) {
        return None;
    }

    let n = column.len() as f64;
    let parent_impurity = gini_impurity(parent_counts, n);
    let mut left = vec![0.0; parent_counts.len()];
    let mut right = parent_counts.to_vec();
    let mut best: Option<Split> = None;

    for k in 0..column.len() - 1 {
        let label = y[column[k].1];
        left[label] += 1.0;
        right[label] -= 1.0;

        // Only split between distinct values
        if column[k].0 == column[k + 1].0 {
            continue;
        }

        let n_left = (k + 1) as f64;
        let n_right = n - n_left;
        let weighted = (n_left * gini_impurity(&left, n_left)
            + n_right * gini_impurity(&right, n_right))
            / n;
        let gain = (parent_impurity - weighted) * n;

        if best.map_or(true, |b| gain > b.gain) {
            best = Some(Split {
                feature_idx,
                threshold: (column[k].0 + column[k + 1].0) / 2.0,
                gain,
            });
        }
    }

    best
}

/// Best Gini split over features visited in a random order.
///
/// The search stops once `max_features` non-constant features have been
/// evaluated, so constant features never use up the budget.
pub(super) fn find_best_gini_split<R: Rng + ?Sized>(
    x: &Matrix<f64>,
    y: &[usize],
    indices: &[usize],
    parent_counts: &[f64],
    max_features: usize,
    rng: &mut R,
) -> Option<Split> {
    let mut features: Vec<usize> = (0..x.n_cols()).collect();
    if max_features < features.len() {
        features.shuffle(rng);
    }

    let mut best: Option<Split> = None;
    let mut visited = 0;
    for feature_idx in features {
        if visited >= max_features && best.is_some() {
            break;
        }
        if let Some(split) = best_gini_split_for_feature(x, y, indices, feature_idx, parent_counts)
        {
            visited += 1;
            if best.map_or(true, |b| split.gain > b.gain) {
                best = Some(split);
            }
        }
    }
    best
}

/// Best squared-error split of `targets` over all features.
pub(super) fn find_best_variance_split(
    x: &Matrix<f64>,
    targets: &[f64],
    indices: &[usize],
) -> Option<Split> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let parent_score = total * total / n;
    let mut best: Option<Split> = None;

    for feature_idx in 0..x.n_cols() {
        let column = sorted_column(x, indices, feature_idx);
        if is_constant(&column) {
            continue;
        }

        let mut left_sum = 0.0;
        for k in 0..column.len() - 1 {
            left_sum += targets[column[k].1];
            if column[k].0 == column[k + 1].0 {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total - left_sum;
            // SSE reduction = Σ_side (sum²/n) - parent sum²/n
            let gain =
                left_sum * left_sum / n_left + right_sum * right_sum / n_right - parent_score;

            if best.map_or(true, |b| gain > b.gain) {
                best = Some(Split {
                    feature_idx,
                    threshold: (column[k].0 + column[k + 1].0) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}

/// Partitions `indices` by a split.
pub(super) fn partition(
    x: &Matrix<f64>,
    indices: &[usize],
    split: &Split,
) -> (Vec<usize>, Vec<usize>) {
    indices
        .iter()
        .copied()
        .partition(|&i| x.get(i, split.feature_idx) <= split.threshold)
}
