//! Evaluation metrics for the meta-learner's classifier.

/// Fraction of predictions equal to the true label.
///
/// Returns 0 for empty input.
///
/// # Examples
///
/// ```
/// use metaselect::metrics::accuracy_score;
///
/// let y_true = vec![0, 1, 2, 1];
/// let y_pred = vec![0, 1, 1, 1];
/// assert!((accuracy_score(&y_pred, &y_true) - 0.75).abs() < 1e-12);
/// ```
///
/// # Panics
///
/// Panics if the slices have different lengths.
#[must_use]
pub fn accuracy_score(y_pred: &[usize], y_true: &[usize]) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    if y_true.is_empty() {
        return 0.0;
    }

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f64 / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_perfect_and_none() {
        assert_eq!(accuracy_score(&[1, 0, 1], &[1, 0, 1]), 1.0);
        assert_eq!(accuracy_score(&[0, 1], &[1, 0]), 0.0);
    }

    #[test]
    fn test_accuracy_empty() {
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "Slices must have same length")]
    fn test_accuracy_length_mismatch() {
        let _ = accuracy_score(&[0], &[0, 1]);
    }
}
