//! One-sided paired bootstrap test.

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use rand::Rng;

/// Number of resamples used when the caller has no preference.
pub const DEFAULT_BOOTSTRAP_REPS: usize = 200;

/// Bootstrap p-value that the first column's mean advantage over the second
/// is not above zero.
///
/// `pairs` is an `n × 2` table (one row per paired observation). The row
/// differences `col0 - col1` are resampled with replacement `reps` times at
/// the original size; the p-value is the fraction of resample means that
/// are negative.
///
/// # Errors
///
/// Returns an error if `pairs` does not have exactly two columns, has no
/// rows, or `reps` is zero.
///
/// # Examples
///
/// ```
/// use metaselect::primitives::Matrix;
/// use metaselect::stats::bootstrap_pvalue;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// // First column always ahead: no resample mean can be negative
/// let pairs = Matrix::from_rows(&[vec![0.9, 0.1], vec![0.8, 0.2], vec![0.7, 0.3]])
///     .expect("3x2 matrix");
/// let mut rng = StdRng::seed_from_u64(0);
/// let p = bootstrap_pvalue(&pairs, 200, &mut rng).expect("valid input");
/// assert_eq!(p, 0.0);
/// ```
pub fn bootstrap_pvalue<R: Rng + ?Sized>(
    pairs: &Matrix<f64>,
    reps: usize,
    rng: &mut R,
) -> Result<f64> {
    if pairs.n_cols() != 2 {
        return Err(MetaLearnError::dimension_mismatch(
            "bootstrap columns",
            2,
            pairs.n_cols(),
        ));
    }
    let n = pairs.n_rows();
    if n == 0 {
        return Err("Cannot bootstrap an empty sample".into());
    }
    if reps == 0 {
        return Err(MetaLearnError::InvalidHyperparameter {
            param: "reps".to_string(),
            value: "0".to_string(),
            constraint: ">= 1".to_string(),
        });
    }

    let diff: Vec<f64> = pairs.rows().map(|r| r[0] - r[1]).collect();
    let negative = (0..reps)
        .filter(|_| {
            let total: f64 = (0..n).map(|_| diff[rng.gen_range(0..n)]).sum();
            total / (n as f64) < 0.0
        })
        .count();

    Ok(negative as f64 / reps as f64)
}
