//! Pearson correlation of feature columns.

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;

/// Computes the Pearson correlation coefficient between two variables.
///
/// Pearson correlation: `ρ(X, Y) = Cov(X, Y) / (σ_X σ_Y)`
///
/// # Errors
///
/// Returns error if the slices have different lengths, are empty, or either
/// has zero variance.
///
/// # Examples
///
/// ```
/// use metaselect::stats::corr;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [2.0, 4.0, 6.0, 8.0];
///
/// let correlation = corr(&x, &y).expect("Should compute correlation");
/// assert!((correlation - 1.0).abs() < 1e-12);
/// ```
pub fn corr(x: &[f64], y: &[f64]) -> Result<f64> {
    let n = x.len();

    if n != y.len() {
        return Err(MetaLearnError::DimensionMismatch {
            expected: format!("{n} values in x"),
            actual: format!("{} values in y", y.len()),
        });
    }

    if n == 0 {
        return Err("Cannot compute correlation of empty vectors".into());
    }

    let value = pearson(x, y);
    if value.is_nan() {
        return Err("Cannot compute correlation when variance is zero".into());
    }
    Ok(value)
}

/// Pearson correlation, NaN when either side has zero variance.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut cov_sum = 0.0;
    let mut x_var_sum = 0.0;
    let mut y_var_sum = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let x_diff = xi - x_mean;
        let y_diff = yi - y_mean;
        cov_sum += x_diff * y_diff;
        x_var_sum += x_diff * x_diff;
        y_var_sum += y_diff * y_diff;
    }

    if x_var_sum < 1e-20 || y_var_sum < 1e-20 {
        return f64::NAN;
    }
    (cov_sum / (x_var_sum.sqrt() * y_var_sum.sqrt())).clamp(-1.0, 1.0)
}

/// Computes the Pearson correlation matrix of the columns of `data`.
///
/// Entry (i, j) is the correlation between feature i and feature j. A column
/// with zero variance correlates with nothing: its whole row and column
/// (diagonal included) are NaN.
///
/// # Errors
///
/// Returns error if `data` has no rows or no columns.
///
/// # Examples
///
/// ```
/// use metaselect::stats::corr_matrix;
/// use metaselect::primitives::Matrix;
///
/// // 3 samples, 2 features
/// let data = Matrix::from_vec(3, 2, vec![
///     1.0, 2.0,
///     2.0, 4.0,
///     3.0, 6.0,
/// ]).expect("Valid matrix");
///
/// let corr_mat = corr_matrix(&data).expect("Should compute correlation matrix");
/// assert_eq!(corr_mat.shape(), (2, 2));
/// assert!((corr_mat.get(0, 1) - 1.0).abs() < 1e-12);
/// ```
pub fn corr_matrix(data: &Matrix<f64>) -> Result<Matrix<f64>> {
    let (n, p) = data.shape();
    if n == 0 || p == 0 {
        return Err("Cannot compute correlation matrix for empty data".into());
    }

    let columns: Vec<Vec<f64>> = (0..p).map(|j| data.column(j)).collect();
    let mut out = Matrix::zeros(p, p);
    for i in 0..p {
        for j in 0..=i {
            let value = if i == j {
                let self_corr = pearson(&columns[i], &columns[i]);
                if self_corr.is_nan() {
                    f64::NAN
                } else {
                    1.0
                }
            } else {
                pearson(&columns[i], &columns[j])
            };
            out.set(i, j, value);
            out.set(j, i, value);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "covariance_tests.rs"]
mod tests;
