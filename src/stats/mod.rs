//! Descriptive statistics, correlation and the bootstrap test.
//!
//! - [`mean`], [`median`] and [`std`] aggregate error sequences
//! - [`corr`] and [`corr_matrix`] compute Pearson correlations
//! - [`bootstrap_pvalue`] tests whether a paired difference favors the first
//!   column
//!
//! # Examples
//!
//! ```
//! use metaselect::stats::{mean, median};
//!
//! let data = [1.0, 2.0, 3.0, 10.0];
//! assert_eq!(mean(&data), 4.0);
//! assert_eq!(median(&data), 2.5);
//! ```

pub mod bootstrap;
pub mod covariance;

pub use bootstrap::{bootstrap_pvalue, DEFAULT_BOOTSTRAP_REPS};
pub use covariance::{corr, corr_matrix};

/// Arithmetic mean; NaN for an empty slice.
#[must_use]
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Median; the two middle values are averaged for even lengths.
///
/// NaN for an empty slice. NaN entries sort last.
#[must_use]
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation (divides by n); NaN for an empty slice.
#[must_use]
pub fn std(data: &[f64]) -> f64 {
    let m = mean(data);
    let var = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_median_is_robust_to_outliers() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 1000.0, 4.0]), 3.0);
    }

    #[test]
    fn test_std() {
        let s = std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - 2.0).abs() < 1e-12);
        assert_eq!(std(&[5.0, 5.0]), 0.0);
        assert!(std(&[]).is_nan());
    }
}
