//! Feature standardization.
//!
//! [`FeatureStats`] holds the per-column mean and standard deviation of a
//! feature table; [`StandardScaler`] wraps it in the [`Transformer`] API so
//! it can sit in front of a classifier in a pipeline.
//!
//! # Example
//!
//! ```
//! use metaselect::prelude::*;
//! use metaselect::preprocessing::StandardScaler;
//!
//! let data = Matrix::from_rows(&[
//!     vec![1.0, 100.0],
//!     vec![2.0, 200.0],
//!     vec![3.0, 300.0],
//!     vec![4.0, 400.0],
//! ]).expect("valid matrix dimensions");
//!
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
//!
//! // Each column now has mean ≈ 0 and std ≈ 1
//! let col: f64 = scaled.column(1).iter().sum();
//! assert!(col.abs() < 1e-9);
//! ```

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};

/// Per-column mean and population standard deviation.
///
/// A column with zero spread gets a standard deviation of 1 so that
/// standardizing it never divides by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl FeatureStats {
    /// Computes column statistics of `x`.
    ///
    /// An empty table yields zero means and unit deviations.
    #[must_use]
    pub fn from_matrix(x: &Matrix<f64>) -> Self {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Self {
                mean: vec![0.0; n_features],
                std: vec![1.0; n_features],
            };
        }

        let mut mean = vec![0.0; n_features];
        for row in x.rows() {
            for (m, &v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n_samples as f64;
        }

        let mut std = vec![0.0; n_features];
        for row in x.rows() {
            for ((s, &m), &v) in std.iter_mut().zip(&mean).zip(row) {
                let diff = v - m;
                *s += diff * diff;
            }
        }
        for s in &mut std {
            // Population std (divide by n, not n-1)
            *s = (*s / n_samples as f64).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Self { mean, std }
    }

    /// Per-column means.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-column standard deviations (never zero).
    #[must_use]
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Number of columns described.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Returns `(x - mean) / std` elementwise.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has a different number of columns.
    pub fn standardize(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let (n_samples, n_features) = x.shape();
        if n_features != self.n_features() {
            return Err(MetaLearnError::dimension_mismatch(
                "features",
                self.n_features(),
                n_features,
            ));
        }

        let mut out = Vec::with_capacity(n_samples * n_features);
        for row in x.rows() {
            for (j, &v) in row.iter().enumerate() {
                out.push((v - self.mean[j]) / self.std[j]);
            }
        }
        Ok(Matrix::from_vec(n_samples, n_features, out)?)
    }
}

/// Standardizes features by removing mean and scaling to unit variance.
///
/// The standard score of a sample x is: z = (x - mean) / std
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    stats: Option<FeatureStats>,
}

impl StandardScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self { stats: None }
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }

    /// Fitted statistics, if any.
    #[must_use]
    pub fn stats(&self) -> Option<&FeatureStats> {
        self.stats.as_ref()
    }
}

impl Transformer for StandardScaler {
    /// Computes the mean and standard deviation of each feature.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        if x.n_rows() == 0 {
            return Err("Cannot fit with zero samples".into());
        }
        self.stats = Some(FeatureStats::from_matrix(x));
        Ok(())
    }

    /// Standardizes the data using fitted mean and std.
    fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.stats
            .as_ref()
            .ok_or(MetaLearnError::NotFitted)?
            .standardize(x)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
