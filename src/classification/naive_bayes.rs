//! Gaussian Naive Bayes classifier.

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier};
use serde::{Deserialize, Serialize};

/// Gaussian Naive Bayes classifier.
///
/// Assumes features are conditionally independent given the class and
/// normally distributed within each class:
///
/// P(y=c|X) ∝ P(y=c) * ∏ `P(x_i|y=c)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNB {
    /// Log prior per class (`-inf` for classes without training rows)
    log_priors: Option<Vec<f64>>,
    /// Feature means per class: means[class][feature]
    means: Option<Vec<Vec<f64>>>,
    /// Feature variances per class: variances[class][feature]
    variances: Option<Vec<Vec<f64>>>,
    /// Portion of the largest feature variance added to every variance
    var_smoothing: f64,
}

impl GaussianNB {
    /// Creates a new Gaussian Naive Bayes classifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_priors: None,
            means: None,
            variances: None,
            var_smoothing: 1e-9,
        }
    }

    /// Sets the variance smoothing factor.
    ///
    /// `var_smoothing` times the largest feature variance of the training
    /// data is added to every per-class variance.
    #[must_use]
    pub fn with_var_smoothing(mut self, var_smoothing: f64) -> Self {
        self.var_smoothing = var_smoothing;
        self
    }
}

impl Default for GaussianNB {
    fn default() -> Self {
        Self::new()
    }
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

impl Classifier for GaussianNB {
    /// Computes class priors, feature means and variances for each class.
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_inputs(x, y, n_classes)?;
        let (n_samples, n_features) = x.shape();

        let max_variance = (0..n_features)
            .map(|j| mean_and_variance(&x.column(j)).1)
            .fold(0.0, f64::max);
        // Constant data still needs a positive variance
        let epsilon = if max_variance > 0.0 {
            self.var_smoothing * max_variance
        } else {
            self.var_smoothing
        };

        let mut log_priors = vec![f64::NEG_INFINITY; n_classes];
        let mut means = vec![vec![0.0; n_features]; n_classes];
        let mut variances = vec![vec![1.0; n_features]; n_classes];

        for class in 0..n_classes {
            let members: Vec<usize> = (0..n_samples).filter(|&i| y[i] == class).collect();
            if members.is_empty() {
                continue;
            }
            log_priors[class] = (members.len() as f64 / n_samples as f64).ln();

            for j in 0..n_features {
                let column: Vec<f64> = members.iter().map(|&i| x.get(i, j)).collect();
                let (mean, var) = mean_and_variance(&column);
                means[class][j] = mean;
                variances[class][j] = var + epsilon;
            }
        }

        self.log_priors = Some(log_priors);
        self.means = Some(means);
        self.variances = Some(variances);
        Ok(())
    }

    /// Posterior class probabilities via log-sum-exp normalization.
    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let log_priors = self.log_priors.as_ref().ok_or(MetaLearnError::NotFitted)?;
        let means = self.means.as_ref().ok_or(MetaLearnError::NotFitted)?;
        let variances = self.variances.as_ref().ok_or(MetaLearnError::NotFitted)?;

        let n_classes = log_priors.len();
        let n_features = means.first().map_or(0, Vec::len);
        if x.n_cols() != n_features {
            return Err(MetaLearnError::dimension_mismatch(
                "features",
                n_features,
                x.n_cols(),
            ));
        }

        let mut data = Vec::with_capacity(x.n_rows() * n_classes);
        for sample in x.rows() {
            let log_probs: Vec<f64> = (0..n_classes)
                .map(|c| {
                    if log_priors[c] == f64::NEG_INFINITY {
                        return f64::NEG_INFINITY;
                    }
                    // Log of Gaussian PDF: -0.5 * log(2π*σ²) - (x-μ)² / (2σ²)
                    let log_likelihood: f64 = sample
                        .iter()
                        .zip(&means[c])
                        .zip(&variances[c])
                        .map(|((&v, &mean), &var)| {
                            -0.5 * (2.0 * std::f64::consts::PI * var).ln()
                                - (v - mean).powi(2) / (2.0 * var)
                        })
                        .sum();
                    log_priors[c] + log_likelihood
                })
                .collect();

            let max_log_prob = log_probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let exp_probs: Vec<f64> = log_probs
                .iter()
                .map(|&log_p| (log_p - max_log_prob).exp())
                .collect();
            let sum: f64 = exp_probs.iter().sum();
            data.extend(exp_probs.iter().map(|p| p / sum));
        }

        Ok(Matrix::from_vec(x.n_rows(), n_classes, data)?)
    }

    fn n_classes(&self) -> usize {
        self.log_priors.as_ref().map_or(0, Vec::len)
    }
}
