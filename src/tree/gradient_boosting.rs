//! Gradient Boosting Classifier implementation.
//!
//! Multi-class boosting with softmax (multinomial deviance) loss and
//! squared-error regression trees as weak learners.

use super::RegressionTree;
use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier};
use serde::{Deserialize, Serialize};

/// Gradient Boosting Classifier.
///
/// # Algorithm
///
/// 1. Initialize each class score with the log of its prior frequency
/// 2. For each boosting iteration and each class k:
///    - Compute the negative gradient `1[y = k] - p_k`
///    - Fit a regression tree to it
///    - Set each leaf to the Newton step `(K-1)/K · Σr / Σ|r|(1-|r|)`
///    - Add `learning_rate` times the tree output to the class score
/// 3. Probabilities are the softmax of the class scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    /// Number of boosting iterations
    n_estimators: usize,
    /// Learning rate (shrinkage parameter)
    learning_rate: f64,
    /// Maximum depth of each tree
    max_depth: usize,
    /// Initial score of each class
    init_scores: Vec<f64>,
    /// One tree per class per iteration (`stages[m][k]`)
    stages: Vec<Vec<RegressionTree>>,
    n_features: usize,
}

impl GradientBoostingClassifier {
    /// Creates a new Gradient Boosting Classifier with default parameters.
    ///
    /// # Default Parameters
    ///
    /// - `n_estimators`: 100
    /// - `learning_rate`: 0.1
    /// - `max_depth`: 3
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            init_scores: Vec::new(),
            stages: Vec::new(),
            n_features: 0,
        }
    }

    /// Sets the number of boosting iterations.
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the learning rate (shrinkage parameter).
    ///
    /// Lower values require more trees but often lead to better generalization.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the maximum depth of each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Number of completed boosting iterations.
    #[must_use]
    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    fn raw_scores(&self, sample: &[f64]) -> Vec<f64> {
        let mut scores = self.init_scores.clone();
        for stage in &self.stages {
            for (score, tree) in scores.iter_mut().zip(stage) {
                *score += self.learning_rate * tree.predict_row(sample);
            }
        }
        scores
    }
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Numerically stable softmax.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores
        .iter()
        .copied()
        .filter(|s| s.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        if self.learning_rate <= 0.0 {
            return Err(MetaLearnError::InvalidHyperparameter {
                param: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                constraint: "> 0".to_string(),
            });
        }
        check_fit_inputs(x, y, n_classes)?;

        let n_samples = x.n_rows();
        let mut priors = vec![0.0; n_classes];
        for &label in y {
            priors[label] += 1.0;
        }
        // Absent classes start at -inf and never gain probability
        self.init_scores = priors
            .iter()
            .map(|&c| (c / n_samples as f64).ln())
            .collect();
        self.n_features = x.n_cols();
        self.stages = Vec::with_capacity(self.n_estimators);

        let mut scores: Vec<Vec<f64>> = vec![self.init_scores.clone(); n_samples];
        let scale = if n_classes > 1 {
            (n_classes - 1) as f64 / n_classes as f64
        } else {
            1.0
        };

        for _ in 0..self.n_estimators {
            let proba: Vec<Vec<f64>> = scores.iter().map(|s| softmax(s)).collect();
            let mut stage = Vec::with_capacity(n_classes);

            for k in 0..n_classes {
                let residuals: Vec<f64> = (0..n_samples)
                    .map(|i| f64::from(u8::from(y[i] == k)) - proba[i][k])
                    .collect();

                let leaf_value = |indices: &[usize]| {
                    let numerator: f64 = indices.iter().map(|&i| residuals[i]).sum();
                    let denominator: f64 = indices
                        .iter()
                        .map(|&i| residuals[i].abs() * (1.0 - residuals[i].abs()))
                        .sum();
                    if denominator < 1e-12 {
                        0.0
                    } else {
                        scale * numerator / denominator
                    }
                };
                let tree = RegressionTree::fit(x, &residuals, self.max_depth, &leaf_value);

                for (i, row) in x.rows().enumerate() {
                    scores[i][k] += self.learning_rate * tree.predict_row(row);
                }
                stage.push(tree);
            }
            self.stages.push(stage);
        }

        Ok(())
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        if self.init_scores.is_empty() {
            return Err(MetaLearnError::NotFitted);
        }
        if x.n_cols() != self.n_features {
            return Err(MetaLearnError::dimension_mismatch(
                "features",
                self.n_features,
                x.n_cols(),
            ));
        }

        let n_classes = self.init_scores.len();
        let mut data = Vec::with_capacity(x.n_rows() * n_classes);
        for row in x.rows() {
            data.extend(softmax(&self.raw_scores(row)));
        }
        Ok(Matrix::from_vec(x.n_rows(), n_classes, data)?)
    }

    fn n_classes(&self) -> usize {
        self.init_scores.len()
    }
}
