//! K-Nearest Neighbors classifier.

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier};
use serde::{Deserialize, Serialize};

/// K-Nearest Neighbors classifier.
///
/// Instance-based learning algorithm that classifies new samples based on
/// the k closest training examples (Euclidean distance). The probability of
/// a class is its share of the k neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    /// Number of neighbors to use
    k: usize,
    /// Training feature matrix (stored during fit)
    x_train: Option<Matrix<f64>>,
    /// Training labels (stored during fit)
    y_train: Option<Vec<usize>>,
    n_classes: usize,
}

impl KNearestNeighbors {
    /// Creates a new K-Nearest Neighbors classifier.
    ///
    /// # Arguments
    ///
    /// * `k` - Number of neighbors to use for voting
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            x_train: None,
            y_train: None,
            n_classes: 0,
        }
    }

    /// Number of neighbors consulted per prediction.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Labels of the k nearest training rows, closest first.
    ///
    /// Equal distances keep training order.
    fn neighbors(&self, x_train: &Matrix<f64>, y_train: &[usize], sample: &[f64]) -> Vec<usize> {
        let mut distances: Vec<(f64, usize)> = x_train
            .rows()
            .zip(y_train)
            .map(|(row, &label)| (squared_euclidean(row, sample), label))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));
        distances.into_iter().take(self.k).map(|(_, l)| l).collect()
    }
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

impl Default for KNearestNeighbors {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Classifier for KNearestNeighbors {
    /// Stores the training data.
    ///
    /// kNN is a lazy learner; all work is deferred to prediction.
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        check_fit_inputs(x, y, n_classes)?;
        if self.k == 0 || self.k > x.n_rows() {
            return Err(MetaLearnError::InvalidHyperparameter {
                param: "n_neighbors".to_string(),
                value: self.k.to_string(),
                constraint: format!("between 1 and the number of training samples ({})", x.n_rows()),
            });
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.to_vec());
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let x_train = self.x_train.as_ref().ok_or(MetaLearnError::NotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(MetaLearnError::NotFitted)?;
        if x.n_cols() != x_train.n_cols() {
            return Err(MetaLearnError::dimension_mismatch(
                "features",
                x_train.n_cols(),
                x.n_cols(),
            ));
        }

        let share = 1.0 / self.k as f64;
        let mut data = vec![0.0; x.n_rows() * self.n_classes];
        for (i, sample) in x.rows().enumerate() {
            for label in self.neighbors(x_train, y_train, sample) {
                data[i * self.n_classes + label] += share;
            }
        }
        Ok(Matrix::from_vec(x.n_rows(), self.n_classes, data)?)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}
