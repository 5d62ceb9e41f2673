//! Classification algorithms.
//!
//! This module implements classification algorithms including:
//! - K-Nearest Neighbors (kNN) for instance-based classification
//! - Gaussian Naive Bayes for probabilistic classification
//! - Kernel Support Vector Machine (RBF, one-vs-rest)
//! - [`Pipeline`] to put a [`Transformer`] in front of any classifier
//!
//! Tree-based classifiers live in [`crate::tree`].
//!
//! # Example
//!
//! ```
//! use metaselect::classification::KNearestNeighbors;
//! use metaselect::prelude::*;
//!
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 0
//!     1.0, 0.0,  // class 0
//!     5.0, 5.0,  // class 1
//!     5.0, 6.0,  // class 1
//!     6.0, 5.0,  // class 1
//! ]).expect("6x2 matrix with 12 values");
//! let y = vec![0, 0, 0, 1, 1, 1];
//!
//! let mut knn = KNearestNeighbors::new(3);
//! knn.fit(&x, &y, 2).expect("Valid training data with 6 samples");
//!
//! let test = Matrix::from_vec(1, 2, vec![0.5, 0.5]).expect("1x2 test matrix");
//! assert_eq!(knn.predict(&test).expect("fitted"), vec![0]);
//! ```

mod knn;
mod naive_bayes;
mod svm;

pub use knn::KNearestNeighbors;
pub use naive_bayes::GaussianNB;
pub use svm::{Gamma, SupportVectorClassifier};

use crate::error::Result;
use crate::primitives::Matrix;
use crate::traits::{Classifier, Transformer};
use serde::{Deserialize, Serialize};

/// A transformer followed by a classifier.
///
/// `fit` fits the transformer on the training data and trains the
/// classifier on the transformed rows; prediction applies the same
/// transform first.
///
/// # Example
///
/// ```
/// use metaselect::classification::{Pipeline, SupportVectorClassifier};
/// use metaselect::preprocessing::StandardScaler;
/// use metaselect::prelude::*;
///
/// let x = Matrix::from_rows(&[
///     vec![0.0, 100.0],
///     vec![0.1, 110.0],
///     vec![5.0, 900.0],
///     vec![5.2, 950.0],
/// ]).expect("4x2 matrix");
/// let y = vec![0, 0, 1, 1];
///
/// let mut svm = Pipeline::new(StandardScaler::new(), SupportVectorClassifier::new());
/// svm.fit(&x, &y, 2).expect("fit should succeed");
/// assert_eq!(svm.predict(&x).expect("fitted"), y);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline<T, C> {
    transformer: T,
    classifier: C,
}

impl<T: Transformer, C: Classifier> Pipeline<T, C> {
    /// Chains `transformer` in front of `classifier`.
    #[must_use]
    pub fn new(transformer: T, classifier: C) -> Self {
        Self {
            transformer,
            classifier,
        }
    }

    /// The fitted (or unfitted) transformer step.
    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// The final classifier step.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<T: Transformer, C: Classifier> Classifier for Pipeline<T, C> {
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let transformed = self.transformer.fit_transform(x)?;
        self.classifier.fit(&transformed, y, n_classes)
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let transformed = self.transformer.transform(x)?;
        self.classifier.predict_proba(&transformed)
    }

    fn n_classes(&self) -> usize {
        self.classifier.n_classes()
    }
}
