//! Closed set of classifier backends behind the selector.

use super::config::{Method, TrainConfig};
use crate::classification::{GaussianNB, KNearestNeighbors, Pipeline, SupportVectorClassifier};
use crate::error::Result;
use crate::preprocessing::StandardScaler;
use crate::primitives::Matrix;
use crate::traits::Classifier;
use crate::tree::{GradientBoostingClassifier, RandomForestClassifier};
use serde::{Deserialize, Serialize};

/// A classifier chosen by [`Method`], fitted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifierBackend {
    RandomForest(RandomForestClassifier),
    Gbdt(GradientBoostingClassifier),
    Svm(Pipeline<StandardScaler, SupportVectorClassifier>),
    Knn(KNearestNeighbors),
    NaiveBayes(GaussianNB),
}

impl ClassifierBackend {
    /// Unfitted backend for `config.method`; `seed` drives the random forest.
    #[must_use]
    pub fn build(config: &TrainConfig, seed: u64) -> Self {
        let backend = match config.method {
            Method::RandomForest => ClassifierBackend::RandomForest(
                RandomForestClassifier::new(config.n_trees).with_random_state(seed),
            ),
            Method::Gbdt => ClassifierBackend::Gbdt(GradientBoostingClassifier::new()),
            Method::Svm => ClassifierBackend::Svm(Pipeline::new(
                StandardScaler::new(),
                SupportVectorClassifier::new(),
            )),
            Method::Knn => ClassifierBackend::Knn(KNearestNeighbors::new(config.n_neighbors)),
            Method::NaiveBayes => ClassifierBackend::NaiveBayes(GaussianNB::new()),
        };
        tracing::debug!(method = %config.method, "built classifier backend");
        backend
    }

    /// Method this backend realizes.
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            ClassifierBackend::RandomForest(_) => Method::RandomForest,
            ClassifierBackend::Gbdt(_) => Method::Gbdt,
            ClassifierBackend::Svm(_) => Method::Svm,
            ClassifierBackend::Knn(_) => Method::Knn,
            ClassifierBackend::NaiveBayes(_) => Method::NaiveBayes,
        }
    }

    /// The forest, when this is a random forest backend.
    #[must_use]
    pub fn as_random_forest(&self) -> Option<&RandomForestClassifier> {
        match self {
            ClassifierBackend::RandomForest(rf) => Some(rf),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierBackend::RandomForest(c) => c,
            ClassifierBackend::Gbdt(c) => c,
            ClassifierBackend::Svm(c) => c,
            ClassifierBackend::Knn(c) => c,
            ClassifierBackend::NaiveBayes(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            ClassifierBackend::RandomForest(c) => c,
            ClassifierBackend::Gbdt(c) => c,
            ClassifierBackend::Svm(c) => c,
            ClassifierBackend::Knn(c) => c,
            ClassifierBackend::NaiveBayes(c) => c,
        }
    }
}

impl Classifier for ClassifierBackend {
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        self.inner_mut().fit(x, y, n_classes)
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.inner().predict_proba(x)
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }
}
