//! Random Forest classifier.

use super::{DecisionTreeClassifier, MaxFeatures};
use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random Forest classifier - an ensemble of decision trees.
///
/// Each tree is grown on a bootstrap sample and considers `sqrt(n_features)`
/// candidate features per split. Class probabilities are the mean of the
/// trees' leaf distributions.
///
/// # Example
///
/// ```
/// use metaselect::prelude::*;
/// use metaselect::tree::RandomForestClassifier;
///
/// let x = Matrix::from_rows(&[
///     vec![0.0, 0.1],
///     vec![0.2, 0.0],
///     vec![5.0, 5.2],
///     vec![5.1, 4.9],
/// ]).expect("valid matrix dimensions");
/// let y = vec![0, 0, 1, 1];
///
/// let mut rf = RandomForestClassifier::new(20).with_random_state(42);
/// rf.fit(&x, &y, 2).expect("fit should succeed");
/// assert_eq!(rf.estimators().len(), 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: Option<u64>,
    n_classes: usize,
}

impl RandomForestClassifier {
    /// Creates a new Random Forest classifier.
    ///
    /// # Arguments
    ///
    /// * `n_estimators` - Number of trees in the forest
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: None,
            n_classes: 0,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Fitted trees, in training order.
    #[must_use]
    pub fn estimators(&self) -> &[DecisionTreeClassifier] {
        &self.trees
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MetaLearnError::InvalidHyperparameter {
                param: "n_estimators".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        check_fit_inputs(x, y, n_classes)?;

        let n_samples = x.n_rows();
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            // Bootstrap sample: n draws with replacement
            let bootstrap: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut tree = DecisionTreeClassifier::new()
                .with_max_features(MaxFeatures::Sqrt)
                .with_random_state(rng.gen());
            if let Some(depth) = self.max_depth {
                tree = tree.with_max_depth(depth);
            }
            tree.fit_on_indices(x, y, &bootstrap, n_classes)?;
            trees.push(tree);
        }

        self.trees = trees;
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        if self.trees.is_empty() {
            return Err(MetaLearnError::NotFitted);
        }

        let mut sum = vec![0.0; x.n_rows() * self.n_classes];
        for tree in &self.trees {
            let proba = tree.predict_proba(x)?;
            for (acc, &p) in sum.iter_mut().zip(proba.as_slice()) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        for v in &mut sum {
            *v /= n_trees;
        }
        Ok(Matrix::from_vec(x.n_rows(), self.n_classes, sum)?)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}
