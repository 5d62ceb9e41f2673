//! Decision tree algorithms and ensemble methods.
//!
//! This module implements:
//! - CART classification trees using Gini impurity, with leaves that keep the
//!   full class distribution so every tree can report probabilities
//! - Random Forest ensemble classifier
//! - Gradient Boosting over squared-error regression trees
//!
//! # Example
//!
//! ```
//! use metaselect::prelude::*;
//! use metaselect::tree::DecisionTreeClassifier;
//!
//! let x = Matrix::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ]).expect("Matrix creation should succeed");
//! let y = vec![0, 1, 1, 0];
//!
//! let mut tree = DecisionTreeClassifier::new().with_max_depth(3);
//! tree.fit(&x, &y, 2).expect("fit should succeed");
//! assert_eq!(tree.predict(&x).expect("fitted"), y);
//! ```

mod gradient_boosting;
mod helpers;
mod random_forest;

pub use gradient_boosting::GradientBoostingClassifier;
pub use random_forest::RandomForestClassifier;

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier};
use helpers::{class_counts, find_best_gini_split, find_best_variance_split, partition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Internal node in a decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f64,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<TreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<TreeNode>,
}

/// Leaf node in a classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    /// Fraction of the leaf's training samples in each class
    pub distribution: Vec<f64>,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// A node in a classification tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with class distribution
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    fn leaf_for(&self, sample: &[f64]) -> &Leaf {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf,
                TreeNode::Node(internal) => {
                    node = if sample[internal.feature_idx] <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

/// How many features each split may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Every feature
    All,
    /// `floor(sqrt(n_features))`, at least one
    Sqrt,
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
        }
    }
}

/// Decision tree classifier using the CART algorithm.
///
/// Uses Gini impurity for splitting criterion and builds trees recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: MaxFeatures,
    random_state: Option<u64>,
    n_features: usize,
    n_classes: usize,
}

struct GrowParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
    n_classes: usize,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::All,
            random_state: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the number of features considered at each split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the random state used to order candidate features.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Depth of the fitted tree, if fitted.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(TreeNode::depth)
    }

    /// Fits the tree on the rows of `x` listed in `indices` (repeats allowed).
    pub(crate) fn fit_on_indices(
        &mut self,
        x: &Matrix<f64>,
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
    ) -> Result<()> {
        check_fit_inputs(x, y, n_classes)?;
        if indices.is_empty() {
            return Err("Cannot fit with zero samples".into());
        }

        let seed = self.random_state.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let params = GrowParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: self.max_features.resolve(x.n_cols()),
            n_classes,
        };

        self.n_features = x.n_cols();
        self.n_classes = n_classes;
        self.tree = Some(grow(x, y, indices, 0, &params, &mut rng));
        Ok(())
    }

    /// Class distribution of the leaf reached by each row.
    fn leaf_distributions(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let tree = self.tree.as_ref().ok_or(MetaLearnError::NotFitted)?;
        if x.n_cols() != self.n_features {
            return Err(MetaLearnError::dimension_mismatch(
                "features",
                self.n_features,
                x.n_cols(),
            ));
        }

        let mut data = Vec::with_capacity(x.n_rows() * self.n_classes);
        for row in x.rows() {
            data.extend_from_slice(&tree.leaf_for(row).distribution);
        }
        Ok(Matrix::from_vec(x.n_rows(), self.n_classes, data)?)
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        self.fit_on_indices(x, y, &indices, n_classes)
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.leaf_distributions(x)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn make_leaf(counts: Vec<f64>, n_samples: usize) -> TreeNode {
    let total = n_samples as f64;
    TreeNode::Leaf(Leaf {
        distribution: counts.into_iter().map(|c| c / total).collect(),
        n_samples,
    })
}

fn grow<R: Rng + ?Sized>(
    x: &Matrix<f64>,
    y: &[usize],
    indices: &[usize],
    depth: usize,
    params: &GrowParams,
    rng: &mut R,
) -> TreeNode {
    let n_samples = indices.len();
    let counts = class_counts(y, indices, params.n_classes);

    let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
    let depth_reached = params.max_depth.is_some_and(|max| depth >= max);
    if pure || depth_reached || n_samples < params.min_samples_split {
        return make_leaf(counts, n_samples);
    }

    let Some(split) = find_best_gini_split(x, y, indices, &counts, params.max_features, rng)
    else {
        return make_leaf(counts, n_samples);
    };

    let (left, right) = partition(x, indices, &split);
    TreeNode::Node(Node {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        left: Box::new(grow(x, y, &left, depth + 1, params, rng)),
        right: Box::new(grow(x, y, &right, depth + 1, params, rng)),
    })
}

/// Node of a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node
    Node {
        /// Index of the feature to split on
        feature_idx: usize,
        /// Threshold value for the split
        threshold: f64,
        /// Samples where feature <= threshold
        left: Box<RegressionTreeNode>,
        /// Samples where feature > threshold
        right: Box<RegressionTreeNode>,
    },
    /// Leaf with its output value
    Leaf {
        /// Predicted value
        value: f64,
        /// Number of training samples in this leaf
        n_samples: usize,
    },
}

/// Squared-error regression tree whose leaf values are supplied by the caller.
///
/// Boosting fits the tree structure to gradients but sets each leaf from its
/// own estimator (a Newton step), so the leaf rule is a closure over the
/// leaf's row indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: RegressionTreeNode,
}

impl RegressionTree {
    /// Grows a tree on `targets` up to `max_depth`.
    pub(crate) fn fit(
        x: &Matrix<f64>,
        targets: &[f64],
        max_depth: usize,
        leaf_value: &dyn Fn(&[usize]) -> f64,
    ) -> Self {
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        Self {
            root: grow_regression(x, targets, &indices, 0, max_depth, leaf_value),
        }
    }

    /// Output value for one sample.
    #[must_use]
    pub fn predict_row(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                RegressionTreeNode::Leaf { value, .. } => return *value,
                RegressionTreeNode::Node {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn grow_regression(
    x: &Matrix<f64>,
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    leaf_value: &dyn Fn(&[usize]) -> f64,
) -> RegressionTreeNode {
    let leaf = || RegressionTreeNode::Leaf {
        value: leaf_value(indices),
        n_samples: indices.len(),
    };
    if depth >= max_depth || indices.len() < 2 {
        return leaf();
    }
    let Some(split) = find_best_variance_split(x, targets, indices) else {
        return leaf();
    };

    let (left, right) = partition(x, indices, &split);
    RegressionTreeNode::Node {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        left: Box::new(grow_regression(
            x, targets, &left, depth + 1, max_depth, leaf_value,
        )),
        right: Box::new(grow_regression(
            x, targets, &right, depth + 1, max_depth, leaf_value,
        )),
    }
}
