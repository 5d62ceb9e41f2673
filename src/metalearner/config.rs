//! Training configuration.

use crate::error::{MetaLearnError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classifier backend used as the meta-learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// Random forest of `n_trees` trees
    #[default]
    RandomForest,
    /// Gradient-boosted trees
    Gbdt,
    /// RBF support vector machine on standardized inputs
    Svm,
    /// k-nearest neighbors
    Knn,
    /// Gaussian naive Bayes
    NaiveBayes,
}

impl Method {
    /// Every supported method.
    pub const ALL: [Method; 5] = [
        Method::RandomForest,
        Method::Gbdt,
        Method::Svm,
        Method::Knn,
        Method::NaiveBayes,
    ];

    /// Name as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::RandomForest => "RandomForest",
            Method::Gbdt => "GBDT",
            Method::Svm => "SVM",
            Method::Knn => "KNN",
            Method::NaiveBayes => "NaiveBayes",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = MetaLearnError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                MetaLearnError::config("Only support RandomForest, GBDT, SVM, KNN, and NaiveBayes method.")
            })
    }
}

impl TryFrom<String> for Method {
    type Error = MetaLearnError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Method> for String {
    fn from(m: Method) -> Self {
        m.as_str().to_string()
    }
}

/// How per-row errors are aggregated in a [`TrainReport`](super::TrainReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EvalMethod {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Median
    Median,
}

impl EvalMethod {
    /// Name as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EvalMethod::Mean => "mean",
            EvalMethod::Median => "median",
        }
    }

    /// Aggregates `values` (NaN when empty).
    #[must_use]
    pub fn aggregate(self, values: &[f64]) -> f64 {
        match self {
            EvalMethod::Mean => crate::stats::mean(values),
            EvalMethod::Median => crate::stats::median(values),
        }
    }
}

impl fmt::Display for EvalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvalMethod {
    type Err = MetaLearnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(EvalMethod::Mean),
            "median" => Ok(EvalMethod::Median),
            _ => Err(MetaLearnError::config(
                "Only support mean and median as evaluation method.",
            )),
        }
    }
}

impl TryFrom<String> for EvalMethod {
    type Error = MetaLearnError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<EvalMethod> for String {
    fn from(m: EvalMethod) -> Self {
        m.as_str().to_string()
    }
}

/// Parameters of [`MetaLearnModelSelect::train`](super::MetaLearnModelSelect::train).
///
/// # Examples
///
/// ```
/// use metaselect::metalearner::{EvalMethod, Method, TrainConfig};
///
/// let config = TrainConfig::new()
///     .with_method(Method::Knn)
///     .with_n_neighbors(3)
///     .with_test_size(0.25);
/// assert_eq!(config.eval_method, EvalMethod::Mean);
/// assert!(config.validate().is_ok());
///
/// let parsed: TrainConfig = serde_json::from_str(r#"{"method": "GBDT", "eval_method": "median"}"#)
///     .expect("valid config");
/// assert_eq!(parsed.method, Method::Gbdt);
/// assert_eq!(parsed.n_trees, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Classifier backend
    pub method: Method,
    /// Error aggregation
    pub eval_method: EvalMethod,
    /// Fraction of rows held out, in `(0, 1)`
    pub test_size: f64,
    /// Trees in a random forest
    pub n_trees: usize,
    /// Neighbors for KNN
    pub n_neighbors: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            method: Method::RandomForest,
            eval_method: EvalMethod::Mean,
            test_size: 0.1,
            n_trees: 500,
            n_neighbors: 5,
        }
    }
}

impl TrainConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_eval_method(mut self, eval_method: EvalMethod) -> Self {
        self.eval_method = eval_method;
        self
    }

    #[must_use]
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    #[must_use]
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    /// Checks the settings that do not depend on the data.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `test_size` is outside `(0, 1)`,
    /// `n_trees` is 0 for a random forest, or `n_neighbors` is 0 for KNN.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(MetaLearnError::config("Illegal test set."));
        }
        if self.method == Method::RandomForest && self.n_trees == 0 {
            return Err(MetaLearnError::config(
                "Number of trees must be at least 1.",
            ));
        }
        if self.method == Method::Knn && self.n_neighbors == 0 {
            return Err(MetaLearnError::config(
                "Number of neighbors must be at least 1.",
            ));
        }
        Ok(())
    }
}
