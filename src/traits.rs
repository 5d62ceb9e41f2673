//! Core traits for classifier backends and transformers.
//!
//! These traits define the contracts the meta-learner relies on: every
//! backend learns from class indices and reports a probability per class.

use crate::error::Result;
use crate::primitives::Matrix;

/// Supervised multi-class classifier over dense feature tables.
///
/// Labels are class indices in `0..n_classes`. A class with no training
/// rows is legal and always receives probability 0.
///
/// # Examples
///
/// ```
/// use metaselect::prelude::*;
///
/// let x = Matrix::from_rows(&[
///     vec![0.0, 0.0],
///     vec![0.2, 0.1],
///     vec![5.0, 5.0],
///     vec![5.1, 4.9],
/// ]).unwrap();
/// let y = vec![0, 0, 1, 1];
///
/// let mut model = GaussianNB::new();
/// model.fit(&x, &y, 2).unwrap();
/// assert_eq!(model.predict(&x).unwrap(), y);
/// ```
pub trait Classifier {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty, the shapes disagree, a label is
    /// out of range or a hyperparameter is invalid for this data.
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()>;

    /// Returns class probabilities, one row per sample and one column per class.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the feature count differs
    /// from the training data.
    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>>;

    /// Number of classes the model was fitted with.
    fn n_classes(&self) -> usize;

    /// Predicts the most probable class for each sample.
    ///
    /// Ties resolve to the lowest class index.
    ///
    /// # Errors
    ///
    /// Same as [`Classifier::predict_proba`].
    fn predict(&self, x: &Matrix<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().map(argmax).collect())
    }
}

/// Trait for data transformers (scalers, encoders, etc.).
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted.
    fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Validates the common `fit` preconditions shared by every backend.
pub(crate) fn check_fit_inputs(x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
    if x.n_rows() == 0 {
        return Err("Cannot fit with zero samples".into());
    }
    if x.n_rows() != y.len() {
        return Err(crate::MetaLearnError::dimension_mismatch(
            "samples",
            x.n_rows(),
            y.len(),
        ));
    }
    if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
        return Err(format!("Label {bad} out of range for {n_classes} classes").into());
    }
    Ok(())
}
