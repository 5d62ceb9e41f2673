//! Kernel Support Vector Machine.
//!
//! Each class gets a binary soft-margin SVM (class vs. rest) trained with
//! sequential minimal optimization using maximal-violating-pair working set
//! selection. Class probabilities are the softmax of the per-class decision
//! values.

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier};
use serde::{Deserialize, Serialize};

const TAU: f64 = 1e-12;

/// RBF kernel coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gamma {
    /// `1 / n_features`
    Auto,
    /// Fixed value
    Value(f64),
}

impl Gamma {
    fn resolve(self, n_features: usize) -> f64 {
        match self {
            Gamma::Auto => 1.0 / n_features.max(1) as f64,
            Gamma::Value(v) => v,
        }
    }
}

/// One binary sub-problem: decision(x) = Σ coef_i K(x_i, x) - rho.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum BinaryModel {
    /// Class never present in training, or every row belongs to it
    Constant(f64),
    Kernel {
        /// (training row, alpha_i * y_i) for every support vector
        support: Vec<(usize, f64)>,
        rho: f64,
    },
}

/// Support Vector Classifier with an RBF kernel.
///
/// # Example
///
/// ```
/// use metaselect::classification::SupportVectorClassifier;
/// use metaselect::prelude::*;
///
/// let x = Matrix::from_rows(&[
///     vec![0.0, 0.0],
///     vec![0.2, 0.1],
///     vec![2.0, 2.0],
///     vec![2.1, 1.9],
/// ]).expect("4x2 matrix");
/// let y = vec![0, 0, 1, 1];
///
/// let mut svc = SupportVectorClassifier::new().with_c(10.0);
/// svc.fit(&x, &y, 2).expect("fit should succeed");
/// assert_eq!(svc.predict(&x).expect("fitted"), y);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportVectorClassifier {
    /// Regularization parameter (upper bound on each dual coefficient)
    c: f64,
    gamma: Gamma,
    /// Stopping tolerance on the maximal KKT violation
    tol: f64,
    max_iter: usize,
    /// Resolved kernel coefficient
    gamma_value: f64,
    x_train: Option<Matrix<f64>>,
    models: Vec<BinaryModel>,
}

impl SupportVectorClassifier {
    /// Creates a classifier with `C = 1` and `gamma = auto`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            c: 1.0,
            gamma: Gamma::Auto,
            tol: 1e-3,
            max_iter: 100_000,
            gamma_value: 0.0,
            x_train: None,
            models: Vec::new(),
        }
    }

    /// Sets the regularization parameter C.
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Sets the RBF kernel coefficient.
    #[must_use]
    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the stopping tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the iteration cap of each binary solver.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Per-class decision values, one row per sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the feature count differs.
    pub fn decision_function(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let x_train = self.x_train.as_ref().ok_or(MetaLearnError::NotFitted)?;
        if x.n_cols() != x_train.n_cols() {
            return Err(MetaLearnError::dimension_mismatch(
                "features",
                x_train.n_cols(),
                x.n_cols(),
            ));
        }

        let n_classes = self.models.len();
        let mut data = Vec::with_capacity(x.n_rows() * n_classes);
        for sample in x.rows() {
            for model in &self.models {
                data.push(match model {
                    BinaryModel::Constant(v) => *v,
                    BinaryModel::Kernel { support, rho } => {
                        support
                            .iter()
                            .map(|&(i, coef)| coef * rbf(x_train.row(i), sample, self.gamma_value))
                            .sum::<f64>()
                            - rho
                    }
                });
            }
        }
        Ok(Matrix::from_vec(x.n_rows(), n_classes, data)?)
    }
}

impl Default for SupportVectorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    (-gamma * dist).exp()
}

/// Solves the binary dual problem for labels `y` in {+1, -1}.
fn solve_binary(kernel: &[Vec<f64>], y: &[f64], c: f64, tol: f64, max_iter: usize) -> BinaryModel {
    let n = y.len();
    let mut alpha = vec![0.0; n];
    // Gradient of the dual objective: G = Q·alpha - 1
    let mut grad = vec![-1.0; n];
    let q = |i: usize, j: usize| y[i] * y[j] * kernel[i][j];

    let in_up = |a: f64, yi: f64| (yi > 0.0 && a < c) || (yi < 0.0 && a > 0.0);
    let in_low = |a: f64, yi: f64| (yi > 0.0 && a > 0.0) || (yi < 0.0 && a < c);

    for _ in 0..max_iter {
        let mut i_best = None;
        let mut g_max = f64::NEG_INFINITY;
        let mut j_best = None;
        let mut g_min = f64::INFINITY;
        for t in 0..n {
            let v = -y[t] * grad[t];
            if in_up(alpha[t], y[t]) && v > g_max {
                g_max = v;
                i_best = Some(t);
            }
            if in_low(alpha[t], y[t]) && v < g_min {
                g_min = v;
                j_best = Some(t);
            }
        }
        let (Some(i), Some(j)) = (i_best, j_best) else {
            break;
        };
        if g_max - g_min < tol {
            break;
        }

        let (old_i, old_j) = (alpha[i], alpha[j]);
        if y[i] != y[j] {
            let quad = (q(i, i) + q(j, j) + 2.0 * q(i, j)).max(TAU);
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;
            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }
            if diff > 0.0 {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = c + diff;
            }
        } else {
            let quad = (q(i, i) + q(j, j) - 2.0 * q(i, j)).max(TAU);
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;
            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = sum;
                }
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = sum;
                }
            }
        }

        let (d_i, d_j) = (alpha[i] - old_i, alpha[j] - old_j);
        for (k, g) in grad.iter_mut().enumerate() {
            *g += q(i, k) * d_i + q(j, k) * d_j;
        }
    }

    BinaryModel::Kernel {
        support: alpha
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a > 0.0)
            .map(|(i, &a)| (i, a * y[i]))
            .collect(),
        rho: compute_rho(&alpha, &grad, y, c),
    }
}

/// Offset from the KKT conditions: mean over free vectors, else the
/// midpoint of the feasible interval.
fn compute_rho(alpha: &[f64], grad: &[f64], y: &[f64], c: f64) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut n_free = 0usize;

    for ((&a, &g), &yi) in alpha.iter().zip(grad).zip(y) {
        let yg = yi * g;
        if a >= c {
            if yi < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if a <= 0.0 {
            if yi > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            n_free += 1;
            free_sum += yg;
        }
    }

    if n_free > 0 {
        free_sum / n_free as f64
    } else {
        (upper + lower) / 2.0
    }
}

impl Classifier for SupportVectorClassifier {
    fn fit(&mut self, x: &Matrix<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        if self.c <= 0.0 {
            return Err(MetaLearnError::InvalidHyperparameter {
                param: "C".to_string(),
                value: self.c.to_string(),
                constraint: "> 0".to_string(),
            });
        }
        check_fit_inputs(x, y, n_classes)?;

        let gamma = self.gamma.resolve(x.n_cols());
        let kernel: Vec<Vec<f64>> = x
            .rows()
            .map(|a| x.rows().map(|b| rbf(a, b, gamma)).collect())
            .collect();

        let mut models = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            let n_positive = y.iter().filter(|&&label| label == class).count();
            let model = if n_positive == 0 {
                BinaryModel::Constant(f64::NEG_INFINITY)
            } else if n_positive == y.len() {
                BinaryModel::Constant(1.0)
            } else {
                let signs: Vec<f64> = y
                    .iter()
                    .map(|&label| if label == class { 1.0 } else { -1.0 })
                    .collect();
                solve_binary(&kernel, &signs, self.c, self.tol, self.max_iter)
            };
            models.push(model);
        }

        self.gamma_value = gamma;
        self.x_train = Some(x.clone());
        self.models = models;
        Ok(())
    }

    fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let decision = self.decision_function(x)?;
        let n_classes = decision.n_cols();
        let mut data = Vec::with_capacity(decision.as_slice().len());
        for row in decision.rows() {
            let max = row
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = row.iter().map(|&v| (v - max).exp()).collect();
            let total: f64 = exps.iter().sum();
            data.extend(exps.into_iter().map(|e| e / total));
        }
        Ok(Matrix::from_vec(x.n_rows(), n_classes, data)?)
    }

    fn n_classes(&self) -> usize {
        self.models.len()
    }
}
