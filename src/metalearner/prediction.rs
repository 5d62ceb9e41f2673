//! Prediction inputs and result types.

use crate::error::{MetaLearnError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature rows accepted by
/// [`MetaLearnModelSelect::predict_by_feature`](super::MetaLearnModelSelect::predict_by_feature).
///
/// Positional forms must list values in training column order; the named
/// form is aligned to that order by feature name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureInput {
    /// One row
    Vector(Vec<f64>),
    /// Several rows
    Rows(Vec<Vec<f64>>),
    /// Several rows as a table
    Table(Matrix<f64>),
    /// Rows as feature name to value maps
    Named(Vec<BTreeMap<String, f64>>),
}

impl FeatureInput {
    /// Normalizes the input to an `n × feature_names.len()` table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for ragged rows, a column count that
    /// differs from the training data, or names that do not match the
    /// training columns.
    pub fn into_matrix(self, feature_names: &[String]) -> Result<Matrix<f64>> {
        let n_features = feature_names.len();
        let table = match self {
            FeatureInput::Vector(row) => rows_to_matrix(vec![row])?,
            FeatureInput::Rows(rows) => rows_to_matrix(rows)?,
            FeatureInput::Table(table) => table,
            FeatureInput::Named(rows) => {
                let mut data = Vec::with_capacity(rows.len() * n_features);
                for (i, row) in rows.iter().enumerate() {
                    if let Some(unknown) = row.keys().find(|k| !feature_names.contains(k)) {
                        return Err(MetaLearnError::config(format!(
                            "Row {i}: unknown feature '{unknown}'."
                        )));
                    }
                    for name in feature_names {
                        let value = row.get(name).ok_or_else(|| {
                            MetaLearnError::config(format!("Row {i}: missing feature '{name}'."))
                        })?;
                        data.push(*value);
                    }
                }
                Matrix::from_vec(rows.len(), n_features, data)?
            }
        };

        if table.n_cols() != n_features {
            return Err(MetaLearnError::config(format!(
                "Expected {n_features} features per row, got {}.",
                table.n_cols()
            )));
        }
        Ok(table)
    }
}

fn rows_to_matrix(rows: Vec<Vec<f64>>) -> Result<Matrix<f64>> {
    if rows.is_empty() {
        return Ok(Matrix::zeros(0, 0));
    }
    let width = rows[0].len();
    if rows.iter().any(|r| r.len() != width) {
        return Err(MetaLearnError::config(
            "All feature rows must have the same length.",
        ));
    }
    Ok(Matrix::from_vec(rows.len(), width, rows.concat())?)
}

impl From<Vec<f64>> for FeatureInput {
    fn from(row: Vec<f64>) -> Self {
        FeatureInput::Vector(row)
    }
}

impl From<Vec<Vec<f64>>> for FeatureInput {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        FeatureInput::Rows(rows)
    }
}

impl From<Matrix<f64>> for FeatureInput {
    fn from(table: Matrix<f64>) -> Self {
        FeatureInput::Table(table)
    }
}

impl From<Vec<BTreeMap<String, f64>>> for FeatureInput {
    fn from(rows: Vec<BTreeMap<String, f64>>) -> Self {
        FeatureInput::Named(rows)
    }
}

/// Aggregated errors of one training run.
///
/// `fit_error` and `pred_error` hold the `"meta-learn"` entry (error of the
/// model the classifier picked for each row) and one entry per candidate
/// label (error had that candidate always been picked).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Errors on the training split
    pub fit_error: BTreeMap<String, f64>,
    /// Errors on the held-out split
    pub pred_error: BTreeMap<String, f64>,
    /// Classification accuracy on the held-out split
    pub clf_accuracy: f64,
}

/// Key of the learned selector's entry in a [`TrainReport`].
pub const META_LEARN_KEY: &str = "meta-learn";

/// Result of [`MetaLearnModelSelect::predict_fuzzy`](super::MetaLearnModelSelect::predict_fuzzy).
///
/// `label` and `probability` have the same length: 2 when the top two
/// candidates cannot be told apart at the significance level, 1 otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyPrediction {
    /// Recommended labels, best first
    pub label: Vec<String>,
    /// Ensemble probability of each label
    pub probability: Vec<f64>,
    /// Bootstrap p-value of the top-two comparison
    pub pvalue: f64,
}

/// Two feature rows side by side.
///
/// `columns` are named `"<label> model"` after the rows' best-model labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureComparison {
    /// Column headers
    pub columns: [String; 2],
    /// Feature name with the two rows' values
    pub rows: Vec<(String, f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_vector_is_single_row() {
        let m = FeatureInput::from(vec![1.0, 2.0])
            .into_matrix(&names())
            .expect("two features");
        assert_eq!(m.shape(), (1, 2));
    }

    #[test]
    fn test_rows_and_table_agree() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let table = Matrix::from_rows(&rows).expect("2x2");
        let a = FeatureInput::from(rows).into_matrix(&names()).expect("rows");
        let b = FeatureInput::from(table).into_matrix(&names()).expect("table");
        assert_eq!(a, b);
    }

    #[test]
    fn test_ragged_and_wrong_width() {
        let ragged = FeatureInput::from(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(ragged.into_matrix(&names()).expect_err("ragged").is_config());

        let wide = FeatureInput::from(vec![1.0, 2.0, 3.0]);
        assert!(wide.into_matrix(&names()).expect_err("too wide").is_config());
    }

    #[test]
    fn test_named_aligns_columns() {
        let mut row = BTreeMap::new();
        row.insert("b".to_string(), 20.0);
        row.insert("a".to_string(), 10.0);
        let m = FeatureInput::from(vec![row])
            .into_matrix(&names())
            .expect("named");
        assert_eq!(m.row(0), &[10.0, 20.0]);
    }

    #[test]
    fn test_named_rejects_unknown_and_missing() {
        let mut unknown = BTreeMap::new();
        unknown.insert("a".to_string(), 1.0);
        unknown.insert("b".to_string(), 1.0);
        unknown.insert("c".to_string(), 1.0);
        assert!(FeatureInput::from(vec![unknown]).into_matrix(&names()).is_err());

        let mut missing = BTreeMap::new();
        missing.insert("a".to_string(), 1.0);
        assert!(FeatureInput::from(vec![missing]).into_matrix(&names()).is_err());
    }

    #[test]
    fn test_untagged_json_forms() {
        let single: FeatureInput = serde_json::from_str("[0.5, 1.5]").expect("vector");
        assert_eq!(single, FeatureInput::Vector(vec![0.5, 1.5]));

        let rows: FeatureInput = serde_json::from_str("[[0.5, 1.5]]").expect("rows");
        assert_eq!(rows, FeatureInput::Rows(vec![vec![0.5, 1.5]]));

        let named: FeatureInput = serde_json::from_str(r#"[{"a": 1.0, "b": 2.0}]"#).expect("named");
        assert!(matches!(named, FeatureInput::Named(_)));
    }

    #[test]
    fn test_json_table_shape_is_checked() {
        let table: FeatureInput =
            serde_json::from_str(r#"{"data":[1.0,2.0,3.0,4.0],"rows":2,"cols":2}"#).expect("table");
        let m = table.into_matrix(&names()).expect("two features");
        assert_eq!(m.row(1), &[3.0, 4.0]);

        // Too little data for the claimed shape never becomes a table
        let short = serde_json::from_str::<FeatureInput>(r#"{"data":[0.0],"rows":3,"cols":3}"#);
        assert!(short.is_err());
    }
}
