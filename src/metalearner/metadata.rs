//! Training metadata and its row-aligned table form.

use crate::error::{MetaLearnError, Result};
use crate::preprocessing::FeatureStats;
use crate::primitives::Matrix;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fewest records a selector can be built from is one more than this.
pub const MIN_RECORDS: usize = 30;

/// A field that arrives either as structured data or as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Encoded<T> {
    /// Structured value
    Value(T),
    /// JSON document holding the value
    Text(String),
}

impl<T: DeserializeOwned> Encoded<T> {
    fn decode(self, field: &str, record: usize) -> Result<T> {
        match self {
            Encoded::Value(v) => Ok(v),
            Encoded::Text(text) => serde_json::from_str(&text).map_err(|e| {
                MetaLearnError::config(format!(
                    "Cannot decode {field} of record {record}: {e}"
                ))
            }),
        }
    }
}

/// One historical series: its features, the best candidate model and the
/// hyper-parameter search result of every candidate.
///
/// Each `hpt_res` entry is a sequence whose last element is the candidate's
/// error (for example `[{"p": 1}, 0.31]`).
///
/// # Examples
///
/// ```
/// use metaselect::metalearner::TrainingRecord;
///
/// let record: TrainingRecord = serde_json::from_str(r#"{
///     "features": {"trend": 0.4, "seasonality": null},
///     "best_model": "prophet",
///     "hpt_res": "{\"prophet\": [{\"seasonality_mode\": \"additive\"}, 0.12], \"arima\": [0.3]}"
/// }"#).expect("valid record");
/// assert_eq!(record.best_model.as_deref(), Some("prophet"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Feature name to value; `null` values count as 0
    #[serde(default)]
    pub features: Option<Encoded<BTreeMap<String, Option<f64>>>>,
    /// Label of the best candidate model
    #[serde(default)]
    pub best_model: Option<String>,
    /// Candidate label to its hyper-parameter/error sequence
    #[serde(default)]
    pub hpt_res: Option<Encoded<BTreeMap<String, Vec<serde_json::Value>>>>,
}

impl TrainingRecord {
    /// Builds a complete record from plain values.
    #[must_use]
    pub fn new(
        features: BTreeMap<String, f64>,
        best_model: impl Into<String>,
        errors: BTreeMap<String, Vec<f64>>,
    ) -> Self {
        let features = features.into_iter().map(|(k, v)| (k, Some(v))).collect();
        let hpt_res = errors
            .into_iter()
            .map(|(k, seq)| (k, seq.into_iter().map(serde_json::Value::from).collect()))
            .collect();
        Self {
            features: Some(Encoded::Value(features)),
            best_model: Some(best_model.into()),
            hpt_res: Some(Encoded::Value(hpt_res)),
        }
    }
}

/// Error of every candidate model for one row, taken from the last element
/// of its hyper-parameter sequence.
///
/// Candidates whose sequence is empty or does not end in a number are left
/// out.
pub type CandidateErrors = BTreeMap<String, f64>;

fn missing_field_message(field: &str, record: usize) -> String {
    let base = match field {
        "hpt_res" => "Missing best hyper-params, not able to train a meta learner!",
        "features" => "Missing time series features, not able to train a meta learner!",
        _ => "Missing best models, not able to train a meta learner!",
    };
    if record == 0 {
        base.to_string()
    } else {
        format!("Record {record}: {base}")
    }
}

/// Training data reorganized into row-aligned series.
///
/// `features`, `labels` and `errors` always have one entry per row, in the
/// same order; resampling replaces all three together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDataset {
    feature_names: Vec<String>,
    features: Matrix<f64>,
    labels: Vec<String>,
    errors: Vec<CandidateErrors>,
    stats: FeatureStats,
}

impl MetaDataset {
    /// Validates `records` and reorganizes them into tables.
    ///
    /// Column order is the sorted feature names of the first record. Missing,
    /// `null` and NaN feature values become 0.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there are at most [`MIN_RECORDS`]
    /// records, a record lacks a field, or an encoded field does not decode.
    pub fn from_records(records: &[TrainingRecord]) -> Result<Self> {
        if records.len() <= MIN_RECORDS {
            return Err(MetaLearnError::config(
                "Dataset is too small to train a meta learner!",
            ));
        }

        let mut feature_rows = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());
        let mut errors = Vec::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            let hpt = record
                .hpt_res
                .clone()
                .ok_or_else(|| MetaLearnError::config(missing_field_message("hpt_res", i)))?;
            let features = record
                .features
                .clone()
                .ok_or_else(|| MetaLearnError::config(missing_field_message("features", i)))?;
            let label = record
                .best_model
                .clone()
                .ok_or_else(|| MetaLearnError::config(missing_field_message("best_model", i)))?;

            feature_rows.push(features.decode("features", i)?);
            errors.push(candidate_errors(hpt.decode("hpt_res", i)?));
            labels.push(label);
        }

        let feature_names: Vec<String> = feature_rows
            .first()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();

        let mut data = Vec::with_capacity(records.len() * feature_names.len());
        for row in &feature_rows {
            for name in &feature_names {
                let value = row.get(name).copied().flatten().unwrap_or(0.0);
                data.push(if value.is_nan() { 0.0 } else { value });
            }
        }
        let features = Matrix::from_vec(records.len(), feature_names.len(), data)?;
        let stats = FeatureStats::from_matrix(&features);

        tracing::debug!(
            rows = records.len(),
            features = feature_names.len(),
            "reorganized training metadata"
        );

        Ok(Self {
            feature_names,
            features,
            labels,
            errors,
            stats,
        })
    }

    /// Feature column names, in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature table (one row per record).
    #[must_use]
    pub fn features(&self) -> &Matrix<f64> {
        &self.features
    }

    /// Best-model label of each row.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Candidate errors of each row.
    #[must_use]
    pub fn errors(&self) -> &[CandidateErrors] {
        &self.errors
    }

    /// Column mean and standard deviation of the features.
    #[must_use]
    pub fn stats(&self) -> &FeatureStats {
        &self.stats
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    /// Distinct labels, sorted.
    #[must_use]
    pub fn class_names(&self) -> Vec<String> {
        let mut names = self.labels.clone();
        names.sort();
        names.dedup();
        names
    }

    /// Sorted distinct labels, and each row's index into them.
    #[must_use]
    pub fn encode_labels(&self) -> (Vec<String>, Vec<usize>) {
        let mut index: BTreeMap<&str, usize> =
            self.labels.iter().map(|l| (l.as_str(), 0)).collect();
        for (i, code) in index.values_mut().enumerate() {
            *code = i;
        }
        let codes = self.labels.iter().map(|l| index[l.as_str()]).collect();
        let names = index.into_keys().map(str::to_string).collect();
        (names, codes)
    }

    /// Number of rows per label.
    #[must_use]
    pub fn count_category(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// New dataset holding the given rows, in order, of all three series.
    ///
    /// The statistics are carried over unchanged.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: self.features.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
            errors: indices.iter().map(|&i| self.errors[i].clone()).collect(),
            stats: self.stats.clone(),
        }
    }

    /// Recomputes the column statistics from the current features.
    pub(crate) fn refresh_stats(&mut self) {
        self.stats = FeatureStats::from_matrix(&self.features);
    }

    pub(crate) fn set_features(&mut self, features: Matrix<f64>) {
        self.features = features;
    }
}

fn candidate_errors(hpt: BTreeMap<String, Vec<serde_json::Value>>) -> CandidateErrors {
    hpt.into_iter()
        .filter_map(|(label, seq)| {
            let error = seq.last().and_then(serde_json::Value::as_f64);
            if error.is_none() {
                tracing::debug!(candidate = %label, "hyper-parameter result has no numeric error");
            }
            error.map(|e| (label, e))
        })
        .collect()
}
