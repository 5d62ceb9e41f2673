//! The meta-learning model selector.

use super::backend::ClassifierBackend;
use super::config::{Method, TrainConfig};
use super::metadata::{MetaDataset, TrainingRecord};
use super::prediction::{FeatureComparison, FeatureInput, FuzzyPrediction, TrainReport, META_LEARN_KEY};
use super::sampler::RandomDownSampler;
use crate::error::{MetaLearnError, Result};
use crate::metrics::accuracy_score;
use crate::model_selection::train_test_split;
use crate::preprocessing::FeatureStats;
use crate::primitives::Matrix;
use crate::stats::{bootstrap_pvalue, corr_matrix, DEFAULT_BOOTSTRAP_REPS};
use crate::time_series::{FeatureExtractor, TimeSeriesData};
use crate::traits::Classifier;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const NOT_TRAINED: &str = "Haven't trained a model.";
const NOT_TRAINED_PREDICT: &str =
    "Haven't trained a model. Please train a model or load a model before predicting.";
const NO_SNAPSHOT: &str =
    "No existing pre-trained model. Please change file path or train a model first!";

/// Fewest rows per class times classes below which down-sampling is advised against.
const MIN_BALANCED_ROWS: usize = 30;
/// Majority to minority ratio above which down-sampling is advised.
const IMBALANCE_RATIO: usize = 5;

/// Classifier fitted by [`MetaLearnModelSelect::train`], with everything
/// needed to prepare prediction inputs the way its training rows were.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrainedModel {
    classifier: ClassifierBackend,
    class_names: Vec<String>,
    feature_names: Vec<String>,
    scaled: bool,
    stats: FeatureStats,
}

impl TrainedModel {
    fn prepare(&self, mut x: Matrix<f64>) -> Result<Matrix<f64>> {
        if self.scaled {
            x = self.stats.standardize(&x)?;
        }
        x.fill_nan(0.0);
        Ok(x)
    }

    /// Class indices of each row, most probable first.
    fn ranked(&self, x: &Matrix<f64>) -> Result<Vec<Vec<usize>>> {
        let proba = self.classifier.predict_proba(x)?;
        Ok(proba.rows().map(rank_descending).collect())
    }
}

/// Indices ordered by descending value; equal values keep index order.
fn rank_descending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SelectorState {
    dataset: MetaDataset,
    scaled: bool,
    model: Option<TrainedModel>,
}

/// Recommends a forecasting model for a time series from its features.
///
/// Built from historical [`TrainingRecord`]s, the selector learns which
/// candidate model wins for which features. It starts untrained; a
/// successful [`train`](Self::train) or [`load`](Self::load) makes it
/// ready to predict.
///
/// # Examples
///
/// ```
/// use metaselect::metalearner::{MetaLearnModelSelect, Method, TrainConfig, TrainingRecord};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use std::collections::BTreeMap;
///
/// let records: Vec<TrainingRecord> = (0..40)
///     .map(|i| {
///         let (label, x) = if i % 2 == 0 { ("arima", 0.0) } else { ("prophet", 10.0) };
///         let features = BTreeMap::from([
///             ("trend".to_string(), x + (i as f64) * 0.01),
///             ("seasonality".to_string(), -x),
///         ]);
///         let errors = BTreeMap::from([
///             ("arima".to_string(), vec![if label == "arima" { 0.1 } else { 0.5 }]),
///             ("prophet".to_string(), vec![if label == "prophet" { 0.1 } else { 0.5 }]),
///         ]);
///         TrainingRecord::new(features, label, errors)
///     })
///     .collect();
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let mut selector = MetaLearnModelSelect::new(&records).expect("valid metadata");
/// selector.preprocess(false, true, &mut rng).expect("stats match columns");
///
/// let config = TrainConfig::new().with_method(Method::Knn).with_test_size(0.2);
/// let report = selector.train(&config, &mut rng).expect("training succeeds");
/// assert!(report.pred_error.contains_key("meta-learn"));
///
/// // Columns are in name order: seasonality, trend
/// let best = selector
///     .predict_by_feature(vec![-10.0, 10.0], 1)
///     .expect("trained");
/// assert_eq!(best, vec![vec!["prophet".to_string()]]);
/// ```
#[derive(Debug, Clone)]
pub struct MetaLearnModelSelect {
    state: SelectorState,
}

impl MetaLearnModelSelect {
    /// Validates and reorganizes `records` into an untrained selector.
    ///
    /// Logs an advisory about class imbalance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there are 30 records or fewer, a
    /// record lacks `features`, `best_model` or `hpt_res`, or every record
    /// has the same best model.
    pub fn new(records: &[TrainingRecord]) -> Result<Self> {
        let dataset = MetaDataset::from_records(records)?;
        let counts = dataset.count_category();
        if counts.len() < 2 {
            return Err(MetaLearnError::config(
                "Only one class in the label column (best_model), not able to train a classifier!",
            ));
        }

        let min = counts.values().copied().min().unwrap_or(0);
        let max = counts.values().copied().max().unwrap_or(0);
        if min * counts.len() < MIN_BALANCED_ROWS {
            tracing::warn!(
                "Not recommend to do downsampling! Dataset will be too small after downsampling!"
            );
        } else if max > min * IMBALANCE_RATIO {
            tracing::warn!(
                "Number of obs in majority class is much greater than in minority class. Downsampling is recommended!"
            );
        } else {
            tracing::info!("No significant data imbalance problem, no need to do downsampling.");
        }

        Ok(Self {
            state: SelectorState {
                dataset,
                scaled: false,
                model: None,
            },
        })
    }

    /// Restores a trained selector saved by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns a state error if the file cannot be read or decoded, or holds
    /// no trained model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let state = read_snapshot(path.as_ref())?;
        tracing::info!("Successfully loaded a pre-trained model!");
        Ok(Self { state })
    }

    /// Replaces this selector's whole state with the one saved at `path`.
    ///
    /// The current state is kept if loading fails.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.state = read_snapshot(path.as_ref())?;
        tracing::info!("Successfully loaded a pre-trained model!");
        Ok(())
    }

    /// Writes the whole selector state to `path`.
    ///
    /// # Errors
    ///
    /// Returns a state error if no model has been trained, or an I/O or
    /// serialization error if writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.state.model.is_none() {
            return Err(MetaLearnError::state(NOT_TRAINED));
        }
        let bytes = bincode::serialize(&self.state).map_err(|e| {
            MetaLearnError::Serialization(format!("Failed to serialize selector: {e}"))
        })?;
        std::fs::write(path, bytes)?;
        tracing::info!("Successfully saved the trained model!");
        Ok(())
    }

    /// Number of rows per best-model label.
    #[must_use]
    pub fn count_category(&self) -> BTreeMap<String, usize> {
        self.state.dataset.count_category()
    }

    /// Optionally balances the classes, then optionally standardizes the
    /// features.
    ///
    /// Down-sampling recomputes the feature statistics unless the features
    /// are already standardized. Standardizing twice is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the feature statistics do not match the feature
    /// columns.
    pub fn preprocess<R: Rng + ?Sized>(
        &mut self,
        downsample: bool,
        scale: bool,
        rng: &mut R,
    ) -> Result<()> {
        let state = &mut self.state;
        if downsample {
            let mut resampled = RandomDownSampler::new(&state.dataset).fit_resample(rng);
            if !state.scaled {
                resampled.refresh_stats();
            }
            state.dataset = resampled;
            tracing::info!("Successfully applied random downsampling!");
        }

        if scale {
            if state.scaled {
                tracing::warn!("Features are already scaled, skipping.");
                return Ok(());
            }
            let dataset = &mut state.dataset;
            let scaled = dataset.stats().standardize(dataset.features())?;
            dataset.set_features(scaled);
            state.scaled = true;
            tracing::info!(
                "Successfully scaled data by centering to the mean and component-wise scaling to unit variance!"
            );
        }
        Ok(())
    }

    /// Pearson correlation between every pair of feature columns.
    ///
    /// A column without variance correlates as NaN.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset has no rows or columns.
    pub fn correlation_matrix(&self) -> Result<Matrix<f64>> {
        corr_matrix(self.state.dataset.features())
    }

    /// Feature rows `i` and `j` side by side, labelled by their best models.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either index is out of range.
    pub fn feature_comparison(&self, i: usize, j: usize) -> Result<FeatureComparison> {
        let dataset = &self.state.dataset;
        let n = dataset.n_rows();
        if i >= n || j >= n {
            return Err(MetaLearnError::config(format!(
                "Row index out of range: dataset has {n} rows."
            )));
        }
        let features = dataset.features();
        let labels = dataset.labels();
        Ok(FeatureComparison {
            columns: [format!("{} model", labels[i]), format!("{} model", labels[j])],
            rows: dataset
                .feature_names()
                .iter()
                .enumerate()
                .map(|(c, name)| (name.clone(), features.get(i, c), features.get(j, c)))
                .collect(),
        })
    }

    /// Fits a classifier on a random split and reports how well its picks
    /// perform against always picking one candidate.
    ///
    /// On success the fitted classifier becomes the selector's model.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid `config` or a split
    /// that leaves either side empty, [`MetaLearnError::MissingCandidate`] if
    /// a row has no recorded error for a label it is evaluated on, or the
    /// backend's error if fitting fails.
    pub fn train<R: Rng + ?Sized>(&mut self, config: &TrainConfig, rng: &mut R) -> Result<TrainReport> {
        config.validate()?;
        let dataset = &self.state.dataset;
        let (train_idx, test_idx) = train_test_split(dataset.n_rows(), config.test_size, rng)?;
        if config.method == Method::Knn && config.n_neighbors > train_idx.len() {
            return Err(MetaLearnError::config(format!(
                "Number of neighbors ({}) exceeds the {} training rows.",
                config.n_neighbors,
                train_idx.len()
            )));
        }
        tracing::debug!(train = train_idx.len(), test = test_idx.len(), "split metadata");

        let (class_names, codes) = dataset.encode_labels();
        let train = dataset.select_rows(&train_idx);
        let test = dataset.select_rows(&test_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| codes[i]).collect();
        let y_test: Vec<usize> = test_idx.iter().map(|&i| codes[i]).collect();

        let mut classifier = ClassifierBackend::build(config, rng.gen());
        classifier.fit(train.features(), &y_train, class_names.len())?;
        let y_fit = classifier.predict(train.features())?;
        let y_pred = classifier.predict(test.features())?;

        let mut fit_error = BTreeMap::new();
        let mut pred_error = BTreeMap::new();
        let eval = config.eval_method;

        let picked = |split: &MetaDataset, picks: &[usize]| -> Result<f64> {
            let labels: Vec<&String> = picks.iter().map(|&c| &class_names[c]).collect();
            Ok(eval.aggregate(&candidate_errors(split, &labels)?))
        };
        fit_error.insert(META_LEARN_KEY.to_string(), picked(&train, &y_fit)?);
        pred_error.insert(META_LEARN_KEY.to_string(), picked(&test, &y_pred)?);

        for label in &class_names {
            let always = |split: &MetaDataset| -> Result<f64> {
                let labels = vec![label; split.n_rows()];
                Ok(eval.aggregate(&candidate_errors(split, &labels)?))
            };
            fit_error.insert(label.clone(), always(&train)?);
            pred_error.insert(label.clone(), always(&test)?);
        }

        let clf_accuracy = accuracy_score(&y_pred, &y_test);
        tracing::info!(
            method = %config.method,
            accuracy = clf_accuracy,
            "trained meta-learner"
        );

        self.state.model = Some(TrainedModel {
            classifier,
            class_names,
            feature_names: dataset.feature_names().to_vec(),
            scaled: self.state.scaled,
            stats: dataset.stats().clone(),
        });

        Ok(TrainReport {
            fit_error,
            pred_error,
            clf_accuracy,
        })
    }

    /// Recommends the `n_top` best models for `series`.
    ///
    /// With `rescale`, the series is divided by its maximum before feature
    /// extraction. NaN features are logged and treated as 0.
    ///
    /// # Errors
    ///
    /// Returns a state error if no model is trained, or a configuration
    /// error if the extractor omits a training feature or `n_top` is 0.
    pub fn predict<E>(
        &self,
        series: &TimeSeriesData,
        extractor: &E,
        rescale: bool,
        n_top: usize,
    ) -> Result<Vec<String>>
    where
        E: FeatureExtractor + ?Sized,
    {
        let model = self.model()?;
        let row = self.feature_row(model, series, extractor, rescale, true)?;
        let mut ranked = self.predict_by_feature(FeatureInput::Vector(row), n_top)?;
        Ok(ranked.pop().unwrap_or_default())
    }

    /// Recommends the `n_top` best models for each feature row.
    ///
    /// Rows are standardized with the training statistics when the model was
    /// trained on scaled features; NaN entries then become 0. Each result
    /// lists labels by descending predicted probability, and holds at most
    /// as many labels as there are classes.
    ///
    /// # Errors
    ///
    /// Returns a state error if no model is trained, or a configuration
    /// error if `n_top` is 0 or the rows do not match the training features.
    pub fn predict_by_feature(
        &self,
        input: impl Into<FeatureInput>,
        n_top: usize,
    ) -> Result<Vec<Vec<String>>> {
        let model = self.model()?;
        if n_top == 0 {
            return Err(MetaLearnError::config("n_top must be at least 1."));
        }
        let x = model.prepare(input.into().into_matrix(&model.feature_names)?)?;
        let ranked = model.ranked(&x)?;
        Ok(ranked
            .into_iter()
            .map(|order| {
                order
                    .into_iter()
                    .take(n_top)
                    .map(|c| model.class_names[c].clone())
                    .collect()
            })
            .collect())
    }

    /// Class probabilities of each feature row, one column per entry of
    /// [`class_names`](Self::class_names).
    ///
    /// Rows are prepared exactly as in
    /// [`predict_by_feature`](Self::predict_by_feature).
    ///
    /// # Errors
    ///
    /// Returns a state error if no model is trained, or a configuration
    /// error if the rows do not match the training features.
    pub fn predict_proba_by_feature(&self, input: impl Into<FeatureInput>) -> Result<Matrix<f64>> {
        let model = self.model()?;
        let x = model.prepare(input.into().into_matrix(&model.feature_names)?)?;
        model.classifier.predict_proba(&x)
    }

    /// Recommends the best model for `series`, adding the runner-up when the
    /// forest's trees cannot tell the two apart.
    ///
    /// The per-tree probabilities of the two most probable classes are
    /// compared with a bootstrap test; if its p-value is at least
    /// `sig_level` both labels are returned.
    ///
    /// # Errors
    ///
    /// Returns a state error if no model is trained, or a configuration
    /// error if the model is not a random forest or the extractor omits a
    /// training feature.
    pub fn predict_fuzzy<E, R>(
        &self,
        series: &TimeSeriesData,
        extractor: &E,
        rescale: bool,
        sig_level: f64,
        rng: &mut R,
    ) -> Result<FuzzyPrediction>
    where
        E: FeatureExtractor + ?Sized,
        R: Rng + ?Sized,
    {
        let model = self.model()?;
        let forest = model.classifier.as_random_forest().ok_or_else(|| {
            MetaLearnError::config("Fuzzy prediction is only available for the RandomForest method.")
        })?;

        let mut row = self.feature_row(model, series, extractor, rescale, false)?;
        for v in &mut row {
            if v.is_nan() {
                *v = 0.0;
            }
        }
        let x = model.prepare(Matrix::from_vec(1, row.len(), row)?)?;

        let proba = forest.predict_proba(&x)?;
        let proba = proba.row(0);
        let top: Vec<usize> = rank_descending(proba).into_iter().take(2).collect();
        if top.len() < 2 {
            return Err(MetaLearnError::config(
                "Fuzzy prediction needs at least two classes.",
            ));
        }

        let mut per_tree = Vec::with_capacity(forest.estimators().len() * 2);
        for tree in forest.estimators() {
            let p = tree.predict_proba(&x)?;
            per_tree.push(p.get(0, top[0]));
            per_tree.push(p.get(0, top[1]));
        }
        let pairs = Matrix::from_vec(forest.estimators().len(), 2, per_tree)?;
        let pvalue = bootstrap_pvalue(&pairs, DEFAULT_BOOTSTRAP_REPS, rng)?;

        let keep = if pvalue >= sig_level { 2 } else { 1 };
        tracing::debug!(pvalue, kept = keep, "fuzzy prediction");
        Ok(FuzzyPrediction {
            label: top[..keep].iter().map(|&c| model.class_names[c].clone()).collect(),
            probability: top[..keep].iter().map(|&c| proba[c]).collect(),
            pvalue,
        })
    }

    /// Feature column names, in training order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        self.state.dataset.feature_names()
    }

    /// Candidate labels the trained model chooses from, sorted.
    #[must_use]
    pub fn class_names(&self) -> Option<&[String]> {
        self.state.model.as_ref().map(|m| m.class_names.as_slice())
    }

    /// True once a model has been trained or loaded.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.state.model.is_some()
    }

    /// True once the features have been standardized.
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        self.state.scaled
    }

    /// Current training data.
    #[must_use]
    pub fn dataset(&self) -> &MetaDataset {
        &self.state.dataset
    }

    fn model(&self) -> Result<&TrainedModel> {
        self.state
            .model
            .as_ref()
            .ok_or_else(|| MetaLearnError::state(NOT_TRAINED_PREDICT))
    }

    /// Extracts the features of `series` in training column order.
    fn feature_row<E>(
        &self,
        model: &TrainedModel,
        series: &TimeSeriesData,
        extractor: &E,
        rescale: bool,
        warn_nan: bool,
    ) -> Result<Vec<f64>>
    where
        E: FeatureExtractor + ?Sized,
    {
        let rescaled;
        let series = if rescale {
            match series.rescaled_by_max() {
                Some(s) => {
                    tracing::info!(
                        "Successful scaled! Each value of TS has been divided by the max value of TS."
                    );
                    rescaled = s;
                    &rescaled
                }
                None => {
                    tracing::warn!("Series maximum is zero or not finite, skipping rescale.");
                    series
                }
            }
        } else {
            series
        };

        let features = extractor.extract(series);
        let row = model
            .feature_names
            .iter()
            .map(|name| {
                features.get(name).copied().ok_or_else(|| {
                    MetaLearnError::config(format!(
                        "Feature extractor did not produce '{name}'."
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if warn_nan && row.iter().any(|v| v.is_nan()) {
            tracing::warn!(
                "Features of the test time series contains NaN value, consider processing it. Features are: {features:?}. Fill in NaNs with 0."
            );
        }
        Ok(row)
    }
}

/// Error of `labels[i]` in row `i` of `split`.
fn candidate_errors(split: &MetaDataset, labels: &[&String]) -> Result<Vec<f64>> {
    split
        .errors()
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(row, (errors, &label))| {
            errors
                .get(label)
                .copied()
                .ok_or_else(|| MetaLearnError::MissingCandidate {
                    label: label.clone(),
                    row,
                })
        })
        .collect()
}

fn read_snapshot(path: &Path) -> Result<SelectorState> {
    let bytes =
        std::fs::read(path).map_err(|e| MetaLearnError::state_with_source(NO_SNAPSHOT, e))?;
    let state: SelectorState = bincode::deserialize(&bytes)
        .map_err(|e| MetaLearnError::state_with_source(NO_SNAPSHOT, e))?;
    if state.model.is_none() {
        return Err(MetaLearnError::state(NO_SNAPSHOT));
    }
    Ok(state)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
