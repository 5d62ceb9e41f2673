//! Meta-learning model selection.
//!
//! A classifier learns, from the features of past time series and the
//! forecasting model that did best on each, which model to recommend for a
//! new series.
//!
//! - [`TrainingRecord`] / [`MetaDataset`]: raw and reorganized metadata
//! - [`RandomDownSampler`]: class balancing by down-sampling
//! - [`TrainConfig`], [`Method`], [`EvalMethod`]: training settings
//! - [`MetaLearnModelSelect`]: training, persistence and prediction
//!
//! # Workflow
//!
//! 1. [`MetaLearnModelSelect::new`] validates the records.
//! 2. [`MetaLearnModelSelect::preprocess`] optionally balances and
//!    standardizes them.
//! 3. [`MetaLearnModelSelect::train`] fits the chosen backend and returns a
//!    [`TrainReport`].
//! 4. [`MetaLearnModelSelect::predict`], [`predict_by_feature`] and
//!    [`predict_fuzzy`] recommend models.
//!
//! [`predict_by_feature`]: MetaLearnModelSelect::predict_by_feature
//! [`predict_fuzzy`]: MetaLearnModelSelect::predict_fuzzy

mod backend;
mod config;
mod metadata;
mod prediction;
mod sampler;
mod selector;

pub use backend::ClassifierBackend;
pub use config::{EvalMethod, Method, TrainConfig};
pub use metadata::{CandidateErrors, Encoded, MetaDataset, TrainingRecord, MIN_RECORDS};
pub use prediction::{FeatureComparison, FeatureInput, FuzzyPrediction, TrainReport, META_LEARN_KEY};
pub use sampler::RandomDownSampler;
pub use selector::MetaLearnModelSelect;
