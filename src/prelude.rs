//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use metaselect::prelude::*;
//! ```

pub use crate::classification::{GaussianNB, KNearestNeighbors, SupportVectorClassifier};
pub use crate::metalearner::{
    EvalMethod, FeatureInput, FuzzyPrediction, MetaLearnModelSelect, Method, TrainConfig,
    TrainReport, TrainingRecord,
};
pub use crate::primitives::Matrix;
pub use crate::time_series::{FeatureExtractor, SummaryFeatures, TimeSeriesData};
pub use crate::traits::{Classifier, Transformer};
pub use crate::tree::{GradientBoostingClassifier, RandomForestClassifier};
