//! Metaselect: meta-learning model selection for time series forecasting.
//!
//! Given the features of past time series and the forecasting model that
//! performed best on each, metaselect trains a classifier that recommends a
//! model for a new series.
//!
//! # Quick Start
//!
//! ```
//! use metaselect::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::collections::BTreeMap;
//!
//! // 40 past series: "holt" wins on trending ones, "naive" on flat ones
//! let records: Vec<TrainingRecord> = (0..40)
//!     .map(|i| {
//!         let trending = i % 2 == 0;
//!         let slope = if trending { 1.0 } else { 0.0 } + (i as f64) * 0.001;
//!         let features = BTreeMap::from([("trend_slope".to_string(), slope)]);
//!         let (label, holt, naive) = if trending { ("holt", 0.1, 0.9) } else { ("naive", 0.8, 0.2) };
//!         let errors = BTreeMap::from([
//!             ("holt".to_string(), vec![holt]),
//!             ("naive".to_string(), vec![naive]),
//!         ]);
//!         TrainingRecord::new(features, label, errors)
//!     })
//!     .collect();
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut selector = MetaLearnModelSelect::new(&records).unwrap();
//! let config = TrainConfig::new().with_method(Method::NaiveBayes).with_test_size(0.2);
//! let report = selector.train(&config, &mut rng).unwrap();
//! assert!(report.clf_accuracy > 0.9);
//!
//! let best = selector.predict_by_feature(vec![1.0], 1).unwrap();
//! assert_eq!(best[0], vec!["holt".to_string()]);
//! ```
//!
//! # Modules
//!
//! - [`metalearner`]: the model selector, its metadata and configuration
//! - [`time_series`]: series type and feature extraction
//! - [`classification`]: KNN, Gaussian naive Bayes, SVM and pipelines
//! - [`tree`]: decision trees, random forests and gradient boosting
//! - [`preprocessing`]: standardization
//! - [`model_selection`]: train/test splitting
//! - [`metrics`]: classification accuracy
//! - [`stats`]: descriptive statistics, correlation and the bootstrap test
//! - [`primitives`]: the `Matrix` type

pub mod classification;
pub mod error;
pub mod metalearner;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod stats;
pub mod time_series;
pub mod traits;
pub mod tree;

pub use error::{MetaLearnError, Result};
pub use metalearner::MetaLearnModelSelect;
pub use primitives::Matrix;
pub use traits::{Classifier, Transformer};
