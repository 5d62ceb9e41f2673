//! Integration tests for the metaselect model selector.
//!
//! These tests verify end-to-end workflows combining metadata validation,
//! preprocessing, training, persistence and prediction.

use metaselect::metalearner::{FeatureInput, META_LEARN_KEY};
use metaselect::prelude::*;
use metaselect::MetaLearnError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// 40 records, classes "A" and "B" balanced, three features.
fn scenario_records() -> Vec<TrainingRecord> {
    (0..40)
        .map(|i| {
            let is_a = i % 2 == 0;
            let base = if is_a { -1.0 } else { 1.0 };
            let wiggle = (i as f64 * 0.37).sin() * 0.3;
            let features = BTreeMap::from([
                ("x1".to_string(), base + wiggle),
                ("x2".to_string(), base - wiggle),
                ("x3".to_string(), base * 2.0 + wiggle),
            ]);
            let errors = BTreeMap::from([
                ("A".to_string(), vec![if is_a { 0.2 } else { 0.7 }]),
                ("B".to_string(), vec![if is_a { 0.6 } else { 0.3 }]),
            ]);
            TrainingRecord::new(features, if is_a { "A" } else { "B" }, errors)
        })
        .collect()
}

#[test]
fn test_naive_bayes_end_to_end() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut selector = MetaLearnModelSelect::new(&scenario_records()).expect("valid metadata");

    let config = TrainConfig::new()
        .with_method(Method::NaiveBayes)
        .with_test_size(0.2);
    let report = selector.train(&config, &mut rng).expect("training succeeds");

    for key in [META_LEARN_KEY, "A", "B"] {
        assert!(report.fit_error.contains_key(key), "fit_error lacks {key}");
        assert!(report.pred_error.contains_key(key), "pred_error lacks {key}");
    }
    assert!((0.0..=1.0).contains(&report.clf_accuracy));

    let best = selector
        .predict_by_feature(vec![vec![0.0, 0.0, 0.0]], 1)
        .expect("trained");
    assert_eq!(best.len(), 1);
    assert!(best[0][0] == "A" || best[0][0] == "B");
}

#[test]
fn test_downsample_scale_train_predict() {
    let mut records = scenario_records();
    // Skew the classes: 10 extra "A" rows
    records.extend(scenario_records().into_iter().step_by(2).take(10));

    let mut rng = StdRng::seed_from_u64(7);
    let mut selector = MetaLearnModelSelect::new(&records).expect("valid metadata");
    assert_eq!(selector.count_category()["A"], 30);

    selector.preprocess(true, true, &mut rng).expect("preprocess");
    let counts = selector.count_category();
    assert_eq!(counts["A"], 20);
    assert_eq!(counts["B"], 20);
    assert!(selector.is_scaled());

    let config = TrainConfig::new()
        .with_method(Method::RandomForest)
        .with_n_trees(25);
    selector.train(&config, &mut rng).expect("training succeeds");

    let best = selector
        .predict_by_feature(vec![vec![1.0, 1.0, 2.0], vec![-1.0, -1.0, -2.0]], 1)
        .expect("trained");
    assert_eq!(best, vec![vec!["B".to_string()], vec!["A".to_string()]]);
}

#[test]
fn test_save_then_load_reproduces_predictions() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut selector = MetaLearnModelSelect::new(&scenario_records()).expect("valid metadata");
    selector.preprocess(false, true, &mut rng).expect("preprocess");
    selector
        .train(&TrainConfig::new().with_method(Method::Svm), &mut rng)
        .expect("training succeeds");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("selector.bin");
    selector.save(&path).expect("save");

    let restored = MetaLearnModelSelect::load(&path).expect("load");
    assert!(restored.is_trained());
    assert!(restored.is_scaled());

    let input = FeatureInput::Rows(vec![vec![0.5, 0.4, 1.1], vec![-0.2, -0.9, -1.5]]);
    assert_eq!(
        restored.predict_by_feature(input.clone(), 2).expect("trained"),
        selector.predict_by_feature(input, 2).expect("trained")
    );
}

#[test]
fn test_load_from_replaces_state() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut trained = MetaLearnModelSelect::new(&scenario_records()).expect("valid metadata");
    trained
        .train(&TrainConfig::new().with_method(Method::Knn), &mut rng)
        .expect("training succeeds");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("knn.bin");
    trained.save(&path).expect("save");

    let mut fresh = MetaLearnModelSelect::new(&scenario_records()).expect("valid metadata");
    assert!(!fresh.is_trained());
    fresh.load_from(&path).expect("load");
    assert!(fresh.is_trained());
}

#[test]
fn test_state_errors_before_training() {
    let selector = MetaLearnModelSelect::new(&scenario_records()).expect("valid metadata");
    let series = TimeSeriesData::from_values((1..=30).map(f64::from).collect());
    let mut rng = StdRng::seed_from_u64(0);

    let errors = [
        selector.predict(&series, &SummaryFeatures::new(), true, 1).map(|_| ()),
        selector.predict_by_feature(vec![0.0, 0.0, 0.0], 1).map(|_| ()),
        selector
            .predict_fuzzy(&series, &SummaryFeatures::new(), true, 0.2, &mut rng)
            .map(|_| ()),
    ];
    for result in errors {
        let err = result.expect_err("untrained selector");
        assert!(matches!(err, MetaLearnError::State { .. }));
    }

    let dir = tempfile::tempdir().expect("temp dir");
    assert!(selector.save(dir.path().join("x.bin")).expect_err("untrained").is_state());
}

#[test]
fn test_config_errors_surface_logged_message() {
    let err = MetaLearnModelSelect::new(&scenario_records()[..30]).expect_err("30 records");
    assert_eq!(err.to_string(), "Dataset is too small to train a meta learner!");

    let config: Result<TrainConfig, _> = serde_json::from_str(r#"{"method": "ARIMA"}"#);
    assert!(config.is_err());

    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = MetaLearnModelSelect::new(&scenario_records()).expect("valid metadata");
    let err = selector
        .train(&TrainConfig::new().with_test_size(1.0), &mut rng)
        .expect_err("illegal test size");
    assert!(err.is_config());
}

#[test]
fn test_predict_from_series_with_summary_features() {
    // Metadata built from the reference extractor on synthetic series:
    // trending series favor "holt", noisy flat series favor "naive"
    let extractor = SummaryFeatures::new();
    let records: Vec<TrainingRecord> = (0..40)
        .map(|i| {
            let trending = i % 2 == 0;
            let values: Vec<f64> = (0..60)
                .map(|t| {
                    let t = t as f64;
                    let noise = ((t + i as f64) * 1.3).sin();
                    if trending {
                        10.0 + 0.5 * t + noise
                    } else {
                        30.0 + noise
                    }
                })
                .collect();
            let features = extractor.extract(&TimeSeriesData::from_values(values));
            let (label, holt, naive) = if trending {
                ("holt", 0.1, 0.5)
            } else {
                ("naive", 0.6, 0.2)
            };
            let errors = BTreeMap::from([
                ("holt".to_string(), vec![holt]),
                ("naive".to_string(), vec![naive]),
            ]);
            TrainingRecord::new(features, label, errors)
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(17);
    let mut selector = MetaLearnModelSelect::new(&records).expect("valid metadata");
    selector.preprocess(false, true, &mut rng).expect("preprocess");
    selector
        .train(
            &TrainConfig::new().with_method(Method::RandomForest).with_n_trees(30),
            &mut rng,
        )
        .expect("training succeeds");

    let trending = TimeSeriesData::from_values((0..60).map(|t| 5.0 + 0.5 * f64::from(t)).collect());
    let top = selector
        .predict(&trending, &extractor, false, 2)
        .expect("trained");
    assert_eq!(top.len(), 2);
    assert_eq!(top[0], "holt");

    let fuzzy = selector
        .predict_fuzzy(&trending, &extractor, false, 0.2, &mut rng)
        .expect("forest");
    assert_eq!(fuzzy.label.len(), fuzzy.probability.len());
    assert_eq!(fuzzy.label[0], "holt");
    assert!((0.0..=1.0).contains(&fuzzy.pvalue));
}
