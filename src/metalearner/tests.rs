use super::*;
use crate::metalearner::{Encoded, EvalMethod, Method};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Class "A" sits near the origin and "B" near (5, 5, 5). Each row's
/// errors favor its own label.
fn record(label: &str, i: usize) -> TrainingRecord {
    let center = if label == "A" { 0.0 } else { 5.0 };
    let jitter = (i % 7) as f64 * 0.05;
    let features = BTreeMap::from([
        ("f1".to_string(), center + jitter),
        ("f2".to_string(), center - jitter),
        ("f3".to_string(), center + 2.0 * jitter),
    ]);
    let (a, b) = if label == "A" { (0.1, 0.4) } else { (0.6, 0.2) };
    let errors = BTreeMap::from([
        ("A".to_string(), vec![1.0, a]),
        ("B".to_string(), vec![2.0, b]),
    ]);
    TrainingRecord::new(features, label, errors)
}

fn records(n_a: usize, n_b: usize) -> Vec<TrainingRecord> {
    let mut out: Vec<TrainingRecord> = (0..n_a).map(|i| record("A", i)).collect();
    out.extend((0..n_b).map(|i| record("B", i)));
    out
}

fn trained(method: Method, seed: u64) -> MetaLearnModelSelect {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let config = TrainConfig::new()
        .with_method(method)
        .with_n_trees(15)
        .with_test_size(0.25);
    selector.train(&config, &mut rng).expect("training succeeds");
    selector
}

fn series_extractor(ts: &TimeSeriesData) -> BTreeMap<String, f64> {
    let m = crate::stats::mean(ts.value());
    BTreeMap::from([
        ("f1".to_string(), m),
        ("f2".to_string(), m),
        ("f3".to_string(), m),
    ])
}

#[test]
fn test_too_few_records() {
    let err = MetaLearnModelSelect::new(&records(15, 15)).expect_err("30 records");
    assert!(err.is_config());
    assert_eq!(err.to_string(), "Dataset is too small to train a meta learner!");
}

#[test]
fn test_first_record_missing_fields() {
    let cases = [
        ("hpt_res", "Missing best hyper-params, not able to train a meta learner!"),
        ("features", "Missing time series features, not able to train a meta learner!"),
        ("best_model", "Missing best models, not able to train a meta learner!"),
    ];
    for (field, message) in cases {
        let mut data = records(20, 20);
        match field {
            "hpt_res" => data[0].hpt_res = None,
            "features" => data[0].features = None,
            _ => data[0].best_model = None,
        }
        let err = MetaLearnModelSelect::new(&data).expect_err("missing field");
        assert!(err.is_config());
        assert_eq!(err.to_string(), message);
    }
}

#[test]
fn test_later_record_missing_field_names_index() {
    let mut data = records(20, 20);
    data[5].features = None;
    let err = MetaLearnModelSelect::new(&data).expect_err("missing field");
    assert!(err.to_string().starts_with("Record 5: "));
}

#[test]
fn test_single_class_rejected() {
    let err = MetaLearnModelSelect::new(&records(35, 0)).expect_err("one class");
    assert_eq!(
        err.to_string(),
        "Only one class in the label column (best_model), not able to train a classifier!"
    );
}

#[test]
fn test_json_text_fields_and_nulls() {
    let mut data = records(20, 20);
    data[0] = TrainingRecord {
        features: Some(Encoded::Text(r#"{"f1": 0.5, "f2": null, "f3": 1.0}"#.to_string())),
        best_model: Some("A".to_string()),
        hpt_res: Some(Encoded::Text(
            r#"{"A": [{"p": 1}, 0.1], "B": [{"q": 2}, 0.4]}"#.to_string(),
        )),
    };
    let selector = MetaLearnModelSelect::new(&data).expect("valid metadata");
    let dataset = selector.dataset();
    assert_eq!(dataset.features().row(0), &[0.5, 0.0, 1.0]);
    assert_eq!(dataset.errors()[0]["B"], 0.4);

    data[1].hpt_res = Some(Encoded::Text("not json".to_string()));
    assert!(MetaLearnModelSelect::new(&data).expect_err("bad json").is_config());
}

#[test]
fn test_count_category_and_names() {
    let selector = MetaLearnModelSelect::new(&records(25, 10)).expect("valid metadata");
    let counts = selector.count_category();
    assert_eq!(counts["A"], 25);
    assert_eq!(counts["B"], 10);
    assert_eq!(selector.feature_names(), &["f1", "f2", "f3"]);
    assert!(!selector.is_trained());
}

#[test]
fn test_preprocess_downsample_balances_and_refreshes_stats() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut selector = MetaLearnModelSelect::new(&records(30, 12)).expect("valid metadata");
    selector.preprocess(true, false, &mut rng).expect("preprocess");

    let counts = selector.count_category();
    assert_eq!(counts["A"], 12);
    assert_eq!(counts["B"], 12);

    let dataset = selector.dataset();
    assert_eq!(dataset.errors().len(), 24);
    assert_eq!(dataset.features().n_rows(), 24);
    let expected = FeatureStats::from_matrix(dataset.features());
    assert_eq!(dataset.stats(), &expected);
}

#[test]
fn test_preprocess_scale_standardizes_once() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    selector.preprocess(false, true, &mut rng).expect("preprocess");
    assert!(selector.is_scaled());

    let features = selector.dataset().features().clone();
    for j in 0..features.n_cols() {
        let col = features.column(j);
        assert!(crate::stats::mean(&col).abs() < 1e-9);
        assert!((crate::stats::std(&col) - 1.0).abs() < 1e-9);
    }

    selector.preprocess(false, true, &mut rng).expect("preprocess");
    assert_eq!(selector.dataset().features(), &features);
}

#[test]
fn test_correlation_matrix() {
    let selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let corr = selector.correlation_matrix().expect("non-empty");
    assert_eq!(corr.shape(), (3, 3));
    // Every feature tracks the class center
    assert!(corr.get(0, 1) > 0.9);
}

#[test]
fn test_feature_comparison() {
    let selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let cmp = selector.feature_comparison(0, 25).expect("in range");
    assert_eq!(cmp.columns, ["A model".to_string(), "B model".to_string()]);
    assert_eq!(cmp.rows.len(), 3);
    assert_eq!(cmp.rows[0].0, "f1");
    assert_eq!(cmp.rows[0].1, 0.0);
    assert!(selector.feature_comparison(0, 40).is_err());
}

#[test]
fn test_train_report_keys() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let config = TrainConfig::new()
        .with_method(Method::NaiveBayes)
        .with_test_size(0.2);
    let report = selector.train(&config, &mut rng).expect("training succeeds");

    for key in ["meta-learn", "A", "B"] {
        assert!(report.fit_error.contains_key(key));
        assert!(report.pred_error.contains_key(key));
    }
    assert!((0.0..=1.0).contains(&report.clf_accuracy));
    // Separable classes: the learned selector matches the per-row best
    assert!(report.fit_error["meta-learn"] <= report.fit_error["A"]);
    assert!(report.fit_error["meta-learn"] <= report.fit_error["B"]);
    assert!(selector.is_trained());
    assert_eq!(selector.class_names(), Some(&["A".to_string(), "B".to_string()][..]));
}

#[test]
fn test_train_every_method() {
    for method in Method::ALL {
        let selector = trained(method, 5);
        let best = selector
            .predict_by_feature(vec![5.0, 5.0, 5.0], 1)
            .expect("trained");
        assert_eq!(best, vec![vec!["B".to_string()]], "method {method}");
    }
}

#[test]
fn test_train_median_eval() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let config = TrainConfig::new()
        .with_method(Method::Knn)
        .with_eval_method(EvalMethod::Median)
        .with_test_size(0.5);
    let report = selector.train(&config, &mut rng).expect("training succeeds");
    assert!(report.fit_error["meta-learn"] <= 0.2);
}

#[test]
fn test_train_illegal_test_size() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    for bad in [0.0, 1.0] {
        let err = selector
            .train(&TrainConfig::new().with_test_size(bad), &mut rng)
            .expect_err("illegal test size");
        assert_eq!(err.to_string(), "Illegal test set.");
    }
    assert!(!selector.is_trained());
}

#[test]
fn test_train_too_many_neighbors() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let config = TrainConfig::new()
        .with_method(Method::Knn)
        .with_n_neighbors(100);
    assert!(selector.train(&config, &mut rng).expect_err("k > n").is_config());
}

#[test]
fn test_train_missing_candidate() {
    let mut data = records(20, 20);
    data[3] = TrainingRecord::new(
        BTreeMap::from([
            ("f1".to_string(), 0.0),
            ("f2".to_string(), 0.0),
            ("f3".to_string(), 0.0),
        ]),
        "A",
        BTreeMap::from([("A".to_string(), vec![0.1])]),
    );
    let mut rng = StdRng::seed_from_u64(1);
    let mut selector = MetaLearnModelSelect::new(&data).expect("valid metadata");
    let err = selector
        .train(&TrainConfig::new().with_method(Method::NaiveBayes), &mut rng)
        .expect_err("row 3 has no error for B");
    assert!(matches!(err, MetaLearnError::MissingCandidate { ref label, .. } if label == "B"));
}

#[test]
fn test_untrained_selector_state_errors() {
    let selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    let series = TimeSeriesData::from_values(vec![1.0, 2.0, 3.0]);
    let mut rng = StdRng::seed_from_u64(0);

    let err = selector
        .predict_by_feature(vec![0.0, 0.0, 0.0], 1)
        .expect_err("untrained");
    assert!(err.is_state());
    assert_eq!(
        err.to_string(),
        "Haven't trained a model. Please train a model or load a model before predicting."
    );
    assert!(selector.predict(&series, &series_extractor, true, 1).expect_err("untrained").is_state());
    assert!(selector
        .predict_fuzzy(&series, &series_extractor, true, 0.2, &mut rng)
        .expect_err("untrained")
        .is_state());

    let dir = tempfile::tempdir().expect("temp dir");
    let err = selector.save(dir.path().join("model.bin")).expect_err("untrained");
    assert!(err.is_state());
    assert_eq!(err.to_string(), "Haven't trained a model.");
}

#[test]
fn test_predict_by_feature_top_k() {
    let selector = trained(Method::NaiveBayes, 8);
    let rows = vec![vec![0.0, 0.0, 0.0], vec![5.0, 5.0, 5.0]];

    let top2 = selector.predict_by_feature(rows.clone(), 2).expect("trained");
    assert_eq!(top2[0], vec!["A".to_string(), "B".to_string()]);
    assert_eq!(top2[1], vec!["B".to_string(), "A".to_string()]);

    // Capped at the number of classes
    let top5 = selector.predict_by_feature(rows.clone(), 5).expect("trained");
    assert!(top5.iter().all(|r| r.len() == 2));

    assert!(selector.predict_by_feature(rows, 0).expect_err("n_top 0").is_config());
}

/// Three classes on a line: "A" near 0, "B" near 10, "C" near 20.
fn three_class_records() -> Vec<TrainingRecord> {
    let labels = [("A", 0.0), ("B", 10.0), ("C", 20.0)];
    let mut out = Vec::new();
    for (label, center) in labels {
        for i in 0..20 {
            let jitter = (i % 7) as f64 * 0.5;
            let features = BTreeMap::from([
                ("f1".to_string(), center + jitter),
                ("f2".to_string(), center - jitter),
                ("f3".to_string(), center + 2.0 * jitter),
            ]);
            let errors = labels
                .iter()
                .map(|(l, _)| (l.to_string(), vec![if *l == label { 0.1 } else { 0.5 }]))
                .collect();
            out.push(TrainingRecord::new(features, label, errors));
        }
    }
    out
}

#[test]
fn test_predict_by_feature_three_class_order() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut selector = MetaLearnModelSelect::new(&three_class_records()).expect("valid metadata");
    let config = TrainConfig::new()
        .with_method(Method::NaiveBayes)
        .with_test_size(0.25);
    selector.train(&config, &mut rng).expect("training succeeds");

    // 8 sits closest to B, then A; 12 closest to B, then C
    let rows = vec![vec![8.0, 8.0, 8.0], vec![12.0, 12.0, 12.0]];
    let ranked = selector.predict_by_feature(rows.clone(), 3).expect("trained");
    assert_eq!(ranked[0], vec!["B", "A", "C"]);
    assert_eq!(ranked[1], vec!["B", "C", "A"]);

    let names = selector.class_names().expect("trained").to_vec();
    let proba = selector.predict_proba_by_feature(rows).expect("trained");
    assert_eq!(proba.shape(), (2, 3));
    for (r, labels) in ranked.iter().enumerate() {
        let p: Vec<f64> = labels
            .iter()
            .map(|l| proba.get(r, names.iter().position(|n| n == l).expect("known label")))
            .collect();
        assert!(p[0] > p[1] && p[1] > p[2], "row {r}: {p:?}");
    }
}

#[test]
fn test_preprocess_returns_ok_and_scales_once() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    selector.preprocess(true, true, &mut rng).expect("first pass");
    let scaled = selector.dataset().features().clone();
    selector.preprocess(false, true, &mut rng).expect("second pass is skipped");
    assert_eq!(selector.dataset().features(), &scaled);
}

#[test]
fn test_encode_labels_matches_sorted_class_names() {
    let mut data = records(20, 20);
    data.rotate_left(25);
    let dataset = MetaDataset::from_records(&data).expect("valid metadata");
    let (names, codes) = dataset.encode_labels();
    assert_eq!(names, dataset.class_names());
    assert_eq!(codes.len(), dataset.n_rows());
    for (label, &code) in dataset.labels().iter().zip(&codes) {
        assert_eq!(&names[code], label);
    }
}

#[test]
fn test_predict_by_feature_nan_is_zero() {
    let selector = trained(Method::NaiveBayes, 8);
    let with_nan = selector
        .predict_by_feature(vec![f64::NAN, 0.0, 0.0], 1)
        .expect("trained");
    assert_eq!(with_nan, vec![vec!["A".to_string()]]);
}

#[test]
fn test_predict_by_feature_rejects_wrong_width() {
    let selector = trained(Method::NaiveBayes, 8);
    assert!(selector
        .predict_by_feature(vec![0.0, 0.0], 1)
        .expect_err("two columns")
        .is_config());
}

#[test]
fn test_scaled_model_scales_inputs() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut selector = MetaLearnModelSelect::new(&records(20, 20)).expect("valid metadata");
    selector.preprocess(false, true, &mut rng).expect("preprocess");
    selector
        .train(&TrainConfig::new().with_method(Method::Knn), &mut rng)
        .expect("training succeeds");

    // Raw feature values; the selector applies the training scaling
    let best = selector
        .predict_by_feature(vec![5.0, 5.0, 5.0], 1)
        .expect("trained");
    assert_eq!(best, vec![vec!["B".to_string()]]);
}

#[test]
fn test_predict_from_series() {
    let selector = trained(Method::NaiveBayes, 4);
    let series = TimeSeriesData::from_values(vec![4.0, 5.0, 6.0]);
    assert_eq!(
        selector.predict(&series, &series_extractor, false, 1).expect("trained"),
        vec!["B".to_string()]
    );
    // Rescaled by its maximum, the mean drops to 5/6
    assert_eq!(
        selector.predict(&series, &series_extractor, true, 1).expect("trained"),
        vec!["A".to_string()]
    );
}

#[test]
fn test_predict_missing_extracted_feature() {
    let selector = trained(Method::NaiveBayes, 4);
    let partial = |_: &TimeSeriesData| BTreeMap::from([("f1".to_string(), 1.0)]);
    let series = TimeSeriesData::from_values(vec![1.0, 2.0]);
    assert!(selector
        .predict(&series, &partial, false, 1)
        .expect_err("f2 missing")
        .is_config());
}

#[test]
fn test_predict_fuzzy_requires_forest() {
    let selector = trained(Method::NaiveBayes, 4);
    let series = TimeSeriesData::from_values(vec![5.0, 5.0]);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(selector
        .predict_fuzzy(&series, &series_extractor, false, 0.2, &mut rng)
        .expect_err("not a forest")
        .is_config());
}

#[test]
fn test_predict_fuzzy_label_count_follows_pvalue() {
    let selector = trained(Method::RandomForest, 9);
    let series = TimeSeriesData::from_values(vec![5.0, 5.0, 5.0]);
    let mut rng = StdRng::seed_from_u64(0);

    // Every tree puts the series in "B": the lead is never negative
    let clear = selector
        .predict_fuzzy(&series, &series_extractor, false, 0.2, &mut rng)
        .expect("forest");
    assert_eq!(clear.pvalue, 0.0);
    assert_eq!(clear.label, vec!["B".to_string()]);
    assert_eq!(clear.probability.len(), 1);

    let lenient = selector
        .predict_fuzzy(&series, &series_extractor, false, 0.0, &mut rng)
        .expect("forest");
    assert_eq!(lenient.label, vec!["B".to_string(), "A".to_string()]);
    assert_eq!(lenient.probability.len(), 2);
    assert!(lenient.probability[0] >= lenient.probability[1]);
}

#[test]
fn test_save_load_roundtrip() {
    let selector = trained(Method::RandomForest, 13);
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("selector.bin");
    selector.save(&path).expect("trained model saves");

    let restored = MetaLearnModelSelect::load(&path).expect("snapshot loads");
    assert!(restored.is_trained());
    let rows = vec![vec![0.0, 0.0, 0.0], vec![5.0, 5.0, 5.0], vec![2.4, 2.6, 2.5]];
    assert_eq!(
        restored.predict_by_feature(rows.clone(), 2).expect("trained"),
        selector.predict_by_feature(rows, 2).expect("trained")
    );
}

#[test]
fn test_load_failure_keeps_state() {
    let mut selector = trained(Method::NaiveBayes, 13);
    let dir = tempfile::tempdir().expect("temp dir");

    let err = selector
        .load_from(dir.path().join("missing.bin"))
        .expect_err("no file");
    assert!(err.is_state());
    assert_eq!(
        err.to_string(),
        "No existing pre-trained model. Please change file path or train a model first!"
    );
    assert!(selector.is_trained());

    let garbage = dir.path().join("garbage.bin");
    std::fs::write(&garbage, b"not a model").expect("write");
    assert!(MetaLearnModelSelect::load(&garbage).expect_err("garbage").is_state());
}

#[test]
fn test_rank_descending_keeps_index_order_on_ties() {
    assert_eq!(rank_descending(&[0.2, 0.5, 0.5, 0.1]), vec![1, 2, 0, 3]);
}
