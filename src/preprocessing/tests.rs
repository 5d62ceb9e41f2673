//! Tests for preprocessing module.

use super::*;

fn column_mean_std(x: &Matrix<f64>, j: usize) -> (f64, f64) {
    let col = x.column(j);
    let n = col.len() as f64;
    let mean = col.iter().sum::<f64>() / n;
    let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[test]
fn test_stats_basic() {
    let data = Matrix::from_rows(&[vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]])
        .expect("valid matrix dimensions");
    let stats = FeatureStats::from_matrix(&data);

    assert!((stats.mean()[0] - 2.0).abs() < 1e-12);
    assert!((stats.mean()[1] - 20.0).abs() < 1e-12);

    // Std should be sqrt(2/3) ≈ 0.8165
    let expected_std = (2.0_f64 / 3.0).sqrt();
    assert!((stats.std()[0] - expected_std).abs() < 1e-12);
    assert!((stats.std()[1] - expected_std * 10.0).abs() < 1e-9);
}

#[test]
fn test_constant_column_gets_unit_std() {
    let data = Matrix::from_rows(&[vec![5.0, 1.0], vec![5.0, 2.0]]).expect("2x2 matrix");
    let stats = FeatureStats::from_matrix(&data);
    assert_eq!(stats.std()[0], 1.0);

    let scaled = stats.standardize(&data).expect("same column count");
    assert_eq!(scaled.column(0), vec![0.0, 0.0]);
}

#[test]
fn test_standardize_zero_mean_unit_std() {
    let data = Matrix::from_rows(&[
        vec![1.0, -4.0],
        vec![3.0, 0.5],
        vec![8.0, 2.0],
        vec![2.0, 9.0],
    ])
    .expect("4x2 matrix");
    let stats = FeatureStats::from_matrix(&data);
    let scaled = stats.standardize(&data).expect("same column count");

    for j in 0..2 {
        let (mean, std) = column_mean_std(&scaled, j);
        assert!(mean.abs() < 1e-9, "column {j} mean {mean}");
        assert!((std - 1.0).abs() < 1e-9, "column {j} std {std}");
    }
}

#[test]
fn test_standardize_dimension_mismatch() {
    let stats = FeatureStats::from_matrix(&Matrix::zeros(3, 2));
    let result = stats.standardize(&Matrix::zeros(1, 3));
    assert!(matches!(
        result,
        Err(MetaLearnError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_empty_stats() {
    let stats = FeatureStats::from_matrix(&Matrix::zeros(0, 3));
    assert_eq!(stats.mean(), &[0.0, 0.0, 0.0]);
    assert_eq!(stats.std(), &[1.0, 1.0, 1.0]);
}

#[test]
fn test_scaler_new() {
    let scaler = StandardScaler::new();
    assert!(!scaler.is_fitted());
    assert!(matches!(
        scaler.transform(&Matrix::zeros(1, 1)),
        Err(MetaLearnError::NotFitted)
    ));
}

#[test]
fn test_scaler_fit_transform() {
    let data = Matrix::from_rows(&[vec![0.0, 0.0], vec![1.0, 10.0], vec![2.0, 20.0]])
        .expect("valid matrix dimensions");

    let mut scaler = StandardScaler::new();
    let scaled = scaler
        .fit_transform(&data)
        .expect("fit_transform should succeed");

    assert!(scaler.is_fitted());
    assert!(scaler.stats().is_some());
    let (mean, std) = column_mean_std(&scaled, 1);
    assert!(mean.abs() < 1e-9);
    assert!((std - 1.0).abs() < 1e-9);
}

#[test]
fn test_scaler_rejects_empty() {
    let mut scaler = StandardScaler::new();
    assert!(scaler.fit(&Matrix::zeros(0, 2)).is_err());
}
