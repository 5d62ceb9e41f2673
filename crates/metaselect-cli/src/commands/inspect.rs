//! Inspect command: summarize training metadata without training.

use super::{print_json, read_records};
use crate::error::Result;
use metaselect::metalearner::FeatureComparison;
use metaselect::MetaLearnModelSelect;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct InspectResult {
    rows: usize,
    features: Vec<String>,
    categories: BTreeMap<String, usize>,
    /// Row-major; constant columns correlate as null
    correlation: Vec<Vec<Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<FeatureComparison>,
}

pub(crate) fn run(metadata: &Path, compare: Option<(usize, usize)>) -> Result<()> {
    let records = read_records(metadata)?;
    let selector = MetaLearnModelSelect::new(&records)?;

    let correlation = selector
        .correlation_matrix()?
        .into_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|v| (!v.is_nan()).then_some(v)).collect())
        .collect();
    let comparison = compare
        .map(|(i, j)| selector.feature_comparison(i, j))
        .transpose()?;

    print_json(&InspectResult {
        rows: selector.dataset().n_rows(),
        features: selector.feature_names().to_vec(),
        categories: selector.count_category(),
        correlation,
        comparison,
    })
}
