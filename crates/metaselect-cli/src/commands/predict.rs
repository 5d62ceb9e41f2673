//! Prediction commands: from a series, from feature rows, and fuzzy.
//!
//! Series are turned into features with [`SummaryFeatures`], so models used
//! here must have been trained on metadata produced by the same extractor.

use super::{print_json, read_json, read_series};
use crate::error::Result;
use metaselect::metalearner::FeatureInput;
use metaselect::time_series::SummaryFeatures;
use metaselect::MetaLearnModelSelect;
use rand::Rng;
use std::path::Path;

pub(crate) fn run_series(model: &Path, series: &Path, rescale: bool, top: usize) -> Result<()> {
    let selector = MetaLearnModelSelect::load(model)?;
    let series = read_series(series)?;
    let labels = selector.predict(&series, &SummaryFeatures::new(), rescale, top)?;
    print_json(&labels)
}

pub(crate) fn run_features(model: &Path, features: &Path, top: usize) -> Result<()> {
    let selector = MetaLearnModelSelect::load(model)?;
    let input: FeatureInput = read_json(features)?;
    let labels = selector.predict_by_feature(input, top)?;
    print_json(&labels)
}

pub(crate) fn run_fuzzy<R: Rng>(
    model: &Path,
    series: &Path,
    rescale: bool,
    sig_level: f64,
    rng: &mut R,
) -> Result<()> {
    let selector = MetaLearnModelSelect::load(model)?;
    let series = read_series(series)?;
    let prediction =
        selector.predict_fuzzy(&series, &SummaryFeatures::new(), rescale, sig_level, rng)?;
    print_json(&prediction)
}
