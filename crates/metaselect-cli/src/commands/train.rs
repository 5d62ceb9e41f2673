//! Train command: fit a selector on metadata and save it.

use super::{print_json, read_records};
use crate::error::{CliError, Result};
use metaselect::metalearner::{EvalMethod, Method, TrainConfig};
use metaselect::MetaLearnModelSelect;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;

/// Preprocessing switches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PreprocessConfig {
    pub(crate) downsample: bool,
    pub(crate) scale: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            downsample: true,
            scale: false,
        }
    }
}

/// Contents of a `--config` TOML file.
///
/// ```toml
/// [preprocess]
/// downsample = true
/// scale = true
///
/// [train]
/// method = "GBDT"
/// eval_method = "median"
/// test_size = 0.2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) preprocess: PreprocessConfig,
    pub(crate) train: TrainConfig,
}

impl CliConfig {
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CliError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Flag values that override the config file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) method: Option<Method>,
    pub(crate) eval_method: Option<EvalMethod>,
    pub(crate) test_size: Option<f64>,
    pub(crate) n_trees: Option<usize>,
    pub(crate) n_neighbors: Option<usize>,
    pub(crate) no_downsample: bool,
    pub(crate) scale: bool,
}

impl Overrides {
    pub(crate) fn apply(self, mut config: CliConfig) -> CliConfig {
        let train = &mut config.train;
        if let Some(method) = self.method {
            train.method = method;
        }
        if let Some(eval_method) = self.eval_method {
            train.eval_method = eval_method;
        }
        if let Some(test_size) = self.test_size {
            train.test_size = test_size;
        }
        if let Some(n_trees) = self.n_trees {
            train.n_trees = n_trees;
        }
        if let Some(n_neighbors) = self.n_neighbors {
            train.n_neighbors = n_neighbors;
        }
        if self.no_downsample {
            config.preprocess.downsample = false;
        }
        if self.scale {
            config.preprocess.scale = true;
        }
        config
    }
}

pub(crate) fn run<R: Rng>(
    metadata: &Path,
    output: &Path,
    config: &CliConfig,
    rng: &mut R,
) -> Result<()> {
    let records = read_records(metadata)?;
    let mut selector = MetaLearnModelSelect::new(&records)?;
    selector.preprocess(config.preprocess.downsample, config.preprocess.scale, rng)?;

    let report = selector.train(&config.train, rng)?;
    selector.save(output)?;
    tracing::info!(path = %output.display(), "wrote model");
    print_json(&report)
}
