//! Subcommand implementations and the file helpers they share.

pub(crate) mod inspect;
pub(crate) mod predict;
pub(crate) mod train;

use crate::error::{CliError, Result};
use metaselect::metalearner::TrainingRecord;
use metaselect::time_series::TimeSeriesData;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Training metadata as a JSON array of records.
pub(crate) fn read_records(path: &Path) -> Result<Vec<TrainingRecord>> {
    let records: Vec<TrainingRecord> = read_json(path)?;
    tracing::debug!(path = %path.display(), records = records.len(), "read metadata");
    Ok(records)
}

/// A series file: either `{"time": [...], "value": [...]}` or a bare array
/// of values.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesFile {
    Full(TimeSeriesData),
    Values(Vec<f64>),
}

pub(crate) fn read_series(path: &Path) -> Result<TimeSeriesData> {
    Ok(match read_json(path)? {
        SeriesFile::Full(series) => series,
        SeriesFile::Values(values) => TimeSeriesData::from_values(values),
    })
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
