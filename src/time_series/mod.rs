//! Time series input for the model selector.
//!
//! This module provides:
//! - [`TimeSeriesData`], a univariate series with its time index
//! - [`FeatureExtractor`], the seam through which a series becomes a named
//!   feature vector
//! - [`SummaryFeatures`], a reference extractor of shape, trend and
//!   autocorrelation statistics
//!
//! # Quick Start
//!
//! ```
//! use metaselect::time_series::{FeatureExtractor, SummaryFeatures, TimeSeriesData};
//!
//! let series = TimeSeriesData::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! let features = SummaryFeatures::new().extract(&series);
//!
//! assert_eq!(features["length"], 6.0);
//! assert!((features["trend_slope"] - 1.0).abs() < 1e-12);
//! ```

mod features;

pub use features::SummaryFeatures;

use crate::error::{MetaLearnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Turns a series into named numeric features.
///
/// Degenerate series (too short, constant) may yield NaN values; the
/// selector warns about them and treats them as 0.
pub trait FeatureExtractor {
    /// Feature name to value.
    fn extract(&self, series: &TimeSeriesData) -> BTreeMap<String, f64>;
}

impl<F> FeatureExtractor for F
where
    F: Fn(&TimeSeriesData) -> BTreeMap<String, f64>,
{
    fn extract(&self, series: &TimeSeriesData) -> BTreeMap<String, f64> {
        self(series)
    }
}

/// A univariate time series.
///
/// # Examples
///
/// ```
/// use metaselect::time_series::TimeSeriesData;
///
/// let ts = TimeSeriesData::new(vec![10, 20, 30], vec![2.0, 4.0, 8.0]).expect("same length");
/// let scaled = ts.rescaled_by_max().expect("positive maximum");
/// assert_eq!(scaled.value(), &[0.25, 0.5, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesData {
    time: Vec<i64>,
    value: Vec<f64>,
}

impl TimeSeriesData {
    /// Pairs each timestamp with a value.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` and `value` have different lengths.
    pub fn new(time: Vec<i64>, value: Vec<f64>) -> Result<Self> {
        if time.len() != value.len() {
            return Err(MetaLearnError::dimension_mismatch(
                "timestamps",
                time.len(),
                value.len(),
            ));
        }
        Ok(Self { time, value })
    }

    /// Series indexed `0..n`.
    #[must_use]
    pub fn from_values(value: Vec<f64>) -> Self {
        let time = (0..value.len() as i64).collect();
        Self { time, value }
    }

    /// Timestamps.
    #[must_use]
    pub fn time(&self) -> &[i64] {
        &self.time
    }

    /// Observed values.
    #[must_use]
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// True if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Copy of the series with every value divided by the series maximum.
    ///
    /// Returns `None` when the maximum is zero or not finite (including an
    /// empty series), since the division would not produce usable values.
    #[must_use]
    pub fn rescaled_by_max(&self) -> Option<Self> {
        let max = self
            .value
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() || max == 0.0 {
            return None;
        }
        Some(Self {
            time: self.time.clone(),
            value: self.value.iter().map(|v| v / max).collect(),
        })
    }
}
