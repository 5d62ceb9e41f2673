//! Summary statistics of a series used as meta-learning features.

use super::{FeatureExtractor, TimeSeriesData};
use crate::stats::{mean, median};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference feature extractor.
///
/// Produces:
/// - `length`, `mean`, `var`
/// - `linearity`: R² of a least-squares line through the series
/// - `trend_slope`: slope of that line per observation
/// - `lag1_acf`: lag-1 autocorrelation
/// - `lumpiness` / `stability`: variance of the per-window variances / means
/// - `crossing_points`: number of times the series crosses its median
/// - `flat_spots`: longest run of values falling in the same of ten
///   equal-width bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFeatures {
    window_size: usize,
    n_bins: usize,
}

impl SummaryFeatures {
    /// Extractor with 20-observation windows and ten bins.
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_size: 20,
            n_bins: 10,
        }
    }

    /// Sets the window length used by lumpiness and stability.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    fn window_stats(&self, values: &[f64]) -> (f64, f64) {
        let (means, vars): (Vec<f64>, Vec<f64>) = values
            .chunks(self.window_size.max(1))
            .map(|w| (mean(w), variance(w)))
            .unzip();
        (variance(&vars), variance(&means))
    }
}

impl Default for SummaryFeatures {
    fn default() -> Self {
        Self::new()
    }
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Slope and R² of the least-squares fit of `values` against `0..n`.
fn linear_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n < 2 {
        return (f64::NAN, f64::NAN);
    }
    let t_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (t, &y) in values.iter().enumerate() {
        let dt = t as f64 - t_mean;
        let dy = y - y_mean;
        sxy += dt * dy;
        sxx += dt * dt;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let r_squared = if syy == 0.0 {
        f64::NAN
    } else {
        sxy * sxy / (sxx * syy)
    };
    (slope, r_squared)
}

fn lag1_autocorrelation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let denominator: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if denominator == 0.0 {
        return f64::NAN;
    }
    let numerator: f64 = values
        .windows(2)
        .map(|w| (w[0] - m) * (w[1] - m))
        .sum();
    numerator / denominator
}

fn crossing_points(values: &[f64]) -> f64 {
    let mid = median(values);
    let above: Vec<bool> = values.iter().map(|&v| v > mid).collect();
    above.windows(2).filter(|w| w[0] != w[1]).count() as f64
}

fn flat_spots(values: &[f64], n_bins: usize) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(min.is_finite() && max.is_finite()) {
        return f64::NAN;
    }
    let n_bins = n_bins.max(1);
    let width = (max - min) / n_bins as f64;
    let bin = |v: f64| {
        if width == 0.0 {
            0
        } else {
            (((v - min) / width) as usize).min(n_bins - 1)
        }
    };

    let mut longest = 0usize;
    let mut run = 0usize;
    let mut previous = None;
    for &v in values {
        let b = bin(v);
        run = if previous == Some(b) { run + 1 } else { 1 };
        longest = longest.max(run);
        previous = Some(b);
    }
    longest as f64
}

impl FeatureExtractor for SummaryFeatures {
    fn extract(&self, series: &TimeSeriesData) -> BTreeMap<String, f64> {
        let values = series.value();
        let (trend_slope, linearity) = linear_fit(values);
        let (lumpiness, stability) = self.window_stats(values);

        let features = [
            ("length", values.len() as f64),
            ("mean", mean(values)),
            ("var", variance(values)),
            ("linearity", linearity),
            ("trend_slope", trend_slope),
            ("lag1_acf", lag1_autocorrelation(values)),
            ("lumpiness", lumpiness),
            ("stability", stability),
            ("crossing_points", crossing_points(values)),
            ("flat_spots", flat_spots(values, self.n_bins)),
        ];
        features
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}
