//! Random class-balancing down-sampler.

use super::metadata::MetaDataset;
use rand::seq::SliceRandom;
use rand::Rng;

/// Down-samples every class to the size of the smallest one.
///
/// Rows are chosen without replacement within each class. Classes appear in
/// the output in the order they first appear in the input.
///
/// # Examples
///
/// ```no_run
/// use metaselect::metalearner::{MetaDataset, RandomDownSampler, TrainingRecord};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// # let records: Vec<TrainingRecord> = Vec::new();
/// let dataset = MetaDataset::from_records(&records).expect("enough records");
/// let mut rng = StdRng::seed_from_u64(42);
/// let balanced = RandomDownSampler::new(&dataset).fit_resample(&mut rng);
///
/// let counts = balanced.count_category();
/// let min = counts.values().min().copied().unwrap_or(0);
/// assert!(counts.values().all(|&c| c == min));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RandomDownSampler<'a> {
    dataset: &'a MetaDataset,
}

impl<'a> RandomDownSampler<'a> {
    /// Sampler over `dataset`.
    #[must_use]
    pub fn new(dataset: &'a MetaDataset) -> Self {
        Self { dataset }
    }

    /// Row indices of the balanced sample, grouped by class.
    pub fn resample_indices<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for (i, label) in self.dataset.labels().iter().enumerate() {
            match groups.iter_mut().find(|(l, _)| *l == label.as_str()) {
                Some((_, rows)) => rows.push(i),
                None => groups.push((label.as_str(), vec![i])),
            }
        }

        let min_n = groups.iter().map(|(_, rows)| rows.len()).min().unwrap_or(0);
        let mut indices = Vec::with_capacity(min_n * groups.len());
        for (_, rows) in &groups {
            indices.extend(rows.choose_multiple(rng, min_n).copied());
        }
        indices
    }

    /// Balanced copy of the dataset.
    ///
    /// Feature statistics are carried over; callers that need them to match
    /// the new rows recompute them.
    #[must_use]
    pub fn fit_resample<R: Rng + ?Sized>(&self, rng: &mut R) -> MetaDataset {
        let indices = self.resample_indices(rng);
        tracing::debug!(
            before = self.dataset.n_rows(),
            after = indices.len(),
            "down-sampled metadata"
        );
        self.dataset.select_rows(&indices)
    }
}
