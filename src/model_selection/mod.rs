//! Model selection utilities.
//!
//! Splits are expressed as row indices so that every row-aligned series of a
//! dataset (features, labels, hyper-parameter tables) can be split in lockstep.
//!
//! # Example
//!
//! ```
//! use metaselect::model_selection::train_test_split;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let (train, test) = train_test_split(10, 0.2, &mut rng).expect("valid split");
//! assert_eq!(train.len(), 8);
//! assert_eq!(test.len(), 2);
//! ```

use crate::error::{MetaLearnError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Validates the split and returns `(n_train, n_test)`.
///
/// The test split holds `ceil(n_samples * test_size)` rows.
fn validate_split_inputs(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MetaLearnError::config(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(MetaLearnError::config(format!(
            "Split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Randomly partitions `0..n_samples` into train and test row indices.
///
/// The split is unstratified. Both halves keep the shuffled order.
///
/// # Errors
///
/// Returns a configuration error if `test_size` is outside `(0, 1)` or either
/// half would be empty.
pub fn train_test_split<R: Rng + ?Sized>(
    n_samples: usize,
    test_size: f64,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let (n_train, _) = validate_split_inputs(n_samples, test_size)?;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(rng);
    let test = indices.split_off(n_train);
    Ok((indices, test))
}
