//! Exhaustive split search over every observed feature value.
use rayon::prelude::*;
use rayon::{ThreadBuilder, ThreadPoolBuilder};
use tracing::{debug, trace};

use super::impurity::{weighted_gini, ClassCounts};
use crate::data::dataset::{goes_left, Dataset, RealNumber};
use crate::error::TreeError;

/// Impurity a candidate must beat to be chosen at all.
pub const NO_SPLIT_IMPURITY: f64 = 1.0;

/// Worker count the builder uses unless configured otherwise.
pub const DEFAULT_SPLIT_WORKERS: usize = 2;

/// A scored `(feature, threshold)` cut.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitCandidate<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    pub impurity: f64,
}

impl<T: RealNumber> SplitCandidate<T> {
    /// Whether `self` beats `other` under the sequential search order: lower
    /// impurity wins, and an exact tie goes to the lower feature index.
    fn precedes(&self, other: &Self) -> bool {
        self.impurity < other.impurity
            || (self.impurity == other.impurity && self.feature_index < other.feature_index)
    }
}

/// How the builder searches for the split at each node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitSearch {
    Sequential,
    /// Spread features over a fresh pool of `workers` threads per search.
    Parallel { workers: usize },
}

impl Default for SplitSearch {
    fn default() -> Self {
        SplitSearch::Parallel {
            workers: DEFAULT_SPLIT_WORKERS,
        }
    }
}

impl SplitSearch {
    /// Runs the configured search on `dataset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parallel worker pool cannot be built.
    pub fn find<T: RealNumber>(
        &self,
        dataset: &Dataset<T>,
    ) -> Result<Option<SplitCandidate<T>>, TreeError> {
        match *self {
            SplitSearch::Sequential => Ok(find_best_split(dataset)),
            SplitSearch::Parallel { workers } => find_best_split_parallel(dataset, workers),
        }
    }
}

/// Finds the split with the lowest weighted Gini impurity.
///
/// Every observed value of every feature is tried as a threshold, features in
/// ascending order and points in row order; the first candidate reaching the
/// minimum wins. Cuts that leave either side empty are skipped. Returns `None`
/// for an empty dataset, when every cut is one-sided, or when no candidate
/// beats [`NO_SPLIT_IMPURITY`].
pub fn find_best_split<T: RealNumber>(dataset: &Dataset<T>) -> Option<SplitCandidate<T>> {
    let best = best_split_among(dataset, 0..dataset.dimension());
    debug!(
        samples = dataset.nrows(),
        feature = best.map(|split| split.feature_index),
        impurity = best.map(|split| split.impurity),
        "sequential split search finished"
    );
    best
}

/// Parallel version of [`find_best_split`] with the same result.
///
/// Worker `w` of `workers` searches features `w, w + workers, w + 2 * workers, ...`
/// on its own thread of a pool that lives only for this call; every worker
/// thread has exited by the time this function returns. The local bests
/// are then reduced in worker order. An exact impurity tie between workers
/// goes to the lower feature index, so the winner is the one the sequential
/// search would have found first.
///
/// # Errors
///
/// Returns an error if `workers` is 0 or the thread pool cannot be built.
pub fn find_best_split_parallel<T: RealNumber>(
    dataset: &Dataset<T>,
    workers: usize,
) -> Result<Option<SplitCandidate<T>>, TreeError> {
    if workers == 0 {
        return Err(TreeError::InvalidWorkerCount(workers));
    }
    if dataset.is_empty() {
        return Ok(None);
    }

    let dimension = dataset.dimension();
    // Scoped threads are joined before `build_scoped` returns.
    let local_bests: Vec<Option<SplitCandidate<T>>> = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("split-worker-{index}"))
        .build_scoped(
            |thread: ThreadBuilder| thread.run(),
            |pool| {
                pool.install(|| {
                    (0..workers)
                        .into_par_iter()
                        .map(|worker| {
                            let local =
                                best_split_among(dataset, (worker..dimension).step_by(workers));
                            trace!(
                                worker,
                                feature = local.map(|split| split.feature_index),
                                impurity = local.map(|split| split.impurity),
                                "split worker finished"
                            );
                            local
                        })
                        .collect()
                })
            },
        )?;

    let best = local_bests
        .into_iter()
        .fold(None, |best: Option<SplitCandidate<T>>, local| match (best, local) {
            (Some(best), Some(local)) if local.precedes(&best) => Some(local),
            (Some(best), _) => Some(best),
            (None, local) => local,
        });
    debug!(
        samples = dataset.nrows(),
        workers,
        feature = best.map(|split| split.feature_index),
        impurity = best.map(|split| split.impurity),
        "parallel split search finished"
    );
    Ok(best)
}

/// Weighted impurity of cutting `dataset` at `threshold` on `feature_index`.
///
/// `feature_index` must be below `dataset.dimension()`.
pub fn split_impurity<T: RealNumber>(dataset: &Dataset<T>, feature_index: usize, threshold: T) -> f64 {
    let (left, right) = split_counts(dataset, feature_index, threshold);
    weighted_gini(&left, &right)
}

fn split_counts<T: RealNumber>(
    dataset: &Dataset<T>,
    feature_index: usize,
    threshold: T,
) -> (ClassCounts, ClassCounts) {
    let mut left = ClassCounts::new();
    let mut right = ClassCounts::new();
    for (&value, &label) in dataset.x().column(feature_index).iter().zip(dataset.y().iter()) {
        if goes_left(value, threshold) {
            left.add(label);
        } else {
            right.add(label);
        }
    }
    (left, right)
}

fn best_split_among<T: RealNumber>(
    dataset: &Dataset<T>,
    features: impl Iterator<Item = usize>,
) -> Option<SplitCandidate<T>> {
    let mut best: Option<SplitCandidate<T>> = None;
    let mut best_impurity = NO_SPLIT_IMPURITY;

    for feature_index in features {
        for &threshold in dataset.x().column(feature_index).iter() {
            let (left, right) = split_counts(dataset, feature_index, threshold);
            // A cut with an empty side separates nothing.
            if left.total() == 0 || right.total() == 0 {
                continue;
            }
            let impurity = weighted_gini(&left, &right);
            if impurity < best_impurity {
                best_impurity = impurity;
                best = Some(SplitCandidate {
                    feature_index,
                    threshold,
                    impurity,
                });
            }
        }
    }
    best
}
