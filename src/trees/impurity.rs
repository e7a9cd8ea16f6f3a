//! Gini impurity for binary labels.
//!
//! The two-class specialization lives entirely in [`ClassCounts`]; the split
//! search and the builder only see counts, scores and a majority label.
use crate::error::TreeError;

/// Number of points carrying each of the two labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassCounts([usize; 2]);

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the labels of a slice.
    ///
    /// # Errors
    ///
    /// Returns an error for any label other than 0 or 1.
    pub fn from_labels(labels: &[u8]) -> Result<Self, TreeError> {
        let mut counts = Self::new();
        for (index, &label) in labels.iter().enumerate() {
            if label > 1 {
                return Err(TreeError::InvalidLabel { index, label });
            }
            counts.add(label);
        }
        Ok(counts)
    }

    /// Counts labels already known to be binary, such as a dataset's.
    pub(crate) fn from_valid_labels(labels: impl Iterator<Item = u8>) -> Self {
        let mut counts = Self::new();
        labels.for_each(|label| counts.add(label));
        counts
    }

    #[inline]
    pub(crate) fn add(&mut self, label: u8) {
        self.0[usize::from(label)] += 1;
    }

    pub fn count(&self, label: u8) -> usize {
        self.0.get(usize::from(label)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0[0] + self.0[1]
    }

    /// `1 - Σ p_c²` over both classes, or 0.0 for an empty set.
    pub fn gini(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        self.0.iter().fold(1.0, |gini, &count| {
            let p = count as f64 / n;
            gini - p * p
        })
    }

    /// The label shared by every point, if the set is non-empty and pure.
    pub fn pure_label(&self) -> Option<u8> {
        match self.0 {
            [0, 0] => None,
            [_, 0] => Some(0),
            [0, _] => Some(1),
            _ => None,
        }
    }

    /// Most frequent label; ties go to 0.
    pub fn majority(&self) -> u8 {
        if self.0[0] >= self.0[1] {
            0
        } else {
            1
        }
    }
}

/// Gini impurity of a set of binary labels.
///
/// # Errors
///
/// Returns an error for any label other than 0 or 1.
pub fn gini(labels: &[u8]) -> Result<f64, TreeError> {
    Ok(ClassCounts::from_labels(labels)?.gini())
}

/// Impurity of a prospective split, each side weighted by its share of the
/// parent set.
pub fn weighted_gini(left: &ClassCounts, right: &ClassCounts) -> f64 {
    let total = left.total() + right.total();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    left.gini() * (left.total() as f64 / n) + right.gini() * (right.total() as f64 / n)
}
