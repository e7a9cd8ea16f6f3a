use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::PartialOrd;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::error::TreeError;
use crate::trees::impurity::ClassCounts;

/// Tolerance added to a threshold so that a value equal to it routes left.
pub const SPLIT_TOLERANCE: f64 = 0.0001;

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// Decides which side of a split a feature value falls on.
///
/// Partitioning, split scoring and prediction all route through this
/// predicate, so a training point always follows the same branch at predict
/// time that it took while the tree was built.
#[inline]
pub fn goes_left<T: RealNumber>(value: T, threshold: T) -> bool {
    value < threshold + split_tolerance::<T>()
}

#[inline]
fn split_tolerance<T: RealNumber>() -> T {
    // Always representable for floating point types.
    T::from_f64(SPLIT_TOLERANCE).unwrap_or_else(T::epsilon)
}

/// A single labeled feature vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Point<T: RealNumber> {
    pub features: DVector<T>,
    pub label: u8,
}

impl<T: RealNumber> Point<T> {
    pub fn new(features: DVector<T>, label: u8) -> Self {
        Self { features, label }
    }

    pub fn dimension(&self) -> usize {
        self.features.len()
    }
}

/// An ordered set of binary-labeled points.
///
/// Row `i` of `x` holds the features of point `i` and `y[i]` its label. Every
/// label is 0 or 1; the constructors reject anything else.
#[derive(Clone)]
pub struct Dataset<T: RealNumber> {
    x: DMatrix<T>,
    y: DVector<u8>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    /// Creates a dataset from a feature matrix and a label vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of rows and labels differ, or if any
    /// label is not 0 or 1.
    pub fn new(x: DMatrix<T>, y: DVector<u8>) -> Result<Self, TreeError> {
        if x.nrows() != y.len() {
            return Err(TreeError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }
        if let Some((index, &label)) = y.iter().enumerate().find(|&(_, &label)| label > 1) {
            return Err(TreeError::InvalidLabel { index, label });
        }
        Ok(Self { x, y })
    }

    /// Creates a dataset from individual points.
    ///
    /// # Errors
    ///
    /// Returns an error if the points do not all share the dimensionality of
    /// the first point, or if any label is not 0 or 1.
    pub fn from_points(points: Vec<Point<T>>) -> Result<Self, TreeError> {
        let dimension = points.first().map_or(0, Point::dimension);
        if let Some(point) = points.iter().find(|p| p.dimension() != dimension) {
            return Err(TreeError::DimensionMismatch {
                expected: dimension,
                found: point.dimension(),
            });
        }

        let x = DMatrix::from_fn(points.len(), dimension, |i, j| points[i].features[j]);
        let y = DVector::from_iterator(points.len(), points.iter().map(|p| p.label));
        Self::new(x, y)
    }

    pub fn x(&self) -> &DMatrix<T> {
        &self.x
    }

    pub fn y(&self) -> &DVector<u8> {
        &self.y
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Length of every feature vector in the dataset.
    pub fn dimension(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<Point<T>> {
        if index >= self.nrows() {
            return None;
        }
        Some(Point::new(self.x.row(index).transpose(), self.y[index]))
    }

    pub fn points(&self) -> impl Iterator<Item = Point<T>> + '_ {
        (0..self.nrows()).filter_map(|index| self.point(index))
    }

    pub fn class_counts(&self) -> ClassCounts {
        ClassCounts::from_valid_labels(self.y.iter().copied())
    }

    /// Splits the dataset into the points that fall left of `threshold` on
    /// `feature_index` and those that fall right, see [`goes_left`].
    ///
    /// Both halves are independent copies that keep the original row order.
    ///
    /// # Errors
    ///
    /// Returns an error if `feature_index` is not a valid feature index.
    pub fn split_on_threshold(
        &self,
        feature_index: usize,
        threshold: T,
    ) -> Result<(Self, Self), TreeError> {
        if feature_index >= self.dimension() {
            return Err(TreeError::FeatureIndexOutOfRange {
                index: feature_index,
                dimension: self.dimension(),
            });
        }

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = (0..self.nrows())
            .partition(|&index| goes_left(self.x[(index, feature_index)], threshold));

        Ok((self.select(&left_indices), self.select(&right_indices)))
    }

    /// Shuffles the rows and splits them into a train and a test dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if `train_size` is outside `[0.0, 1.0]`.
    pub fn train_test_split(
        &self,
        train_size: f64,
        seed: Option<u64>,
    ) -> Result<(Self, Self), TreeError> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(TreeError::InvalidTrainSize(train_size));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.nrows() as f64 * train_size).floor() as usize;
        let (train_indices, test_indices) = indices.split_at(train_size);

        Ok((self.select(train_indices), self.select(test_indices)))
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select_rows(indices),
            y: self.y.select_rows(indices),
        }
    }
}
