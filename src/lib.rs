//! # gini-tree
//!
//! `gini-tree` builds binary-classification decision trees (CART-style) by
//! recursively partitioning labeled feature vectors on the split that
//! minimizes weighted Gini impurity. The split search can run sequentially or
//! spread the feature dimension over a fixed number of worker threads; both
//! paths pick the same split.
//!
//! ## Example Usage
//!
//! ```rust
//! use gini_tree::data::dataset::{Dataset, Point};
//! use gini_tree::trees::{build_tree, predict};
//! use nalgebra::DVector;
//!
//! let points = vec![
//!     Point::new(DVector::from_vec(vec![1.0, 2.0]), 0),
//!     Point::new(DVector::from_vec(vec![2.0, 1.0]), 0),
//!     Point::new(DVector::from_vec(vec![7.0, 1.0]), 1),
//!     Point::new(DVector::from_vec(vec![8.0, 2.0]), 1),
//! ];
//! let dataset = Dataset::from_points(points).unwrap();
//!
//! let root = build_tree(&dataset, 2).unwrap();
//!
//! let query = Point::new(DVector::from_vec(vec![6.5, 3.0]), 1);
//! assert_eq!(predict(&root, &query).unwrap(), 1);
//! ```

/// Dataset and data manipulation utilities
pub mod data;
/// Error type shared by the crate
pub mod error;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;

pub use error::TreeError;
