//! Decision Tree Classifier
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use super::node::TreeNode;
use super::params::TreeClassifierParams;
use super::split::SplitSearch;
use crate::data::dataset::{Dataset, Point, RealNumber};
use crate::error::TreeError;
use crate::metrics::confusion::ClassificationMetrics;

/// Builds a tree of at most `max_depth` levels using the parallel split
/// search with the default worker count.
///
/// # Errors
///
/// Returns an error if `dataset` is empty or the split workers can't be started.
pub fn build_tree<T: RealNumber>(
    dataset: &Dataset<T>,
    max_depth: u16,
) -> Result<TreeNode<T>, TreeError> {
    let mut classifier = DecisionTreeClassifier::with_params(Some(max_depth), None)?;
    classifier.fit(dataset)?;
    classifier.root.map(|root| *root).ok_or(TreeError::NotFitted)
}

/// Predicts the label of `point` by walking down from `root`.
///
/// # Errors
///
/// Returns an error if the point has fewer features than the tree uses.
pub fn predict<T: RealNumber>(root: &TreeNode<T>, point: &Point<T>) -> Result<u8, TreeError> {
    root.predict(&point.features)
}

/// Decision Tree Classifier
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier<T: RealNumber> {
    root: Option<Box<TreeNode<T>>>,
    tree_params: TreeClassifierParams,
}

impl<T: RealNumber> Default for DecisionTreeClassifier<T> {
    /// Creates a new instance of the decision tree classifier with default parameters.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> ClassificationMetrics for DecisionTreeClassifier<T> {}

impl<T: RealNumber> DecisionTreeClassifier<T> {
    /// Creates a new instance of the decision tree classifier with default parameters.
    pub fn new() -> Self {
        Self {
            root: None,
            tree_params: TreeClassifierParams::new(),
        }
    }

    /// Creates a new instance of the decision tree classifier with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `max_depth` - The maximum depth of the tree, `None` for unbounded.
    /// * `split_search` - How to search for splits, parallel with two workers by default.
    ///
    /// An unbounded tree recurses once per level, and a parallel search starts
    /// its own worker threads at every internal node. Data that can only be
    /// peeled off one point per split therefore recurses as deep as it has
    /// points and starts that many thread pools; bound the depth or use
    /// [`SplitSearch::Sequential`] for such data.
    ///
    /// # Errors
    ///
    /// This method will return an error if a parallel search with zero workers is requested.
    pub fn with_params(
        max_depth: Option<u16>,
        split_search: Option<SplitSearch>,
    ) -> Result<Self, TreeError> {
        let mut tree = Self::new();

        tree.set_max_depth(max_depth);
        tree.set_split_search(split_search.unwrap_or_default())?;
        Ok(tree)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) {
        self.tree_params.set_max_depth(max_depth)
    }

    pub fn set_split_search(&mut self, split_search: SplitSearch) -> Result<(), TreeError> {
        self.tree_params.set_split_search(split_search)
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.tree_params.max_depth()
    }

    pub fn split_search(&self) -> SplitSearch {
        self.tree_params.split_search()
    }

    /// The trained tree, if `fit` has been called.
    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_deref()
    }

    /// Builds the decision tree from a dataset.
    ///
    /// # Arguments
    ///
    /// * `dataset` - The dataset containing features and labels.
    ///
    /// # Returns
    ///
    /// A string indicating that the tree was built successfully.
    ///
    /// # Errors
    ///
    /// This method will return an error if the dataset is empty or the
    /// split workers can't be started.
    pub fn fit(&mut self, dataset: &Dataset<T>) -> Result<String, TreeError> {
        if dataset.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let root = self
            .build_tree(dataset.clone(), self.max_depth())?
            .ok_or(TreeError::EmptyPartition)?;
        info!(
            samples = dataset.nrows(),
            features = dataset.dimension(),
            depth = root.depth(),
            leaves = root.num_leaves(),
            "Finished building the tree"
        );
        self.root = Some(Box::new(root));
        Ok("Finished building the tree.".into())
    }

    /// Predicts the labels for new data.
    ///
    /// # Arguments
    ///
    /// * `prediction_features` - The matrix of features, one row per point.
    ///
    /// # Returns
    ///
    /// A vector containing the predicted labels.
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree wasn't built yet or a
    /// row is too short for the tree.
    pub fn predict(&self, prediction_features: &DMatrix<T>) -> Result<DVector<u8>, TreeError> {
        let root = self.root.as_ref().ok_or(TreeError::NotFitted)?;
        let predictions = prediction_features
            .row_iter()
            .map(|row| root.predict(&row.transpose()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DVector::from_vec(predictions))
    }

    /// Predicts the label of a single point.
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree wasn't built yet or the
    /// point is too short for the tree.
    pub fn predict_point(&self, point: &Point<T>) -> Result<u8, TreeError> {
        let root = self.root.as_ref().ok_or(TreeError::NotFitted)?;
        predict(root, point)
    }

    /// Grows the subtree for `dataset`, which this call owns.
    ///
    /// Returns `Ok(None)` for an empty dataset; a parent never asks for one.
    fn build_tree(
        &self,
        dataset: Dataset<T>,
        depth_left: Option<u16>,
    ) -> Result<Option<TreeNode<T>>, TreeError> {
        if dataset.is_empty() {
            return Ok(None);
        }

        let counts = dataset.class_counts();
        if let Some(label) = counts.pure_label() {
            return Ok(Some(TreeNode::leaf(label)));
        }
        if depth_left == Some(0) {
            debug!(samples = dataset.nrows(), "depth exhausted, making leaf");
            return Ok(Some(TreeNode::leaf(counts.majority())));
        }

        let best_split = match self.split_search().find(&dataset)? {
            Some(split) => split,
            None => {
                debug!(samples = dataset.nrows(), "no split candidate, making leaf");
                return Ok(Some(TreeNode::leaf(counts.majority())));
            }
        };

        let (left_child, right_child) =
            dataset.split_on_threshold(best_split.feature_index, best_split.threshold)?;
        drop(dataset);

        debug!(
            feature = best_split.feature_index,
            threshold = %best_split.threshold,
            impurity = best_split.impurity,
            left = left_child.nrows(),
            right = right_child.nrows(),
            "splitting node"
        );
        let new_depth = depth_left.map(|depth| depth - 1);
        let left_node = self
            .build_tree(left_child, new_depth)?
            .ok_or(TreeError::EmptyPartition)?;
        let right_node = self
            .build_tree(right_child, new_depth)?
            .ok_or(TreeError::EmptyPartition)?;

        Ok(Some(TreeNode::internal(
            best_split.feature_index,
            best_split.threshold,
            left_node,
            right_node,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn reference_points() -> Vec<Point<f64>> {
        [
            ([1.0, 2.0], 0),
            ([2.0, 1.0], 0),
            ([2.0, 3.0], 0),
            ([3.0, 2.0], 0),
            ([5.0, 3.0], 1),
            ([6.0, 3.0], 1),
            ([7.0, 1.0], 1),
            ([8.0, 2.0], 1),
        ]
        .into_iter()
        .map(|(features, label)| Point::new(DVector::from_row_slice(&features), label))
        .collect()
    }

    fn reference_dataset() -> Dataset<f64> {
        Dataset::from_points(reference_points()).unwrap()
    }

    #[test]
    fn test_build_tree_on_reference_dataset() {
        let root = build_tree(&reference_dataset(), 2).unwrap();

        match &root {
            TreeNode::Internal {
                feature_index,
                threshold,
                left,
                right,
            } => {
                assert_eq!(*feature_index, 0);
                assert!(*threshold >= 3.0 && *threshold < 5.0);
                assert_eq!(left.label(), Some(0));
                assert_eq!(right.label(), Some(1));
            }
            TreeNode::Leaf { .. } => panic!("expected the root to split"),
        }

        for point in reference_points() {
            assert_eq!(predict(&root, &point).unwrap(), point.label);
        }
    }

    #[test]
    fn test_predict_is_idempotent() {
        let root = build_tree(&reference_dataset(), 3).unwrap();
        let point = Point::new(DVector::from_vec(vec![4.0, 2.0]), 0);
        let first = predict(&root, &point).unwrap();
        assert_eq!(predict(&root, &point).unwrap(), first);
        assert_eq!(root, build_tree(&reference_dataset(), 3).unwrap());
    }

    #[test]
    fn test_pure_dataset_gives_single_leaf() {
        for label in [0, 1] {
            let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
            let dataset = Dataset::new(x, DVector::from_element(3, label)).unwrap();
            for depth in [0, 1, 5] {
                assert_eq!(build_tree(&dataset, depth).unwrap(), TreeNode::leaf(label));
            }
        }
    }

    #[test]
    fn test_zero_depth_gives_majority_leaf() {
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let dataset = Dataset::new(x, DVector::from_vec(vec![1, 0, 1])).unwrap();
        assert_eq!(build_tree(&dataset, 0).unwrap(), TreeNode::leaf(1));

        let tied = Dataset::new(
            DMatrix::from_row_slice(2, 1, &[1.0, 2.0]),
            DVector::from_vec(vec![1, 0]),
        )
        .unwrap();
        assert_eq!(build_tree(&tied, 0).unwrap(), TreeNode::leaf(0));
        assert_eq!(build_tree(&reference_dataset(), 0).unwrap(), TreeNode::leaf(0));
    }

    #[test]
    fn test_depth_is_respected() {
        let mut rng = StdRng::seed_from_u64(3);
        let x = DMatrix::from_fn(40, 3, |_, _| rng.gen_range(0.0..10.0));
        let y = DVector::from_fn(40, |_, _| rng.gen_range(0..2u8));
        let dataset = Dataset::new(x, y).unwrap();

        for depth in 0..4 {
            let root = build_tree(&dataset, depth).unwrap();
            assert!(root.depth() <= usize::from(depth));
        }
    }

    #[test]
    fn test_unbounded_tree_fits_training_data() {
        let mut rng = StdRng::seed_from_u64(11);
        let x = DMatrix::from_fn(30, 2, |_, _| rng.gen_range(0.0..100.0));
        let y = DVector::from_fn(30, |_, _| rng.gen_range(0..2u8));
        let dataset = Dataset::new(x, y).unwrap();

        let mut classifier = DecisionTreeClassifier::with_params(None, None).unwrap();
        classifier.fit(&dataset).unwrap();
        let predictions = classifier.predict(dataset.x()).unwrap();
        assert_eq!(&predictions, dataset.y());
    }

    #[test]
    fn test_conflicting_duplicates_give_majority_leaf() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let y = DVector::from_vec(vec![1, 0, 1]);
        let dataset = Dataset::new(x, y).unwrap();

        assert_eq!(build_tree(&dataset, 4).unwrap(), TreeNode::leaf(1));
    }

    #[test]
    fn test_tree_does_not_depend_on_row_order() {
        let xor = |rows: &[([f64; 2], u8)]| {
            let points = rows
                .iter()
                .map(|(features, label)| Point::new(DVector::from_row_slice(features), *label))
                .collect();
            Dataset::from_points(points).unwrap()
        };
        let ordered = xor(&[([0.0, 0.0], 0), ([0.0, 1.0], 1), ([1.0, 0.0], 1), ([1.0, 1.0], 0)]);
        let max_first = xor(&[([1.0, 1.0], 0), ([0.0, 0.0], 0), ([0.0, 1.0], 1), ([1.0, 0.0], 1)]);

        let ordered_root = build_tree(&ordered, 2).unwrap();
        let max_first_root = build_tree(&max_first, 2).unwrap();
        assert_eq!(ordered_root.depth(), 2);
        assert_eq!(ordered_root.num_leaves(), 4);
        assert_eq!(max_first_root, ordered_root);

        for point in max_first.points() {
            assert_eq!(predict(&max_first_root, &point).unwrap(), point.label);
        }
    }

    #[test]
    fn test_sequential_and_parallel_build_same_tree() {
        let mut rng = StdRng::seed_from_u64(5);
        let x = DMatrix::from_fn(50, 4, |_, _| rng.gen_range(0..8) as f64);
        let y = DVector::from_fn(50, |_, _| rng.gen_range(0..2u8));
        let dataset = Dataset::new(x, y).unwrap();

        let mut sequential =
            DecisionTreeClassifier::with_params(Some(4), Some(SplitSearch::Sequential)).unwrap();
        sequential.fit(&dataset).unwrap();
        for workers in 1..=4 {
            let mut parallel = DecisionTreeClassifier::with_params(
                Some(4),
                Some(SplitSearch::Parallel { workers }),
            )
            .unwrap();
            parallel.fit(&dataset).unwrap();
            assert_eq!(parallel.root(), sequential.root());
        }
    }

    #[test]
    fn test_fit_rejects_empty_dataset() {
        let dataset = Dataset::<f64>::new(DMatrix::zeros(0, 2), DVector::zeros(0)).unwrap();
        let mut classifier = DecisionTreeClassifier::new();
        assert!(matches!(classifier.fit(&dataset), Err(TreeError::EmptyDataset)));
    }

    #[test]
    fn test_predict_before_fit() {
        let classifier: DecisionTreeClassifier<f64> = DecisionTreeClassifier::new();
        assert!(matches!(
            classifier.predict(&DMatrix::zeros(1, 2)),
            Err(TreeError::NotFitted)
        ));
        let point = Point::new(DVector::from_vec(vec![1.0, 2.0]), 0);
        assert!(matches!(
            classifier.predict_point(&point),
            Err(TreeError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_and_predict_matrix() {
        let dataset = reference_dataset();
        let mut classifier = DecisionTreeClassifier::with_params(Some(2), None).unwrap();
        classifier.fit(&dataset).unwrap();

        let test_x = DMatrix::from_row_slice(2, 2, &[0.5, 9.0, 9.0, 0.5]);
        let predictions = classifier.predict(&test_x).unwrap();
        assert_eq!(predictions, DVector::from_vec(vec![0, 1]));

        let accuracy = classifier
            .accuracy(dataset.y(), &classifier.predict(dataset.x()).unwrap())
            .unwrap();
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn test_with_params_rejects_zero_workers() {
        let result = DecisionTreeClassifier::<f64>::with_params(
            Some(2),
            Some(SplitSearch::Parallel { workers: 0 }),
        );
        assert!(result.is_err());
    }
}
