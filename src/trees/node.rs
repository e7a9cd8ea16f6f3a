use nalgebra::DVector;

use crate::data::dataset::{goes_left, RealNumber};
use crate::error::TreeError;

/// Decision tree node
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode<T: RealNumber> {
    Leaf {
        label: u8,
    },
    /// Points with `features[feature_index] < threshold + tolerance` go left.
    Internal {
        feature_index: usize,
        threshold: T,
        left: Box<TreeNode<T>>,
        right: Box<TreeNode<T>>,
    },
}

impl<T: RealNumber> TreeNode<T> {
    pub fn leaf(label: u8) -> Self {
        TreeNode::Leaf { label }
    }

    pub fn internal(feature_index: usize, threshold: T, left: Self, right: Self) -> Self {
        TreeNode::Internal {
            feature_index,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// The label of a leaf, `None` for an internal node.
    pub fn label(&self) -> Option<u8> {
        match self {
            TreeNode::Leaf { label } => Some(*label),
            TreeNode::Internal { .. } => None,
        }
    }

    /// Number of edges on the longest path from this node to a leaf.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn num_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => 1 + left.num_nodes() + right.num_nodes(),
        }
    }

    /// Walks from this node to a leaf and returns its label.
    ///
    /// # Errors
    ///
    /// Returns an error if `features` is too short for a feature index on the
    /// path.
    pub fn predict(&self, features: &DVector<T>) -> Result<u8, TreeError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { label } => return Ok(*label),
                TreeNode::Internal {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature_index).ok_or(TreeError::DimensionMismatch {
                        expected: feature_index + 1,
                        found: features.len(),
                    })?;
                    node = if goes_left(*value, *threshold) {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> TreeNode<f64> {
        TreeNode::internal(1, 2.5, TreeNode::leaf(0), TreeNode::leaf(1))
    }

    #[test]
    fn test_leaf_predicts_its_label() {
        let leaf: TreeNode<f64> = TreeNode::leaf(1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.label(), Some(1));
        assert_eq!(leaf.predict(&DVector::from_vec(vec![])).unwrap(), 1);
    }

    #[test]
    fn test_internal_node_routes_on_threshold() {
        let tree = stump();
        assert!(!tree.is_leaf());
        assert_eq!(tree.label(), None);
        assert_eq!(tree.predict(&DVector::from_vec(vec![9.0, 1.0])).unwrap(), 0);
        assert_eq!(tree.predict(&DVector::from_vec(vec![9.0, 2.5])).unwrap(), 0);
        assert_eq!(tree.predict(&DVector::from_vec(vec![0.0, 2.6])).unwrap(), 1);
    }

    #[test]
    fn test_predict_rejects_short_feature_vector() {
        let tree = stump();
        assert!(matches!(
            tree.predict(&DVector::from_vec(vec![1.0])),
            Err(TreeError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_tree_shape() {
        let tree = TreeNode::internal(0, 1.0, stump(), TreeNode::leaf(1));
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.num_nodes(), 5);
        assert_eq!(TreeNode::<f64>::leaf(0).depth(), 0);
    }
}
