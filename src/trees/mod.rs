pub mod classifier;
pub mod impurity;
pub mod node;
pub mod params;
pub mod split;

pub use classifier::{build_tree, predict, DecisionTreeClassifier};
pub use node::TreeNode;
pub use split::{find_best_split, find_best_split_parallel, SplitCandidate, SplitSearch};
