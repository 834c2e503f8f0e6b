//! Machine learning models module
//!
//! Provides a regression tree and the bagged Random Forest built from it.

mod decision_tree;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use random_forest::{ForestConfig, RandomForest};
