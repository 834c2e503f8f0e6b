//! Regression tree (CART with squared-error splits)

use crate::data::Dataset;
use crate::error::{CatalogError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node; children are indices into the tree's node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Sum of squared errors of both children
    children_sse: f64,
}

/// Decision Tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    nodes: Vec<TreeNode>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Train on every sample of the dataset
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        self.fit_indices(dataset, &indices)
    }

    /// Train on the given rows; repeated indices weigh a row more
    pub fn fit_indices(&mut self, dataset: &Dataset, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Err(CatalogError::empty("cannot fit a tree on zero samples"));
        }

        self.n_features = dataset.n_features();
        self.feature_importances = vec![0.0; self.n_features];
        self.nodes.clear();

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut feature_order: Vec<usize> = (0..self.n_features).collect();

        // Nodes are grown from an explicit stack; deep trees would otherwise
        // recurse once per level.
        self.nodes.push(TreeNode::Leaf {
            value: 0.0,
            n_samples: 0,
        });
        let mut stack = vec![(0usize, indices.to_vec(), 0usize)];

        while let Some((node_id, node_indices, depth)) = stack.pop() {
            let n = node_indices.len();
            let (sum, sum_sq) = node_indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
                let y = dataset.labels[i];
                (s + y, sq + y * y)
            });
            let mean = sum / n as f64;
            let sse = (sum_sq - sum * sum / n as f64).max(0.0);
            let impurity = sse / n as f64;

            let depth_reached = self.config.max_depth.map_or(false, |max| depth >= max);
            let can_split = !depth_reached
                && n >= self.config.min_samples_split
                && n >= 2 * self.config.min_samples_leaf
                && impurity > 1e-12;

            let candidate = if can_split {
                feature_order.shuffle(&mut rng);
                self.find_best_split(dataset, &node_indices, &feature_order)
            } else {
                None
            };

            let Some(split) = candidate else {
                self.nodes[node_id] = TreeNode::Leaf {
                    value: mean,
                    n_samples: n,
                };
                continue;
            };

            self.feature_importances[split.feature] += (sse - split.children_sse).max(0.0);

            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = node_indices
                .iter()
                .partition(|&&i| dataset.features[i][split.feature] <= split.threshold);

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(TreeNode::Leaf {
                value: 0.0,
                n_samples: 0,
            });
            self.nodes.push(TreeNode::Leaf {
                value: 0.0,
                n_samples: 0,
            });

            self.nodes[node_id] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
                n_samples: n,
                impurity,
            };

            stack.push((right, right_indices, depth + 1));
            stack.push((left, left_indices, depth + 1));
        }

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        Ok(())
    }

    /// Find the split minimizing the children's squared error
    ///
    /// Features are visited in `feature_order`; constant features do not
    /// count toward `max_features`.
    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        feature_order: &[usize],
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let max_features = self
            .config
            .max_features
            .unwrap_or(self.n_features)
            .clamp(1, self.n_features.max(1));
        let min_leaf = self.config.min_samples_leaf.max(1);

        let sum_sq: f64 = indices.iter().map(|&i| dataset.labels[i].powi(2)).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut best_score = f64::NEG_INFINITY;
        let mut visited = 0;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for &feature in feature_order {
            if visited >= max_features {
                break;
            }

            pairs.clear();
            pairs.extend(
                indices
                    .iter()
                    .map(|&i| (dataset.features[i][feature], dataset.labels[i])),
            );

            let first = pairs[0].0;
            if pairs.iter().all(|&(x, _)| x == first) {
                continue;
            }
            visited += 1;

            pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            let total: f64 = pairs.iter().map(|&(_, y)| y).sum();

            let mut left_sum = 0.0;
            for i in 0..n - 1 {
                left_sum += pairs[i].1;
                if pairs[i].0 == pairs[i + 1].0 {
                    continue;
                }

                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                // Maximizing this is the same as minimizing the children's SSE
                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;

                if score > best_score {
                    best_score = score;
                    let (lo, hi) = (pairs[i].0, pairs[i + 1].0);
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        children_sse: (sum_sq - score).max(0.0),
                    });
                }
            }
        }

        best
    }

    /// Predict for a single sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node_id = 0;
        loop {
            match self.nodes.get(node_id) {
                Some(TreeNode::Leaf { value, .. }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                }) => {
                    node_id = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => return 0.0,
            }
        }
    }

    /// Predict for multiple samples
    pub fn predict(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .features
            .iter()
            .map(|f| self.predict_one(f))
            .collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let TreeNode::Split { left, right, .. } = self.nodes[id] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }
}
