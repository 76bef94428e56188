//! CART (Classification and Regression Tree) builder
//!
//! Grows one regression tree on gradient/hessian statistics. Features are
//! bucketed once per training run ([`BinnedFeatures`]); split search then
//! sweeps per-node histograms, which keeps every node linear in its rows.

use eshop_forecast_core::{FeatureMatrix, Node, Tree};

use crate::deterministic::SplitTieBreaker;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Leaf outputs are clamped to `[-max_leaf_output, max_leaf_output]`
    pub max_leaf_output: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_leaf: 10,
            max_leaf_output: 100.0,
        }
    }
}

/// Per-feature bin upper bounds
///
/// Bin `k` of a feature holds values in `(bounds[k - 1], bounds[k]]`.
/// Non-finite values go to an extra trailing bin that always sits on the
/// right of a split, matching how trees route NaN at scoring time.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureBins {
    upper_bounds: Vec<Vec<f64>>,
}

impl FeatureBins {
    /// Derive bounds from the distinct values of each feature
    ///
    /// Features with more than `max_bins` distinct values get rank-spaced
    /// quantile bounds instead.
    pub fn build(features: &FeatureMatrix, max_bins: usize) -> Self {
        let max_bins = max_bins.max(2);
        let upper_bounds = (0..features.n_features)
            .map(|f| {
                let mut values: Vec<f64> = (0..features.n_rows)
                    .map(|r| features.get(r, f))
                    .filter(|v| v.is_finite())
                    .collect();
                values.sort_by(f64::total_cmp);
                values.dedup();

                let m = values.len();
                if m <= max_bins {
                    return values;
                }

                let mut bounds: Vec<f64> = (0..max_bins)
                    .map(|i| values[((i + 1) * m) / max_bins - 1])
                    .collect();
                bounds.dedup();
                bounds
            })
            .collect();

        Self { upper_bounds }
    }

    pub fn n_features(&self) -> usize {
        self.upper_bounds.len()
    }

    /// Number of value bins of a feature (excluding the non-finite bin)
    pub fn num_bins(&self, feature: usize) -> usize {
        self.upper_bounds[feature].len()
    }

    pub fn bin_of(&self, feature: usize, value: f64) -> usize {
        let bounds = &self.upper_bounds[feature];
        if !value.is_finite() {
            return bounds.len();
        }
        bounds.partition_point(|&b| b < value).min(bounds.len())
    }

    /// Split threshold that sends bins `0..=bin` left
    pub fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.upper_bounds[feature][bin]
    }
}

/// Feature matrix with every value replaced by its bin index
#[derive(Clone, Debug)]
pub struct BinnedFeatures {
    pub bins: FeatureBins,
    codes: Vec<u32>,
    n_rows: usize,
    n_features: usize,
}

impl BinnedFeatures {
    pub fn new(features: &FeatureMatrix, max_bins: usize) -> Self {
        let bins = FeatureBins::build(features, max_bins);
        let mut codes = Vec::with_capacity(features.n_rows * features.n_features);
        for r in 0..features.n_rows {
            for f in 0..features.n_features {
                codes.push(bins.bin_of(f, features.get(r, f)) as u32);
            }
        }

        Self {
            bins,
            codes,
            n_rows: features.n_rows,
            n_features: features.n_features,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn code(&self, row: usize, feature: usize) -> usize {
        self.codes[row * self.n_features + feature] as usize
    }
}

/// Gradient and hessian totals over a set of rows
#[derive(Clone, Copy, Debug, Default)]
struct GradStats {
    grad: f64,
    hess: f64,
    count: usize,
}

impl GradStats {
    fn add(&mut self, grad: f64, hess: f64) {
        self.grad += grad;
        self.hess += hess;
        self.count += 1;
    }

    fn minus(self, other: GradStats) -> GradStats {
        GradStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }

    /// G²/H, the structure score of a node
    fn score(self) -> f64 {
        if self.hess > 0.0 {
            self.grad * self.grad / self.hess
        } else {
            0.0
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    bin: usize,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, bin: usize, gain: f64, node_id: usize) -> Self {
        Self {
            feature_idx,
            bin,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, bin, node_id),
        }
    }

    fn beats(&self, current: &SplitCandidate) -> bool {
        self.gain > current.gain
            || (self.gain == current.gain && self.tie_breaker < current.tie_breaker)
    }
}

/// Build a regression tree from gradient statistics
pub struct CartBuilder<'a> {
    config: TreeConfig,
    binned: &'a BinnedFeatures,
    gradients: &'a [f64],
    hessians: &'a [f64],
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        binned: &'a BinnedFeatures,
        gradients: &'a [f64],
        hessians: &'a [f64],
        config: TreeConfig,
    ) -> Self {
        assert_eq!(binned.n_rows(), gradients.len());
        assert_eq!(binned.n_rows(), hessians.len());

        Self {
            config,
            binned,
            gradients,
            hessians,
        }
    }

    /// Grow a tree over all rows
    pub fn build(&self) -> Tree {
        let indices: Vec<usize> = (0..self.binned.n_rows()).collect();
        self.build_on(&indices)
    }

    /// Grow a tree over a subset of rows
    pub fn build_on(&self, indices: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices, 0, &mut nodes, 0);
        Tree::new(nodes, 1.0)
    }

    /// Recursively build tree nodes
    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        node_id: usize,
    ) -> i32 {
        let current_idx = nodes.len();
        let stats = self.sum_stats(indices);
        let leaf_value = self.leaf_value(stats);

        if depth >= self.config.max_depth || indices.len() < 2 * self.config.min_samples_leaf.max(1)
        {
            nodes.push(Node::leaf(current_idx as i32, leaf_value));
            return current_idx as i32;
        }

        let Some(split) = self.find_best_split(indices, stats, node_id) else {
            nodes.push(Node::leaf(current_idx as i32, leaf_value));
            return current_idx as i32;
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.bin);

        // Reserve space for current node
        nodes.push(Node::internal(
            current_idx as i32,
            split.feature_idx as i32,
            self.binned.bins.threshold(split.feature_idx, split.bin),
            0,
            0,
        ));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, node_id * 2 + 1);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, node_id * 2 + 2);

        nodes[current_idx].left = left_idx;
        nodes[current_idx].right = right_idx;

        current_idx as i32
    }

    /// Best positive-gain split honoring `min_samples_leaf` on both sides
    fn find_best_split(
        &self,
        indices: &[usize],
        parent: GradStats,
        node_id: usize,
    ) -> Option<SplitCandidate> {
        let min_leaf = self.config.min_samples_leaf.max(1);
        let parent_score = parent.score();
        let mut best_split: Option<SplitCandidate> = None;

        for feature_idx in 0..self.binned.n_features() {
            let num_bins = self.binned.bins.num_bins(feature_idx);
            if num_bins < 2 {
                continue;
            }

            let mut histogram = vec![GradStats::default(); num_bins + 1];
            for &row in indices {
                histogram[self.binned.code(row, feature_idx)]
                    .add(self.gradients[row], self.hessians[row]);
            }

            let mut left = GradStats::default();
            for (bin, bucket) in histogram.iter().enumerate().take(num_bins - 1) {
                left.grad += bucket.grad;
                left.hess += bucket.hess;
                left.count += bucket.count;

                if bucket.count == 0 {
                    continue;
                }
                let right = parent.minus(left);
                if left.count < min_leaf || right.count < min_leaf {
                    continue;
                }

                let gain = left.score() + right.score() - parent_score;
                if gain <= 0.0 || !gain.is_finite() {
                    continue;
                }

                let candidate = SplitCandidate::new(feature_idx, bin, gain, node_id);
                if best_split
                    .as_ref()
                    .map_or(true, |current| candidate.beats(current))
                {
                    best_split = Some(candidate);
                }
            }
        }

        best_split
    }

    /// Split samples: bins `0..=bin` go left
    fn split_samples(&self, indices: &[usize], feature_idx: usize, bin: usize) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .copied()
            .partition(|&row| self.binned.code(row, feature_idx) <= bin)
    }

    fn sum_stats(&self, indices: &[usize]) -> GradStats {
        let mut stats = GradStats::default();
        for &idx in indices {
            stats.add(self.gradients[idx], self.hessians[idx]);
        }
        stats
    }

    /// Optimal leaf value: -G/H
    fn leaf_value(&self, stats: GradStats) -> f64 {
        if stats.hess <= 0.0 {
            return 0.0;
        }
        let limit = self.config.max_leaf_output;
        (-stats.grad / stats.hess).clamp(-limit, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        let n_features = rows.first().map_or(0, |r| r.len());
        FeatureMatrix::new(
            rows.len(),
            n_features,
            rows.iter().flat_map(|r| r.iter().copied()).collect(),
        )
    }

    #[test]
    fn test_bins_from_distinct_values() {
        let m = matrix(&[&[3.0], &[1.0], &[3.0], &[2.0]]);
        let bins = FeatureBins::build(&m, 255);

        assert_eq!(bins.num_bins(0), 3);
        assert_eq!(bins.bin_of(0, 1.0), 0);
        assert_eq!(bins.bin_of(0, 1.5), 1);
        assert_eq!(bins.bin_of(0, 3.0), 2);
        assert_eq!(bins.bin_of(0, 99.0), 3);
        assert_eq!(bins.bin_of(0, f64::NAN), 3);
        assert_eq!(bins.threshold(0, 1), 2.0);
    }

    #[test]
    fn test_bins_are_capped() {
        let rows: Vec<Vec<f64>> = (0..1000).map(|i| vec![i as f64]).collect();
        let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        let bins = FeatureBins::build(&matrix(&refs), 16);

        assert_eq!(bins.num_bins(0), 16);
        assert_eq!(bins.threshold(0, 15), 999.0);
    }

    #[test]
    fn test_simple_tree() {
        let m = matrix(&[&[1.0, 5.0], &[2.0, 5.0], &[3.0, 5.0], &[4.0, 5.0]]);
        let binned = BinnedFeatures::new(&m, 255);
        let gradients = vec![-1.0, -1.0, 1.0, 1.0];
        let hessians = vec![1.0; 4];

        let config = TreeConfig {
            max_depth: 2,
            min_samples_leaf: 1,
            max_leaf_output: 100.0,
        };
        let tree = CartBuilder::new(&binned, &gradients, &hessians, config).build();

        assert!(tree.validate(2).is_ok());
        assert_eq!(tree.nodes[0].feature_idx, 0);
        assert_eq!(tree.nodes[0].threshold, 2.0);
        assert_eq!(tree.evaluate(&[1.5, 5.0]), 1.0);
        assert_eq!(tree.evaluate(&[3.5, 5.0]), -1.0);
    }

    #[test]
    fn test_leaf_only_tree() {
        let m = matrix(&[&[1.0]]);
        let binned = BinnedFeatures::new(&m, 255);
        let tree = CartBuilder::new(&binned, &[-1.0], &[1.0], TreeConfig::default()).build();

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].leaf, Some(1.0));
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        let binned = BinnedFeatures::new(&matrix(&refs), 255);
        let gradients: Vec<f64> = (0..20).map(|i| if i < 2 { -10.0 } else { 1.0 }).collect();
        let hessians = vec![1.0; 20];

        let config = TreeConfig {
            max_depth: 1,
            min_samples_leaf: 5,
            max_leaf_output: 100.0,
        };
        let tree = CartBuilder::new(&binned, &gradients, &hessians, config).build();

        // Best unconstrained split isolates 2 rows; it must settle for 5.
        assert_eq!(tree.nodes[0].threshold, 4.0);
    }

    #[test]
    fn test_leaf_output_clamped() {
        let m = matrix(&[&[1.0]]);
        let binned = BinnedFeatures::new(&m, 255);
        let config = TreeConfig {
            max_leaf_output: 0.5,
            ..TreeConfig::default()
        };
        let tree = CartBuilder::new(&binned, &[-10.0], &[1.0], config).build();
        assert_eq!(tree.nodes[0].leaf, Some(0.5));
    }

    #[test]
    fn test_equal_gain_prefers_lower_feature() {
        // Both features separate the rows identically.
        let m = matrix(&[&[1.0, 1.0], &[1.0, 1.0], &[2.0, 2.0], &[2.0, 2.0]]);
        let binned = BinnedFeatures::new(&m, 255);
        let gradients = vec![-1.0, -1.0, 1.0, 1.0];
        let hessians = vec![1.0; 4];
        let config = TreeConfig {
            max_depth: 1,
            min_samples_leaf: 1,
            max_leaf_output: 100.0,
        };

        let tree = CartBuilder::new(&binned, &gradients, &hessians, config).build();
        assert_eq!(tree.nodes[0].feature_idx, 0);
    }
}
