//! Random forest regressor (bagged CART trees, MSE criterion).
//!
//! Every tree sees a bootstrap sample of the rows and considers all
//! features at every split. Tree `i` is seeded with `random_state + i` and
//! trees are collected in index order, so a fixed seed always yields the
//! same forest regardless of how rayon schedules the work.

use crate::error::{PipelineError, Result};
use crate::features::FeatureMatrix;
use crate::traits::Regressor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

/// Minimum reduction in squared error for a split to be worth taking
const MIN_GAIN: f64 = 1e-12;

// =============================================================================
// Tree nodes
// =============================================================================

#[derive(Debug, Clone)]
pub struct RegressionLeaf {
    /// Mean target of the training samples in this leaf
    pub value: f64,
    pub n_samples: usize,
}

#[derive(Debug, Clone)]
pub struct RegressionNode {
    pub feature_idx: usize,
    /// Samples with `x[feature_idx] <= threshold` go left
    pub threshold: f64,
    pub left: Box<RegressionTreeNode>,
    pub right: Box<RegressionTreeNode>,
}

#[derive(Debug, Clone)]
pub enum RegressionTreeNode {
    Node(RegressionNode),
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(split) => {
                    node = if row[split.feature_idx] <= split.threshold {
                        &split.left
                    } else {
                        &split.right
                    };
                }
            }
        }
    }
}

// =============================================================================
// Training data view
// =============================================================================

/// Column-major copy of the training matrix.
///
/// Split search scans one feature across many samples, so columns are kept
/// contiguous. Indicator columns (only 0.0/1.0) take an O(n) split path.
struct Columns {
    values: Vec<Vec<f64>>,
    binary: Vec<bool>,
}

impl Columns {
    fn from_matrix(x: &FeatureMatrix) -> Self {
        let (n_rows, n_cols) = x.shape();
        let values: Vec<Vec<f64>> = (0..n_cols)
            .map(|j| (0..n_rows).map(|i| x.get(i, j)).collect())
            .collect();
        let binary = values
            .iter()
            .map(|col| col.iter().all(|v| *v == 0.0 || *v == 1.0))
            .collect();
        Self { values, binary }
    }
}

#[derive(Debug, Clone, Copy)]
struct TreeParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

// =============================================================================
// Forest
// =============================================================================

/// Hyperparameters for a random forest. Call `fit` to train.
///
/// ```ignore
/// let forest = RandomForestRegressor::new(100)
///     .with_random_state(42)
///     .fit(&matrix, &ratings)?;
/// let rating = forest.predict_row(matrix.row(0));
/// ```
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    random_state: u64,
}

impl RandomForestRegressor {
    /// Creates a new Random Forest regressor.
    ///
    /// # Arguments
    ///
    /// * `n_estimators` - Number of trees in the forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: 0,
        }
    }

    /// Sets the maximum depth for each tree.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    /// Sets the base seed for bootstrap sampling.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Fits the forest on `x` against targets `y`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, mismatched lengths, non-finite
    /// targets or a zero-tree configuration.
    #[instrument(skip_all, fields(n_estimators = self.n_estimators))]
    pub fn fit(&self, x: &FeatureMatrix, y: &[f64]) -> Result<FittedForest> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err(PipelineError::EmptyCatalog);
        }
        if n_samples != y.len() {
            return Err(PipelineError::Fit(format!(
                "{} feature rows but {} targets",
                n_samples,
                y.len()
            )));
        }
        if self.n_estimators == 0 {
            return Err(PipelineError::Fit("n_estimators must be at least 1".into()));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::Fit("targets must be finite".into()));
        }

        let columns = Columns::from_matrix(x);
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split.max(2),
            min_samples_leaf: self.min_samples_leaf.max(1),
        };

        let trees: Vec<RegressionTreeNode> = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| {
                let seed = self.random_state.wrapping_add(i as u64);
                let samples = bootstrap_sample(n_samples, seed);
                let tree = build_tree(&columns, y, samples, 0, params);
                debug!(tree = i, depth = tree.depth(), "Tree fitted");
                tree
            })
            .collect();

        info!(trees = trees.len(), n_samples, n_features, "Random forest fitted");
        Ok(FittedForest { trees, n_features })
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

/// A trained forest. Immutable; predictions average every tree.
#[derive(Debug, Clone)]
pub struct FittedForest {
    trees: Vec<RegressionTreeNode>,
    n_features: usize,
}

impl FittedForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegressionTreeNode] {
        &self.trees
    }
}

impl Regressor for FittedForest {
    fn name(&self) -> &str {
        "RandomForestRegressor"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }
}

// =============================================================================
// Tree building
// =============================================================================

/// Draw `n_samples` row indices with replacement
fn bootstrap_sample(n_samples: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_samples)
        .map(|_| rng.random_range(0..n_samples))
        .collect()
}

fn make_leaf(y: &[f64], samples: &[usize]) -> RegressionTreeNode {
    let sum: f64 = samples.iter().map(|&s| y[s]).sum();
    RegressionTreeNode::Leaf(RegressionLeaf {
        value: sum / samples.len() as f64,
        n_samples: samples.len(),
    })
}

fn is_pure(y: &[f64], samples: &[usize]) -> bool {
    let first = y[samples[0]];
    samples.iter().all(|&s| (y[s] - first).abs() < 1e-12)
}

/// Build a regression tree recursively over `samples` (row indices, may
/// repeat).
fn build_tree(
    columns: &Columns,
    y: &[f64],
    samples: Vec<usize>,
    depth: usize,
    params: TreeParams,
) -> RegressionTreeNode {
    let n = samples.len();

    if n < params.min_samples_split
        || params.max_depth.is_some_and(|max| depth >= max)
        || is_pure(y, &samples)
    {
        return make_leaf(y, &samples);
    }

    let Some(split) = find_best_split(columns, y, &samples, params.min_samples_leaf) else {
        return make_leaf(y, &samples);
    };

    let column = &columns.values[split.feature_idx];
    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .iter()
        .partition(|&&s| column[s] <= split.threshold);
    if left.is_empty() || right.is_empty() {
        return make_leaf(y, &samples);
    }

    RegressionTreeNode::Node(RegressionNode {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        left: Box::new(build_tree(columns, y, left, depth + 1, params)),
        right: Box::new(build_tree(columns, y, right, depth + 1, params)),
    })
}

/// Find the split that most reduces the summed squared error.
///
/// Maximizing `sum_l^2 / n_l + sum_r^2 / n_r` is equivalent to minimizing
/// the weighted child variance. Features are scanned in column order and
/// only a strictly better gain replaces the current best, so ties resolve
/// to the lowest feature index and lowest threshold.
fn find_best_split(
    columns: &Columns,
    y: &[f64],
    samples: &[usize],
    min_samples_leaf: usize,
) -> Option<Split> {
    let n = samples.len();
    let total: f64 = samples.iter().map(|&s| y[s]).sum();
    let parent_score = total * total / n as f64;

    let mut best: Option<Split> = None;
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

    for (feature_idx, column) in columns.values.iter().enumerate() {
        let candidate = if columns.binary[feature_idx] {
            best_binary_split(column, y, samples, total, min_samples_leaf)
        } else {
            best_sorted_split(column, y, samples, total, min_samples_leaf, &mut pairs)
        };

        if let Some((threshold, score)) = candidate {
            let gain = score - parent_score;
            if gain > MIN_GAIN && best.is_none_or(|b| gain > b.gain) {
                best = Some(Split {
                    feature_idx,
                    threshold,
                    gain,
                });
            }
        }
    }
    best
}

/// Split an indicator column at 0.5. Returns (threshold, score).
fn best_binary_split(
    column: &[f64],
    y: &[f64],
    samples: &[usize],
    total: f64,
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let n = samples.len();
    let (mut n_right, mut sum_right) = (0usize, 0.0);
    for &s in samples {
        if column[s] > 0.5 {
            n_right += 1;
            sum_right += y[s];
        }
    }
    let n_left = n - n_right;
    if n_left < min_samples_leaf || n_right < min_samples_leaf {
        return None;
    }
    let sum_left = total - sum_right;
    let score = sum_left * sum_left / n_left as f64 + sum_right * sum_right / n_right as f64;
    Some((0.5, score))
}

/// Threshold between two distinct sorted values `lo < hi`.
///
/// For adjacent floats the midpoint rounds up to `hi`, which would send
/// every sample left; fall back to `lo` so `x <= threshold` still separates.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi { lo } else { mid }
}

/// Sweep all midpoints between consecutive distinct values.
fn best_sorted_split(
    column: &[f64],
    y: &[f64],
    samples: &[usize],
    total: f64,
    min_samples_leaf: usize,
    pairs: &mut Vec<(f64, f64)>,
) -> Option<(f64, f64)> {
    let n = samples.len();
    let first = column[samples[0]];
    if samples.iter().all(|&s| column[s] == first) {
        return None;
    }

    pairs.clear();
    pairs.extend(samples.iter().map(|&s| (column[s], y[s])));
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut best: Option<(f64, f64)> = None;
    let mut sum_left = 0.0;
    for i in 0..n - 1 {
        sum_left += pairs[i].1;
        if pairs[i].0 == pairs[i + 1].0 {
            continue;
        }
        let n_left = i + 1;
        let n_right = n - n_left;
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }
        let sum_right = total - sum_left;
        let score = sum_left * sum_left / n_left as f64 + sum_right * sum_right / n_right as f64;
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((midpoint(pairs[i].0, pairs[i + 1].0), score));
        }
    }
    best
}
