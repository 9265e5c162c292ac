//! Fit-time configuration.
//!
//! Defaults reproduce the reference setup: a 100-tree forest seeded with 42
//! and a 6-neighbor Euclidean index.

use serde::{Deserialize, Serialize};

/// Hyperparameters for `TrainedPipeline::fit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of trees in the forest (default: 100)
    pub n_estimators: usize,
    /// Base seed; tree `i` is bootstrapped with `random_state + i` (default: 42)
    pub random_state: u64,
    /// Maximum tree depth, `None` for unlimited
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node (default: 2)
    pub min_samples_split: usize,
    /// Minimum samples in each leaf (default: 1)
    pub min_samples_leaf: usize,
    /// Neighbors returned per query, the query row included (default: 6)
    pub n_neighbors: usize,
    /// Drop titles already recommended via an earlier liked title
    /// (default: false, duplicates are preserved)
    pub dedup_recommendations: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            random_state: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_neighbors: 6,
            dedup_recommendations: false,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the number of trees (default: 100)
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Configure the base random seed (default: 42)
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
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

    /// Configure neighbors per query (default: 6)
    pub fn with_n_neighbors(mut self, k: usize) -> Self {
        self.n_neighbors = k;
        self
    }

    pub fn with_dedup_recommendations(mut self, dedup: bool) -> Self {
        self.dedup_recommendations = dedup;
        self
    }
}
