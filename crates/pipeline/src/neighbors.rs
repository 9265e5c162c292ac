//! Brute-force Euclidean nearest-neighbor index over the feature matrix.
//!
//! Neighbor order is fully deterministic: ascending distance, then the
//! query row itself (when querying by training row), then ascending row
//! index.

use crate::error::{PipelineError, Result};
use crate::features::FeatureMatrix;
use data_loader::RowIndex;
use std::cmp::Ordering;

/// One neighbor of a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: RowIndex,
    pub distance: f64,
}

/// Nearest-neighbor index. Owns the training matrix it was built over.
#[derive(Debug, Clone)]
pub struct NearestNeighbors {
    matrix: FeatureMatrix,
    n_neighbors: usize,
}

impl NearestNeighbors {
    /// Index `matrix`, returning `n_neighbors` results per query
    pub fn fit(matrix: FeatureMatrix, n_neighbors: usize) -> Result<Self> {
        if n_neighbors == 0 {
            return Err(PipelineError::Fit("n_neighbors must be at least 1".into()));
        }
        if matrix.shape().0 == 0 {
            return Err(PipelineError::EmptyCatalog);
        }
        Ok(Self {
            matrix,
            n_neighbors,
        })
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Neighbors of training row `row`, itself first at distance 0.
    ///
    /// Returns an empty list for an out-of-range row.
    pub fn kneighbors_of_row(&self, row: RowIndex) -> Vec<Neighbor> {
        if row >= self.matrix.shape().0 {
            return Vec::new();
        }
        self.search(self.matrix.row(row), Some(row))
    }

    /// Neighbors of an arbitrary point in the training layout
    pub fn kneighbors(&self, point: &[f64]) -> Result<Vec<Neighbor>> {
        let width = self.matrix.shape().1;
        if point.len() != width {
            return Err(PipelineError::ShapeMismatch {
                expected: width,
                found: point.len(),
            });
        }
        Ok(self.search(point, None))
    }

    fn search(&self, point: &[f64], self_row: Option<RowIndex>) -> Vec<Neighbor> {
        let mut scored: Vec<(f64, RowIndex)> = self
            .matrix
            .rows()
            .enumerate()
            .map(|(i, row)| (squared_distance(point, row), i))
            .collect();

        let is_self = |i: RowIndex| self_row == Some(i);
        scored.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| match (is_self(a.1), is_self(b.1)) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
                .then_with(|| a.1.cmp(&b.1))
        });

        scored
            .into_iter()
            .take(self.n_neighbors)
            .map(|(d, row)| Neighbor {
                row,
                distance: d.sqrt(),
            })
            .collect()
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
