//! Standard scaler for the numeric feature block.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Per-column zero-mean, unit-variance scaling.
///
/// Uses the population standard deviation. Constant columns get a scale of
/// 1.0 so they transform to 0.0 instead of NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on rows that all have the same width
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(PipelineError::EmptyCatalog);
        };
        let width = first.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(PipelineError::ShapeMismatch {
                expected: width,
                found: bad.len(),
            });
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (v - m).powi(2);
            }
        }

        let scale = variance
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON { std } else { 1.0 }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    /// Scale one row in place
    pub fn transform_in_place(&self, row: &mut [f64]) -> Result<()> {
        if row.len() != self.mean.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.mean.len(),
                found: row.len(),
            });
        }
        for ((v, m), s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
            *v = (*v - m) / s;
        }
        Ok(())
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}
