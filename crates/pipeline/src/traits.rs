//! Core traits for the rating pipeline.
//!
//! This module defines the Regressor trait so the trained pipeline can hold
//! any fitted estimator behind one seam.

/// A fitted regression model mapping one feature row to a rating.
///
/// ## Design Note
/// - `Send + Sync` lets a trained pipeline be shared across threads
/// - Implementations are immutable after fitting; `predict_row` takes `&self`
pub trait Regressor: Send + Sync + std::fmt::Debug {
    /// Returns the name of this model (for logging/debugging)
    fn name(&self) -> &str;

    /// Number of feature columns the model was fitted on
    fn n_features(&self) -> usize;

    /// Predict the target for a single feature row.
    ///
    /// # Arguments
    /// * `row` - One row in the training matrix's column layout
    fn predict_row(&self, row: &[f64]) -> f64;
}
