//! Error types for the pipeline crate.

use thiserror::Error;

/// Errors raised while fitting the pipeline or answering a query.
///
/// `InvalidQuery` is the only error a query can produce; everything else
/// comes out of the one-time fit step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A mandatory argument to `predict_rating` was missing or empty
    #[error("Invalid query: {argument} must be provided and non-empty")]
    InvalidQuery { argument: &'static str },

    /// Cannot fit anything on zero records
    #[error("Cannot fit the pipeline on an empty catalog")]
    EmptyCatalog,

    /// A feature row or matrix did not match the fitted layout
    #[error("Shape mismatch: expected {expected} columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Model fitting failed
    #[error("Fit failed: {0}")]
    Fit(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
