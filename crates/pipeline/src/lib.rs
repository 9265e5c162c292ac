//! Feature engineering, rating prediction and similarity recommendation.
//!
//! This crate provides:
//! - MultiLabelEncoder for genre and cast indicator vectors
//! - DirectorReputation for the per-director quality score
//! - FeatureAssembler, which scales the numeric block and lays out the
//!   feature matrix
//! - RandomForestRegressor for rating prediction
//! - NearestNeighbors for title similarity
//! - TrainedPipeline, the single immutable value holding all of the above
//!
//! ## Architecture
//! Data flows one way, once, at startup:
//! 1. Cleaned catalog -> encoders, reputation table, scaler
//! 2. Feature matrix -> random forest and neighbor index
//! 3. Queries reuse the fitted artifacts and never refit
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::Catalog;
//! use pipeline::{FilmQuery, PipelineConfig, TrainedPipeline};
//!
//! let catalog = Catalog::load_from_csv(path)?;
//! let pipeline = TrainedPipeline::fit(catalog, &PipelineConfig::default())?;
//!
//! let query = FilmQuery::new("Christopher Nolan", &["Drama", "Sci-Fi"], &["Christian Bale"])
//!     .with_released_year(2010);
//! let rating = pipeline.predict_rating(&query)?;
//!
//! let similar = pipeline.recommend(&["Inception"], 5);
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod forest;
pub mod neighbors;
pub mod reputation;
pub mod scaler;
pub mod traits;
pub mod trained;

// Re-export main types
pub use config::PipelineConfig;
pub use encoder::{MultiLabelEncoder, MultiLabelEncoderBuilder};
pub use error::{PipelineError, Result};
pub use features::{FeatureAssembler, FeatureLayout, FeatureMatrix, FilmQuery, NUMERIC_COLUMNS};
pub use forest::{FittedForest, RandomForestRegressor};
pub use neighbors::{NearestNeighbors, Neighbor};
pub use reputation::DirectorReputation;
pub use scaler::StandardScaler;
pub use traits::Regressor;
pub use trained::TrainedPipeline;
