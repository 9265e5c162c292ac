//! # Data Loader Crate
//!
//! This crate loads and cleans the film catalog (an IMDB top-1000 style CSV).
//!
//! ## Main Components
//!
//! - **types**: Core domain types (FilmRecord, Catalog, NumericMedians)
//! - **parser**: Parse CSV rows and clean each column independently
//! - **index**: Impute column-wide statistics, build the title index, validate
//! - **stats**: Median/mean helpers shared with the pipeline crate
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_csv(Path::new("data/imdb_top_1000.csv"))?;
//!
//! let rows = catalog.rows_for_title("The Godfather");
//! let medians = catalog.medians();
//! println!("{} films, median runtime {} min", catalog.len(), medians.runtime);
//! ```
//!
//! ## Cleaning rules
//!
//! No row is ever dropped. Year, runtime, votes and gross are cleaned per
//! cell; critic score (median) and rating (mean) are imputed per column
//! after every present value has been seen.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod stats;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::REQUIRED_COLUMNS;
pub use types::{Catalog, FilmRecord, NumericMedians, RowIndex};
