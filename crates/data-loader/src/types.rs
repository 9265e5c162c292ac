//! Core domain types for the film catalog.
//!
//! A `FilmRecord` is one fully cleaned row: every numeric field is finite and
//! no missing markers survive. The `Catalog` owns all records plus the
//! read-only lookups built from them (title index, column medians).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Position of a record in the catalog (and of its row in any feature matrix
/// built from the catalog)
pub type RowIndex = usize;

// =============================================================================
// Film Record
// =============================================================================

/// One cleaned catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    /// Unique, non-empty title used as the recommendation join key
    pub title: String,
    /// Director name, empty if the source cell was empty
    pub director: String,
    /// Genre labels in source order, empty only if the source cell was empty
    pub genres: Vec<String>,
    /// Up to four lead cast members, empty cells dropped
    pub stars: Vec<String>,
    /// Release year, 0 when unknown or unparseable
    pub released_year: i32,
    /// Runtime in minutes, 0 when the source text did not look like "<N> min"
    pub runtime: u32,
    /// Critic score on a 0-100 scale (imputed with the column median)
    pub meta_score: f64,
    /// Audience vote count
    pub votes: u64,
    /// Gross revenue, 0.0 if unavailable
    pub gross: f64,
    /// Target audience rating (imputed with the column mean)
    pub rating: f64,
}

// =============================================================================
// Column Medians
// =============================================================================

/// Per-column medians over the cleaned catalog.
///
/// Integer columns are truncated toward zero, matching the values a user
/// would see pre-filled in a numeric input widget.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericMedians {
    pub released_year: i32,
    pub runtime: u32,
    pub meta_score: f64,
    pub votes: u64,
    pub gross: f64,
}

// =============================================================================
// Catalog
// =============================================================================

/// The cleaned, in-memory film catalog.
///
/// Built once at startup and never mutated afterwards. Records keep the order
/// of the source file, which is also the row order of the feature matrix.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) records: Vec<FilmRecord>,
    /// Title -> every row carrying that title, in catalog order
    pub(crate) title_index: HashMap<String, Vec<RowIndex>>,
    pub(crate) medians: NumericMedians,
}

impl Catalog {
    /// All records in catalog order
    pub fn records(&self) -> &[FilmRecord] {
        &self.records
    }

    /// Get a record by row index
    pub fn get(&self, row: RowIndex) -> Option<&FilmRecord> {
        self.records.get(row)
    }

    /// Rows whose title matches exactly. Empty slice if the title is unknown.
    pub fn rows_for_title(&self, title: &str) -> &[RowIndex] {
        self.title_index
            .get(title)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.title_index.contains_key(title)
    }

    /// Titles in catalog order
    pub fn titles(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.title.as_str()).collect()
    }

    /// Sorted, de-duplicated director names (empty names excluded)
    pub fn directors(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.director.as_str())
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn medians(&self) -> &NumericMedians {
        &self.medians
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
