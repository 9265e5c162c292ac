//! Feature assembly for training and for queries.
//!
//! Column layout (fixed; every consumer depends on it):
//!
//! ```text
//! [year, runtime, meta_score, votes, gross, director_reputation]  scaled
//! [genre indicators ...]                                           0/1
//! [cast indicators ...]                                            0/1
//! ```
//!
//! Only the six numeric columns pass through the scaler.

use crate::encoder::{MultiLabelEncoder, MultiLabelEncoderBuilder};
use crate::error::{PipelineError, Result};
use crate::reputation::DirectorReputation;
use crate::scaler::StandardScaler;
use data_loader::{Catalog, FilmRecord, NumericMedians};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info};

/// Names of the numeric block, in column order
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "released_year",
    "runtime",
    "meta_score",
    "votes",
    "gross",
    "director_reputation",
];

/// Width of the scaled numeric block
pub const NUMERIC_WIDTH: usize = NUMERIC_COLUMNS.len();

// =============================================================================
// Layout
// =============================================================================

/// Column partition boundaries of the feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub n_genres: usize,
    pub n_stars: usize,
}

impl FeatureLayout {
    pub fn numeric(&self) -> Range<usize> {
        0..NUMERIC_WIDTH
    }

    pub fn genres(&self) -> Range<usize> {
        NUMERIC_WIDTH..NUMERIC_WIDTH + self.n_genres
    }

    pub fn stars(&self) -> Range<usize> {
        let start = NUMERIC_WIDTH + self.n_genres;
        start..start + self.n_stars
    }

    /// Total number of columns
    pub fn width(&self) -> usize {
        NUMERIC_WIDTH + self.n_genres + self.n_stars
    }
}

// =============================================================================
// Feature Matrix
// =============================================================================

/// Dense row-major matrix, one row per catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build from rows that all have width `n_cols`
    pub fn from_rows(rows: Vec<Vec<f64>>, n_cols: usize) -> Result<Self> {
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(PipelineError::ShapeMismatch {
                    expected: n_cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_cols.max(1)).take(self.n_rows)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }
}

// =============================================================================
// Query
// =============================================================================

/// A partially specified film, as supplied to `predict_rating`.
///
/// `None` means "use the training median". An explicit `Some(0)` is kept as
/// a genuine zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmQuery {
    pub director: String,
    pub genres: Vec<String>,
    pub stars: Vec<String>,
    pub released_year: Option<i32>,
    pub runtime: Option<u32>,
    pub meta_score: Option<f64>,
    pub votes: Option<u64>,
    pub gross: Option<f64>,
}

impl FilmQuery {
    pub fn new<D, G, S>(director: D, genres: &[G], stars: &[S]) -> Self
    where
        D: Into<String>,
        G: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            director: director.into(),
            genres: genres.iter().map(|g| g.as_ref().to_string()).collect(),
            stars: stars.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_released_year(mut self, year: i32) -> Self {
        self.released_year = Some(year);
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime = Some(minutes);
        self
    }

    pub fn with_meta_score(mut self, score: f64) -> Self {
        self.meta_score = Some(score);
        self
    }

    pub fn with_votes(mut self, votes: u64) -> Self {
        self.votes = Some(votes);
        self
    }

    pub fn with_gross(mut self, gross: f64) -> Self {
        self.gross = Some(gross);
        self
    }

    /// Check the mandatory arguments, naming the first one that is missing
    pub fn validate(&self) -> Result<()> {
        if self.director.trim().is_empty() {
            return Err(PipelineError::InvalidQuery {
                argument: "director",
            });
        }
        if all_blank(&self.genres) {
            return Err(PipelineError::InvalidQuery { argument: "genres" });
        }
        if all_blank(&self.stars) {
            return Err(PipelineError::InvalidQuery { argument: "stars" });
        }
        Ok(())
    }
}

fn all_blank(labels: &[String]) -> bool {
    labels.iter().all(|l| l.trim().is_empty())
}

// =============================================================================
// Assembler
// =============================================================================

/// Fitted encoders, scaler and defaults that turn films into feature rows.
///
/// Everything here is computed once by `fit` and only read afterwards.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    scaler: StandardScaler,
    genre_encoder: MultiLabelEncoder,
    star_encoder: MultiLabelEncoder,
    reputation: DirectorReputation,
    medians: NumericMedians,
    layout: FeatureLayout,
}

impl FeatureAssembler {
    /// Fit every feature transform on the catalog and return the training
    /// matrix alongside the fitted assembler.
    pub fn fit(catalog: &Catalog) -> Result<(Self, FeatureMatrix)> {
        let records = catalog.records();
        if records.is_empty() {
            return Err(PipelineError::EmptyCatalog);
        }

        let genre_corpus: Vec<&[String]> =
            records.iter().map(|r| r.genres.as_slice()).collect();
        let star_corpus: Vec<&[String]> =
            records.iter().map(|r| r.stars.as_slice()).collect();
        let genre_encoder = fit_encoder(&genre_corpus);
        let star_encoder = fit_encoder(&star_corpus);
        let reputation = DirectorReputation::fit(records);

        let numeric: Vec<Vec<f64>> = records
            .iter()
            .map(|r| numeric_row_for_record(r, &reputation))
            .collect();
        let scaler = StandardScaler::fit(&numeric)?;

        let layout = FeatureLayout {
            n_genres: genre_encoder.width(),
            n_stars: star_encoder.width(),
        };

        let assembler = Self {
            scaler,
            genre_encoder,
            star_encoder,
            reputation,
            medians: *catalog.medians(),
            layout,
        };

        let rows = records
            .iter()
            .zip(numeric)
            .map(|(record, numeric)| assembler.finish_row(numeric, &record.genres, &record.stars))
            .collect::<Result<Vec<_>>>()?;
        let matrix = FeatureMatrix::from_rows(rows, layout.width())?;

        info!(
            rows = records.len(),
            genres = layout.n_genres,
            stars = layout.n_stars,
            directors = assembler.reputation.len(),
            "Feature matrix assembled"
        );
        Ok((assembler, matrix))
    }

    /// Build one feature row for a query, in the training layout.
    ///
    /// Fails with `InvalidQuery` before any computation if director, genres
    /// or stars is missing.
    pub fn assemble(&self, query: &FilmQuery) -> Result<Vec<f64>> {
        query.validate()?;

        let medians = &self.medians;
        let numeric = vec![
            query.released_year.unwrap_or(medians.released_year) as f64,
            query.runtime.unwrap_or(medians.runtime) as f64,
            query.meta_score.unwrap_or(medians.meta_score),
            query.votes.unwrap_or(medians.votes) as f64,
            query.gross.unwrap_or(medians.gross),
            self.reputation.lookup(&query.director),
        ];
        debug!(?numeric, director = %query.director, "Numeric features before scaling");

        self.finish_row(numeric, &query.genres, &query.stars)
    }

    /// Scale the numeric block and append both indicator blocks
    fn finish_row(
        &self,
        mut numeric: Vec<f64>,
        genres: &[String],
        stars: &[String],
    ) -> Result<Vec<f64>> {
        self.scaler.transform_in_place(&mut numeric)?;
        let mut row = numeric;
        row.reserve(self.layout.n_genres + self.layout.n_stars);
        self.genre_encoder.transform_into(genres, &mut row);
        self.star_encoder.transform_into(stars, &mut row);
        Ok(row)
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn genre_encoder(&self) -> &MultiLabelEncoder {
        &self.genre_encoder
    }

    pub fn star_encoder(&self) -> &MultiLabelEncoder {
        &self.star_encoder
    }

    pub fn reputation(&self) -> &DirectorReputation {
        &self.reputation
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Training-set medians used for omitted numeric arguments
    pub fn medians(&self) -> &NumericMedians {
        &self.medians
    }
}

fn fit_encoder(corpus: &[&[String]]) -> MultiLabelEncoder {
    let mut builder = MultiLabelEncoderBuilder::new();
    for &labels in corpus {
        builder.observe(labels);
    }
    builder.build()
}

fn numeric_row_for_record(record: &FilmRecord, reputation: &DirectorReputation) -> Vec<f64> {
    vec![
        record.released_year as f64,
        record.runtime as f64,
        record.meta_score,
        record.votes as f64,
        record.gross,
        reputation.lookup(&record.director),
    ]
}
