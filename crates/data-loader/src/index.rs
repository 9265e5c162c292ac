//! Catalog building: imputation, indexing and validation.
//!
//! Cleaning is column-wise and never drops a row. Critic score and rating
//! are imputed in two passes: the statistic is computed over the present
//! values first, then applied to the missing ones.

use crate::error::{DataLoadError, Result};
use crate::parser::{self, PartialRecord};
use crate::stats::{mean, median};
use crate::types::*;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

impl Catalog {
    /// Load and clean the catalog CSV at `path`.
    ///
    /// This is the main entry point for startup. Any error here should abort
    /// the process: no partially cleaned catalog is ever returned.
    #[instrument]
    pub fn load_from_csv(path: &Path) -> Result<Self> {
        info!("Loading film catalog from {:?}", path);
        let rows = parser::parse_catalog_file(path)?;
        Self::build(rows)
    }

    /// Load and clean a catalog from any CSV reader
    pub fn load_from_reader<R: Read>(reader: R) -> Result<Self> {
        let rows = parser::parse_catalog(reader)?;
        Self::build(rows)
    }

    /// Build a catalog from records that are already clean.
    ///
    /// Validates the record invariants, then builds the title index and the
    /// column medians.
    pub fn from_records(records: Vec<FilmRecord>) -> Result<Self> {
        let catalog = Self {
            title_index: build_title_index(&records),
            medians: compute_medians(&records),
            records,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn build(rows: Vec<PartialRecord>) -> Result<Self> {
        let records = impute(rows);
        let catalog = Self::from_records(records)?;

        info!(
            records = catalog.len(),
            directors = catalog.directors().len(),
            "Catalog cleaned"
        );
        Ok(catalog)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every title is non-empty
    /// - Every float column is finite
    /// - Gross is non-negative
    ///
    /// A critic score outside 0-100 is only logged.
    pub fn validate(&self) -> Result<()> {
        for (row, record) in self.records.iter().enumerate() {
            if record.title.trim().is_empty() {
                return Err(DataLoadError::ValidationError(format!(
                    "record {} has an empty title",
                    row
                )));
            }
            for (field, value) in [
                ("meta_score", record.meta_score),
                ("gross", record.gross),
                ("rating", record.rating),
            ] {
                if !value.is_finite() {
                    return Err(DataLoadError::ValidationError(format!(
                        "record '{}' has a non-finite {}",
                        record.title, field
                    )));
                }
            }
            if !(0.0..=100.0).contains(&record.meta_score) {
                warn!(
                    title = %record.title,
                    meta_score = record.meta_score,
                    "Critic score outside 0-100, keeping it as is"
                );
            }
            if record.gross < 0.0 {
                return Err(DataLoadError::ValidationError(format!(
                    "record '{}' has negative gross {}",
                    record.title, record.gross
                )));
            }
        }
        Ok(())
    }
}

/// Second cleaning pass: fill critic score with the median and rating with
/// the mean of the values that were present.
fn impute(rows: Vec<PartialRecord>) -> Vec<FilmRecord> {
    let present_meta: Vec<f64> = rows.iter().filter_map(|r| r.meta_score).collect();
    let present_rating: Vec<f64> = rows.iter().filter_map(|r| r.rating).collect();
    let meta_fill = median(&present_meta);
    let rating_fill = mean(&present_rating);

    info!(
        missing_meta = rows.len() - present_meta.len(),
        missing_rating = rows.len() - present_rating.len(),
        meta_fill,
        rating_fill,
        "Imputing missing critic scores and ratings"
    );

    rows.into_iter()
        .inspect(|r| {
            if r.meta_score.is_none() || r.rating.is_none() {
                debug!(line = r.line, title = %r.title, "Imputed missing score");
            }
        })
        .map(|r| FilmRecord {
            title: r.title,
            director: r.director,
            genres: r.genres,
            stars: r.stars,
            released_year: r.released_year,
            runtime: r.runtime,
            meta_score: r.meta_score.unwrap_or(meta_fill),
            votes: r.votes,
            gross: r.gross,
            rating: r.rating.unwrap_or(rating_fill),
        })
        .collect()
}

fn build_title_index(records: &[FilmRecord]) -> HashMap<String, Vec<RowIndex>> {
    let mut index: HashMap<String, Vec<RowIndex>> = HashMap::new();
    for (row, record) in records.iter().enumerate() {
        index.entry(record.title.clone()).or_default().push(row);
    }
    index
}

fn compute_medians(records: &[FilmRecord]) -> NumericMedians {
    let column = |f: fn(&FilmRecord) -> f64| -> f64 {
        let values: Vec<f64> = records.iter().map(f).collect();
        median(&values)
    };

    NumericMedians {
        released_year: column(|r| r.released_year as f64).trunc() as i32,
        runtime: column(|r| r.runtime as f64).trunc() as u32,
        meta_score: column(|r| r.meta_score),
        votes: column(|r| r.votes as f64).trunc() as u64,
        gross: column(|r| r.gross),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(title: &str, meta: Option<f64>, rating: Option<f64>) -> PartialRecord {
        PartialRecord {
            line: 2,
            title: title.to_string(),
            director: "Someone".to_string(),
            genres: vec!["Drama".to_string()],
            stars: vec!["Actor".to_string()],
            released_year: 2000,
            runtime: 100,
            meta_score: meta,
            votes: 10,
            gross: 0.0,
            rating,
        }
    }

    #[test]
    fn test_impute_uses_median_and_mean_of_present_values() {
        let rows = vec![
            partial("A", Some(60.0), Some(8.0)),
            partial("B", Some(90.0), None),
            partial("C", None, Some(9.0)),
            partial("D", Some(70.0), Some(7.0)),
        ];
        let records = impute(rows);

        // median of [60, 90, 70] = 70
        assert_eq!(records[2].meta_score, 70.0);
        // mean of [8, 9, 7] = 8
        assert_eq!(records[1].rating, 8.0);
        // present values untouched
        assert_eq!(records[0].meta_score, 60.0);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_title_index_keeps_catalog_order() {
        let records = impute(vec![
            partial("A", Some(50.0), Some(7.0)),
            partial("B", Some(50.0), Some(7.0)),
            partial("A", Some(50.0), Some(7.0)),
        ]);
        let catalog = Catalog::from_records(records).unwrap();

        assert_eq!(catalog.rows_for_title("A"), &[0, 2]);
        assert_eq!(catalog.rows_for_title("B"), &[1]);
        assert!(catalog.rows_for_title("Z").is_empty());
    }

    #[test]
    fn test_medians_are_truncated_for_integer_columns() {
        let mut rows = vec![
            partial("A", Some(50.0), Some(7.0)),
            partial("B", Some(61.0), Some(7.0)),
        ];
        rows[0].released_year = 1999;
        rows[1].released_year = 2000;
        rows[0].votes = 3;
        rows[1].votes = 4;
        let catalog = Catalog::from_records(impute(rows)).unwrap();
        let medians = catalog.medians();

        assert_eq!(medians.released_year, 1999);
        assert_eq!(medians.votes, 3);
        assert_eq!(medians.meta_score, 55.5);
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let mut records = impute(vec![partial("A", Some(50.0), Some(7.0))]);
        records[0].title = " ".to_string();
        assert!(Catalog::from_records(records).is_err());
    }

    #[test]
    fn test_out_of_range_critic_score_is_kept() {
        let records = impute(vec![
            partial("A", Some(50.0), Some(7.0)),
            partial("B", Some(140.0), Some(8.0)),
        ]);
        let catalog = Catalog::from_records(records).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().meta_score, 140.0);
    }

    #[test]
    fn test_load_dataset() {
        // This test requires the actual dataset file
        let path = Path::new("../../data/imdb_top_1000.csv");

        if path.exists() {
            let catalog = Catalog::load_from_csv(path).unwrap();
            assert_eq!(catalog.len(), 1000);
            assert!(catalog.records().iter().all(|r| !r.title.is_empty()));
        }
    }
}
