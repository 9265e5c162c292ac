//! Parser for the film catalog CSV.
//!
//! Expected header (extra columns are ignored):
//! `Series_Title,Released_Year,Runtime,Genre,IMDB_Rating,Meta_score,Director,
//!  Star1,Star2,Star3,Star4,No_of_Votes,Gross`
//!
//! Each column is cleaned independently here. The two columns that need a
//! statistic over the whole column (critic score, rating) are left as
//! `Option` and imputed in a second pass by `Catalog::build`.

use crate::error::{DataLoadError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Headers the loader refuses to run without
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "Series_Title",
    "Released_Year",
    "Runtime",
    "Genre",
    "IMDB_Rating",
    "Meta_score",
    "Director",
    "Star1",
    "Star2",
    "Star3",
    "Star4",
    "No_of_Votes",
    "Gross",
];

/// One CSV row exactly as it appears in the file. Empty cells are `None`.
#[derive(Debug, Deserialize)]
struct RawFilmRow {
    #[serde(rename = "Series_Title")]
    title: Option<String>,
    #[serde(rename = "Released_Year")]
    released_year: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "IMDB_Rating")]
    rating: Option<String>,
    #[serde(rename = "Meta_score")]
    meta_score: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Star1")]
    star1: Option<String>,
    #[serde(rename = "Star2")]
    star2: Option<String>,
    #[serde(rename = "Star3")]
    star3: Option<String>,
    #[serde(rename = "Star4")]
    star4: Option<String>,
    #[serde(rename = "No_of_Votes")]
    votes: Option<String>,
    #[serde(rename = "Gross")]
    gross: Option<String>,
}

/// A row whose independent columns are cleaned but whose critic score and
/// rating still await column-wide imputation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PartialRecord {
    pub line: usize,
    pub title: String,
    pub director: String,
    pub genres: Vec<String>,
    pub stars: Vec<String>,
    pub released_year: i32,
    pub runtime: u32,
    pub meta_score: Option<f64>,
    pub votes: u64,
    pub gross: f64,
    pub rating: Option<f64>,
}

/// Parse a catalog file from disk
pub(crate) fn parse_catalog_file(path: &Path) -> Result<Vec<PartialRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    parse_catalog(file)
}

/// Parse catalog rows from any reader
pub(crate) fn parse_catalog<R: Read>(reader: R) -> Result<Vec<PartialRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    validate_headers(&headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // Header is line 1, so fall back to a 1-based data line count
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);

        let raw: RawFilmRow =
            record
                .deserialize(Some(&headers))
                .map_err(|e| DataLoadError::ParseError {
                    line,
                    reason: e.to_string(),
                })?;

        rows.push(clean_row(raw, line)?);
    }

    debug!("Parsed {} catalog rows", rows.len());
    Ok(rows)
}

fn validate_headers(headers: &csv::StringRecord) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataLoadError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn clean_row(raw: RawFilmRow, line: usize) -> Result<PartialRecord> {
    let title = raw.title.unwrap_or_default();
    if title.is_empty() {
        return Err(DataLoadError::ValidationError(format!(
            "row at line {} has an empty title",
            line
        )));
    }

    let released_year = clean_year(raw.released_year.as_deref());
    if released_year == 0 {
        if let Some(value) = raw.released_year.as_deref() {
            warn!(line, value, "Unparseable release year coerced to 0");
        }
    }

    let stars = collect_stars([raw.star1, raw.star2, raw.star3, raw.star4]);

    Ok(PartialRecord {
        line,
        title,
        director: raw.director.unwrap_or_default(),
        genres: split_genres(raw.genre.as_deref()),
        stars,
        released_year,
        runtime: clean_runtime(raw.runtime.as_deref()),
        meta_score: parse_score(raw.meta_score.as_deref()),
        votes: clean_votes(raw.votes.as_deref(), line)?,
        gross: clean_gross(raw.gross.as_deref()),
        rating: parse_score(raw.rating.as_deref()),
    })
}

// =============================================================================
// Column cleaners
// =============================================================================

/// "1994" -> 1994, "1994.0" -> 1994, "PG" / missing -> 0
fn clean_year(raw: Option<&str>) -> i32 {
    let Some(s) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(year) = s.parse::<i32>() {
        return year;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() < i32::MAX as f64 => v.trunc() as i32,
        _ => 0,
    }
}

/// Leading integer of a "<N> min" string. Anything else -> 0.
fn clean_runtime(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.split_whitespace().next())
        .and_then(|token| token.parse::<u32>().ok())
        .unwrap_or(0)
}

/// "2,343,110" -> 2343110, missing -> 0.
///
/// A present but non-numeric vote count is an error: silently zeroing it
/// would hide a malformed file.
fn clean_votes(raw: Option<&str>, line: usize) -> Result<u64> {
    let Some(s) = raw else {
        return Ok(0);
    };
    let stripped = strip_thousands(s);
    if stripped.is_empty() {
        return Ok(0);
    }
    if let Ok(votes) = stripped.parse::<u64>() {
        return Ok(votes);
    }
    match stripped.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.trunc() as u64),
        _ => Err(DataLoadError::InvalidValue {
            field: "No_of_Votes".to_string(),
            value: s.to_string(),
            line,
        }),
    }
}

/// "28,341,469" -> 28341469.0, missing or non-numeric -> 0.0
fn clean_gross(raw: Option<&str>) -> f64 {
    raw.map(strip_thousands)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// A finite float, or `None` for anything that needs imputation
fn parse_score(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// "Drama, Crime" -> ["Drama", "Crime"]. Empty tokens are dropped.
fn split_genres(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn collect_stars(cells: [Option<String>; 4]) -> Vec<String> {
    cells
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_thousands(s: &str) -> String {
    s.trim().replace(',', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Poster_Link,Series_Title,Released_Year,Certificate,Runtime,Genre,IMDB_Rating,Overview,Meta_score,Director,Star1,Star2,Star3,Star4,No_of_Votes,Gross";

    #[test]
    fn test_clean_year() {
        assert_eq!(clean_year(Some("1994")), 1994);
        assert_eq!(clean_year(Some("1994.0")), 1994);
        assert_eq!(clean_year(Some("PG")), 0);
        assert_eq!(clean_year(None), 0);
    }

    #[test]
    fn test_clean_runtime() {
        assert_eq!(clean_runtime(Some("142 min")), 142);
        assert_eq!(clean_runtime(Some("95")), 95);
        assert_eq!(clean_runtime(Some("unknown")), 0);
        assert_eq!(clean_runtime(Some("min 142")), 0);
        assert_eq!(clean_runtime(None), 0);
    }

    #[test]
    fn test_clean_votes_strips_separators() {
        assert_eq!(clean_votes(Some("2,343,110"), 2).unwrap(), 2_343_110);
        assert_eq!(clean_votes(Some("689845"), 2).unwrap(), 689_845);
        assert_eq!(clean_votes(None, 2).unwrap(), 0);
    }

    #[test]
    fn test_clean_votes_rejects_garbage() {
        let err = clean_votes(Some("lots"), 7).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { line: 7, .. }));
    }

    #[test]
    fn test_clean_gross() {
        assert_eq!(clean_gross(Some("28,341,469")), 28_341_469.0);
        assert_eq!(clean_gross(Some("n/a")), 0.0);
        assert_eq!(clean_gross(None), 0.0);
    }

    #[test]
    fn test_split_genres_drops_empty_tokens() {
        assert_eq!(
            split_genres(Some("Action, Adventure,Sci-Fi")),
            vec!["Action", "Adventure", "Sci-Fi"]
        );
        assert_eq!(split_genres(Some("Drama,")), vec!["Drama"]);
        assert!(split_genres(None).is_empty());
    }

    #[test]
    fn test_collect_stars_skips_empty_cells() {
        let stars = collect_stars([
            Some("Tim Robbins".to_string()),
            None,
            Some("  ".to_string()),
            Some("Bob Gunton".to_string()),
        ]);
        assert_eq!(stars, vec!["Tim Robbins", "Bob Gunton"]);
    }

    #[test]
    fn test_parse_catalog_rows() {
        let csv = format!(
            "{HEADER}\n\
             link,The Shawshank Redemption,1994,A,142 min,Drama,9.3,overview,80,Frank Darabont,Tim Robbins,Morgan Freeman,Bob Gunton,William Sadler,\"2,343,110\",\"28,341,469\"\n\
             link,Apollo 13,PG,U,140 min,\"Adventure, Drama, History\",,overview,,Ron Howard,Tom Hanks,Bill Paxton,,,\"269,197\",\n"
        );

        let rows = parse_catalog(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.title, "The Shawshank Redemption");
        assert_eq!(first.released_year, 1994);
        assert_eq!(first.runtime, 142);
        assert_eq!(first.votes, 2_343_110);
        assert_eq!(first.gross, 28_341_469.0);
        assert_eq!(first.meta_score, Some(80.0));
        assert_eq!(first.rating, Some(9.3));

        let second = &rows[1];
        assert_eq!(second.released_year, 0);
        assert_eq!(second.genres, vec!["Adventure", "Drama", "History"]);
        assert_eq!(second.stars, vec!["Tom Hanks", "Bill Paxton"]);
        assert_eq!(second.meta_score, None);
        assert_eq!(second.rating, None);
        assert_eq!(second.gross, 0.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "Series_Title,Director\nA,B\n";
        let err = parse_catalog(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { .. }));
    }

    #[test]
    fn test_empty_title_is_rejected() {
        let csv = format!("{HEADER}\nlink,,1994,A,142 min,Drama,9.3,o,80,D,S1,S2,S3,S4,10,1\n");
        let err = parse_catalog(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(_)));
    }
}
