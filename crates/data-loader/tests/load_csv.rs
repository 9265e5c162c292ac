//! Integration tests for loading a catalog file from disk.

use data_loader::{Catalog, DataLoadError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const HEADER: &str = "Poster_Link,Series_Title,Released_Year,Certificate,Runtime,Genre,IMDB_Rating,Overview,Meta_score,Director,Star1,Star2,Star3,Star4,No_of_Votes,Gross";

fn write_catalog(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

#[test]
fn test_load_cleans_and_imputes() {
    let file = write_catalog(&[
        "p,The Godfather,1972,A,175 min,\"Crime, Drama\",9.2,o,100,Francis Ford Coppola,Marlon Brando,Al Pacino,James Caan,Diane Keaton,\"1,620,367\",\"134,966,411\"",
        "p,The Dark Knight,2008,UA,152 min,\"Action, Crime, Drama\",9.0,o,84,Christopher Nolan,Christian Bale,Heath Ledger,Aaron Eckhart,Michael Caine,\"2,303,232\",\"534,858,444\"",
        "p,Apollo 13,PG,U,140 min,\"Adventure, Drama, History\",,o,,Ron Howard,Tom Hanks,Bill Paxton,Kevin Bacon,Gary Sinise,\"269,197\",",
    ]);

    let catalog = Catalog::load_from_csv(file.path()).unwrap();
    assert_eq!(catalog.len(), 3);

    let apollo = &catalog.records()[catalog.rows_for_title("Apollo 13")[0]];
    assert_eq!(apollo.released_year, 0);
    assert_eq!(apollo.runtime, 140);
    assert_eq!(apollo.gross, 0.0);
    // median of [100, 84]
    assert_eq!(apollo.meta_score, 92.0);
    // mean of [9.2, 9.0]
    assert!((apollo.rating - 9.1).abs() < 1e-9);

    let godfather = &catalog.records()[0];
    assert_eq!(godfather.genres, vec!["Crime", "Drama"]);
    assert_eq!(godfather.stars.len(), 4);
    assert_eq!(godfather.votes, 1_620_367);
}

#[test]
fn test_missing_file_is_reported() {
    let err = Catalog::load_from_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
    assert!(matches!(err, DataLoadError::FileNotFound { .. }));
}

#[test]
fn test_rows_are_never_dropped() {
    let file = write_catalog(&[
        "p,Blank,,,,,,,,,,,,,,",
        "p,Full,1999,A,136 min,Sci-Fi,8.7,o,73,Lana Wachowski,Keanu Reeves,,,,\"1,676,426\",\"171,479,930\"",
    ]);

    let catalog = Catalog::load_from_csv(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);

    let blank = catalog.get(0).unwrap();
    assert!(blank.genres.is_empty());
    assert!(blank.stars.is_empty());
    assert_eq!(blank.votes, 0);
    assert_eq!(blank.meta_score, 73.0);
    assert_eq!(blank.rating, 8.7);
}
