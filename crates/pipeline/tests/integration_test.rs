//! Integration tests for the trained pipeline.
//!
//! These tests fit the whole pipeline on small hand-built catalogs and
//! exercise both public queries the way a presentation shell would.

use data_loader::{Catalog, FilmRecord};
use pipeline::{FilmQuery, PipelineConfig, PipelineError, TrainedPipeline};

fn film(
    title: &str,
    director: &str,
    genres: &[&str],
    stars: &[&str],
    year: i32,
    rating: f64,
) -> FilmRecord {
    FilmRecord {
        title: title.to_string(),
        director: director.to_string(),
        genres: genres.iter().map(|s| s.to_string()).collect(),
        stars: stars.iter().map(|s| s.to_string()).collect(),
        released_year: year,
        runtime: 120,
        meta_score: 75.0,
        votes: 250_000,
        gross: 5.0e7,
        rating,
    }
}

fn create_test_setup() -> TrainedPipeline {
    let catalog = Catalog::from_records(vec![
        film("The Godfather", "Francis Ford Coppola", &["Crime", "Drama"], &["Marlon Brando", "Al Pacino"], 1972, 9.2),
        film("The Godfather: Part II", "Francis Ford Coppola", &["Crime", "Drama"], &["Al Pacino", "Robert De Niro"], 1974, 9.0),
        film("Heat", "Michael Mann", &["Action", "Crime", "Drama"], &["Al Pacino", "Robert De Niro"], 1995, 8.3),
        film("Inception", "Christopher Nolan", &["Action", "Adventure", "Sci-Fi"], &["Leonardo DiCaprio"], 2010, 8.8),
        film("Interstellar", "Christopher Nolan", &["Adventure", "Drama", "Sci-Fi"], &["Matthew McConaughey"], 2014, 8.6),
        film("The Prestige", "Christopher Nolan", &["Drama", "Mystery", "Sci-Fi"], &["Christian Bale", "Hugh Jackman"], 2006, 8.5),
        film("Toy Story", "John Lasseter", &["Animation", "Adventure", "Comedy"], &["Tom Hanks", "Tim Allen"], 1995, 8.3),
        film("Up", "Pete Docter", &["Animation", "Adventure", "Comedy"], &["Ed Asner"], 2009, 8.2),
    ])
    .unwrap();

    let config = PipelineConfig::default().with_n_estimators(20);
    TrainedPipeline::fit(catalog, &config).unwrap()
}

#[test]
fn test_predict_rating_is_finite_and_deterministic() {
    let pipeline = create_test_setup();

    for director in pipeline.directors() {
        let query = FilmQuery::new(director, &["Drama"], &["Al Pacino"]);
        let first = pipeline.predict_rating(&query).unwrap();
        let second = pipeline.predict_rating(&query).unwrap();
        assert!(first.is_finite());
        assert_eq!(first, second);
    }
}

#[test]
fn test_missing_mandatory_arguments_raise_invalid_query() {
    let pipeline = create_test_setup();

    let cases = [
        (FilmQuery::new("", &["Drama"], &["Al Pacino"]), "director"),
        (FilmQuery::new::<_, &str, _>("Michael Mann", &[], &["Al Pacino"]), "genres"),
        (FilmQuery::new::<_, _, &str>("Michael Mann", &["Drama"], &[]), "stars"),
    ];

    for (query, argument) in cases {
        assert_eq!(
            pipeline.predict_rating(&query),
            Err(PipelineError::InvalidQuery { argument })
        );
    }
}

#[test]
fn test_omitted_numerics_equal_explicit_medians() {
    let pipeline = create_test_setup();
    let medians = *pipeline.medians();

    let omitted = FilmQuery::new("Christopher Nolan", &["Sci-Fi"], &["Christian Bale"]);
    let explicit = omitted
        .clone()
        .with_released_year(medians.released_year)
        .with_runtime(medians.runtime)
        .with_meta_score(medians.meta_score)
        .with_votes(medians.votes)
        .with_gross(medians.gross);

    assert_eq!(
        pipeline.predict_rating(&omitted).unwrap(),
        pipeline.predict_rating(&explicit).unwrap()
    );
}

#[test]
fn test_unknown_labels_still_predict() {
    let pipeline = create_test_setup();

    let query = FilmQuery::new("Unknown Auteur", &["Space Western"], &["Nobody Famous"]);
    let rating = pipeline.predict_rating(&query).unwrap();
    assert!(rating.is_finite());
}

#[test]
fn test_recommend_empty_and_unknown() {
    let pipeline = create_test_setup();

    assert!(pipeline.recommend::<&str>(&[], 5).is_empty());
    assert!(pipeline.recommend(&["title not in catalog"], 5).is_empty());
}

#[test]
fn test_recommend_length_and_self_exclusion() {
    let pipeline = create_test_setup();
    let liked = ["Inception", "The Godfather", "Toy Story"];

    for n in 1..=10 {
        let recs = pipeline.recommend(&liked, n);
        assert!(recs.len() <= n);
        for title in &recs {
            assert!(!liked.contains(&title.as_str()), "{} was liked", title);
        }
    }
}

#[test]
fn test_recommend_is_idempotent() {
    let pipeline = create_test_setup();
    let liked = ["Heat", "Up"];
    assert_eq!(pipeline.recommend(&liked, 6), pipeline.recommend(&liked, 6));
}

#[test]
fn test_recommend_unknown_titles_are_skipped() {
    let pipeline = create_test_setup();
    assert_eq!(
        pipeline.recommend(&["Nope", "Inception"], 3),
        pipeline.recommend(&["Inception"], 3)
    );
}

#[test]
fn test_mutual_nearest_neighbors_scenario() {
    // A and B are near-identical; C and D are far from both
    let catalog = Catalog::from_records(vec![
        film("A", "Dir One", &["Drama"], &["Star One"], 2000, 8.0),
        film("B", "Dir One", &["Drama"], &["Star One"], 2001, 8.0),
        film("C", "Dir Two", &["Horror"], &["Star Two"], 1950, 5.0),
        film("D", "Dir Three", &["Comedy"], &["Star Three"], 2020, 6.5),
    ])
    .unwrap();
    let pipeline =
        TrainedPipeline::fit(catalog, &PipelineConfig::default().with_n_estimators(5)).unwrap();

    assert_eq!(pipeline.recommend(&["A"], 1), vec!["B".to_string()]);
    assert_eq!(pipeline.recommend(&["B"], 1), vec!["A".to_string()]);
}

#[test]
fn test_empty_catalog_fails_to_fit() {
    let catalog = Catalog::from_records(Vec::new()).unwrap();
    let err = TrainedPipeline::fit(catalog, &PipelineConfig::default()).unwrap_err();
    assert_eq!(err, PipelineError::EmptyCatalog);
}
