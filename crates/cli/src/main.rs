use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Catalog, NumericMedians};
use pipeline::{FilmQuery, PipelineConfig, TrainedPipeline};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// ReelRate - Film rating predictor and look-alike recommender
#[derive(Parser)]
#[command(name = "reel-rate")]
#[command(about = "Predict film ratings and recommend similar titles", long_about = None)]
struct Cli {
    /// Path to the film catalog CSV (see data/README.md)
    #[arg(short, long, default_value = "data/imdb_top_1000.csv")]
    data_file: PathBuf,

    /// Number of trees in the rating forest
    #[arg(long, default_value_t = 100)]
    trees: usize,

    /// Random seed for forest bootstrapping
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Neighbors considered per liked title (the title itself included)
    #[arg(long, default_value_t = 6)]
    neighbors: usize,

    /// Drop titles already recommended via an earlier liked title
    #[arg(long)]
    dedup: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend films similar to the ones you like
    Recommend {
        /// Liked title (repeat for several)
        #[arg(long = "liked")]
        liked: Vec<String>,

        /// Number of recommendations to return
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..=20))]
        count: u16,
    },

    /// Predict the rating of a described film
    Predict {
        /// Director name
        #[arg(long, default_value = "")]
        director: String,

        /// Genre (repeat for several)
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Lead cast member (repeat for several)
        #[arg(long = "star")]
        stars: Vec<String>,

        /// Release year; the catalog median is used when omitted
        #[arg(long)]
        year: Option<i32>,

        /// Runtime in minutes
        #[arg(long)]
        runtime: Option<u32>,

        /// Critic score, 0-100
        #[arg(long)]
        meta_score: Option<f64>,

        /// Number of audience votes
        #[arg(long)]
        votes: Option<u64>,

        /// US gross in dollars
        #[arg(long)]
        gross: Option<f64>,
    },

    /// Show the selectable directors, genres, stars and default values
    Catalog {
        /// Show at most this many entries per list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Serialize)]
struct CatalogSummary<'a> {
    films: usize,
    directors: Vec<&'a str>,
    genres: &'a [String],
    stars: &'a [String],
    medians: NumericMedians,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::default()
        .with_n_estimators(cli.trees)
        .with_random_state(cli.seed)
        .with_n_neighbors(cli.neighbors)
        .with_dedup_recommendations(cli.dedup);

    // Load and fit once; any failure here aborts before a query is served
    let start = Instant::now();
    let catalog = Catalog::load_from_csv(&cli.data_file)
        .with_context(|| format!("Failed to load catalog from {}", cli.data_file.display()))?;
    let pipeline =
        TrainedPipeline::fit(catalog, &config).context("Failed to train the pipeline")?;
    info!("Pipeline ready in {:?}", start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend { liked, count } => {
            handle_recommend(&pipeline, &liked, count as usize, cli.json)?
        }
        Commands::Predict {
            director,
            genres,
            stars,
            year,
            runtime,
            meta_score,
            votes,
            gross,
        } => {
            let query = FilmQuery {
                director,
                genres,
                stars,
                released_year: year,
                runtime,
                meta_score,
                votes,
                gross,
            };
            handle_predict(&pipeline, &query, cli.json)?
        }
        Commands::Catalog { limit } => handle_catalog(&pipeline, limit, cli.json)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    pipeline: &TrainedPipeline,
    liked: &[String],
    count: usize,
    json: bool,
) -> Result<()> {
    if liked.is_empty() {
        println!("{}", "Pick at least one film you like (--liked <TITLE>)".yellow());
        return Ok(());
    }

    for title in liked {
        if !pipeline.catalog().contains_title(title) {
            println!("{} '{}' is not in the catalog, skipping", "•".yellow(), title);
        }
    }

    let recs = pipeline.recommend(liked, count);

    if json {
        println!("{}", serde_json::to_string_pretty(&recs)?);
        return Ok(());
    }

    if recs.is_empty() {
        println!("{}", "No recommendations found for the selected films.".yellow());
        return Ok(());
    }

    println!("{}", "You might also like:".bold().blue());
    for (rank, title) in recs.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), title);
    }
    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(pipeline: &TrainedPipeline, query: &FilmQuery, json: bool) -> Result<()> {
    let rating = pipeline
        .predict_rating(query)
        .context("Could not predict a rating")?;

    if json {
        println!("{}", serde_json::json!({ "query": query, "rating": rating }));
    } else {
        println!(
            "{} {}",
            "Predicted IMDB rating:".bold().blue(),
            format!("{:.2}", rating).green()
        );
    }
    Ok(())
}

/// Handle the 'catalog' command
fn handle_catalog(pipeline: &TrainedPipeline, limit: usize, json: bool) -> Result<()> {
    let summary = CatalogSummary {
        films: pipeline.catalog().len(),
        directors: pipeline.directors(),
        genres: pipeline.genre_vocabulary(),
        stars: pipeline.star_vocabulary(),
        medians: *pipeline.medians(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", format!("{} films", summary.films).bold().blue());
    print_list("Directors", &summary.directors, limit);
    print_list("Genres", summary.genres, limit);
    print_list("Stars", summary.stars, limit);

    let m = &summary.medians;
    println!("{}", "Defaults for omitted values:".bold());
    println!("{}Year: {}", "• ".cyan(), m.released_year);
    println!("{}Runtime: {} min", "• ".cyan(), m.runtime);
    println!("{}Critic score: {:.1}", "• ".cyan(), m.meta_score);
    println!("{}Votes: {}", "• ".cyan(), m.votes);
    println!("{}Gross: ${:.0}", "• ".cyan(), m.gross);
    Ok(())
}

fn print_list<S: AsRef<str>>(heading: &str, items: &[S], limit: usize) {
    println!("{} ({})", heading.bold(), items.len());
    for item in items.iter().take(limit) {
        println!("  - {}", item.as_ref());
    }
    if items.len() > limit {
        println!("  ... and {} more", items.len() - limit);
    }
}
