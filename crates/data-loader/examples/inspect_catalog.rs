use anyhow::{Context, Result};
use data_loader::Catalog;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let path = Path::new("data/imdb_top_1000.csv");

    println!("Loading film catalog...\n");

    let start = Instant::now();
    let catalog = Catalog::load_from_csv(path).context("Failed to load catalog (see data/README.md)")?;
    let elapsed = start.elapsed();

    let medians = catalog.medians();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Films: {}", catalog.len());
    println!("Directors: {}", catalog.directors().len());
    println!(
        "Medians: year {}, runtime {} min, critic {:.1}, votes {}, gross {:.0}",
        medians.released_year, medians.runtime, medians.meta_score, medians.votes, medians.gross
    );
    Ok(())
}
