//! The trained pipeline: every fitted artifact in one immutable value.
//!
//! `TrainedPipeline::fit` is the only constructor and there are no setters.
//! Both queries take `&self`, so one instance can be shared (e.g. behind an
//! `Arc`) by any number of concurrent readers.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::{FeatureAssembler, FeatureLayout, FeatureMatrix, FilmQuery};
use crate::forest::RandomForestRegressor;
use crate::neighbors::NearestNeighbors;
use crate::traits::Regressor;
use data_loader::{Catalog, NumericMedians, RowIndex};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Fitted encoders, scaler, reputation table, regressor and neighbor index,
/// built once from a cleaned catalog.
#[derive(Debug)]
pub struct TrainedPipeline {
    catalog: Catalog,
    assembler: FeatureAssembler,
    regressor: Box<dyn Regressor>,
    neighbors: NearestNeighbors,
    config: PipelineConfig,
}

impl TrainedPipeline {
    /// Fit every artifact on `catalog`.
    ///
    /// Either everything is fitted or an error is returned; there is no
    /// partially trained state.
    #[instrument(skip_all, fields(records = catalog.len()))]
    pub fn fit(catalog: Catalog, config: &PipelineConfig) -> Result<Self> {
        let (assembler, matrix) = FeatureAssembler::fit(&catalog)?;

        let ratings: Vec<f64> = catalog.records().iter().map(|r| r.rating).collect();
        let forest = RandomForestRegressor::new(config.n_estimators)
            .with_max_depth(config.max_depth)
            .with_min_samples_split(config.min_samples_split)
            .with_min_samples_leaf(config.min_samples_leaf)
            .with_random_state(config.random_state)
            .fit(&matrix, &ratings)?;

        let neighbors = NearestNeighbors::fit(matrix, config.n_neighbors)?;

        info!(
            regressor = forest.name(),
            n_neighbors = config.n_neighbors,
            "Pipeline trained"
        );

        Ok(Self {
            catalog,
            assembler,
            regressor: Box::new(forest),
            neighbors,
            config: config.clone(),
        })
    }

    /// Predict the audience rating of a partially specified film.
    ///
    /// Omitted numeric fields use the training medians. Unknown director,
    /// genre and star labels are tolerated.
    ///
    /// # Errors
    /// `InvalidQuery` if director, genres or stars is missing or empty.
    #[instrument(skip_all, fields(director = %query.director))]
    pub fn predict_rating(&self, query: &FilmQuery) -> Result<f64> {
        let row = self.assembler.assemble(query)?;
        let rating = self.regressor.predict_row(&row);
        debug!(rating, "Predicted rating");
        Ok(rating)
    }

    /// Recommend up to `n_recs` titles similar to the liked ones.
    ///
    /// ## Algorithm
    /// 1. Resolve liked titles to catalog rows (unknown titles are skipped)
    /// 2. For each resolved row, in liked-title order, walk its neighbors
    ///    closest first, skipping the row itself
    /// 3. Skip any neighbor whose title is liked; keep the rest in order
    /// 4. Stop at `n_recs`
    ///
    /// A title reached via several liked titles is listed each time unless
    /// `dedup_recommendations` is configured.
    #[instrument(skip_all, fields(liked = liked_titles.len(), n_recs = n_recs))]
    pub fn recommend<S: AsRef<str>>(&self, liked_titles: &[S], n_recs: usize) -> Vec<String> {
        let liked: HashSet<&str> = liked_titles.iter().map(|t| t.as_ref()).collect();
        let rows = self.resolve_titles(liked_titles);
        if rows.is_empty() || n_recs == 0 {
            debug!("No liked title resolved to the catalog");
            return Vec::new();
        }

        let mut recs: Vec<String> = Vec::with_capacity(n_recs);
        let mut emitted: HashSet<&str> = HashSet::new();

        for row in rows {
            for neighbor in self.neighbors.kneighbors_of_row(row).iter().skip(1) {
                let Some(record) = self.catalog.get(neighbor.row) else {
                    continue;
                };
                let title = record.title.as_str();
                if liked.contains(title) {
                    continue;
                }
                if self.config.dedup_recommendations && !emitted.insert(title) {
                    continue;
                }
                recs.push(title.to_string());
                if recs.len() >= n_recs {
                    return recs;
                }
            }
        }
        recs
    }

    /// Rows of every known liked title, in liked-title order, each row once
    fn resolve_titles<S: AsRef<str>>(&self, liked_titles: &[S]) -> Vec<RowIndex> {
        let mut seen = HashSet::new();
        liked_titles
            .iter()
            .flat_map(|t| self.catalog.rows_for_title(t.as_ref()).iter().copied())
            .filter(|row| seen.insert(*row))
            .collect()
    }

    // Read-only views for a presentation shell

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Titles in catalog order
    pub fn titles(&self) -> Vec<&str> {
        self.catalog.titles()
    }

    /// Sorted unique director names
    pub fn directors(&self) -> Vec<&str> {
        self.catalog.directors()
    }

    pub fn genre_vocabulary(&self) -> &[String] {
        self.assembler.genre_encoder().classes()
    }

    pub fn star_vocabulary(&self) -> &[String] {
        self.assembler.star_encoder().classes()
    }

    /// Defaults used for omitted numeric arguments
    pub fn medians(&self) -> &NumericMedians {
        self.assembler.medians()
    }

    pub fn layout(&self) -> FeatureLayout {
        self.assembler.layout()
    }

    pub fn feature_matrix(&self) -> &FeatureMatrix {
        self.neighbors.matrix()
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
