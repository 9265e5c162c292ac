//! Director reputation: mean historical rating per director.

use data_loader::FilmRecord;
use data_loader::stats::mean;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mean rating per director plus a global fallback.
///
/// Directors that never appeared in training (or had an empty name) resolve
/// to the global mean rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorReputation {
    scores: HashMap<String, f64>,
    global_mean: f64,
}

impl DirectorReputation {
    /// Compute the table once from the cleaned catalog
    pub fn fit(records: &[FilmRecord]) -> Self {
        let mut grouped: HashMap<&str, Vec<f64>> = HashMap::new();
        for record in records.iter().filter(|r| !r.director.is_empty()) {
            grouped
                .entry(record.director.as_str())
                .or_default()
                .push(record.rating);
        }

        let scores = grouped
            .into_iter()
            .map(|(director, ratings)| (director.to_string(), mean(&ratings)))
            .collect();

        let all: Vec<f64> = records.iter().map(|r| r.rating).collect();

        Self {
            scores,
            global_mean: mean(&all),
        }
    }

    /// Reputation score for `director`, or the global mean if unknown
    pub fn lookup(&self, director: &str) -> f64 {
        self.scores
            .get(director)
            .copied()
            .unwrap_or(self.global_mean)
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn contains(&self, director: &str) -> bool {
        self.scores.contains_key(director)
    }

    /// Number of directors with a score of their own
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
