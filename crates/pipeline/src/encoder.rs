//! Multi-label indicator encoding for genre and cast fields.
//!
//! Two-phase lifecycle: a `MultiLabelEncoderBuilder` collects labels from
//! the training corpus, and `build` freezes them into an immutable
//! `MultiLabelEncoder` that can only transform.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Collects the vocabulary during fitting.
#[derive(Debug, Default, Clone)]
pub struct MultiLabelEncoderBuilder {
    labels: BTreeSet<String>,
}

impl MultiLabelEncoderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every label of one record's label set
    pub fn observe<S: AsRef<str>>(&mut self, labels: &[S]) -> &mut Self {
        for label in labels {
            self.labels.insert(label.as_ref().to_string());
        }
        self
    }

    /// Freeze the vocabulary. Labels are kept in sorted order.
    pub fn build(self) -> MultiLabelEncoder {
        let vocabulary: Vec<String> = self.labels.into_iter().collect();
        let positions = vocabulary
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        MultiLabelEncoder {
            vocabulary,
            positions,
        }
    }
}

/// A frozen label vocabulary that turns label sets into indicator vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLabelEncoder {
    vocabulary: Vec<String>,
    positions: HashMap<String, usize>,
}

impl MultiLabelEncoder {
    /// Fit on a corpus of label sets in one call
    pub fn fit<S: AsRef<str>>(corpus: &[Vec<S>]) -> Self {
        let mut builder = MultiLabelEncoderBuilder::new();
        for labels in corpus {
            builder.observe(labels);
        }
        builder.build()
    }

    /// Known labels in column order
    pub fn classes(&self) -> &[String] {
        &self.vocabulary
    }

    /// Width of the indicator vector
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.positions.contains_key(label)
    }

    /// Indicator vector for one label set.
    ///
    /// Unknown labels contribute nothing; they are never added to the
    /// vocabulary.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Vec<f64> {
        let mut out = vec![0.0; self.width()];
        self.fill(labels, &mut out);
        out
    }

    /// Append the indicator vector for `labels` to `row`
    pub fn transform_into<S: AsRef<str>>(&self, labels: &[S], row: &mut Vec<f64>) {
        let start = row.len();
        row.resize(start + self.width(), 0.0);
        self.fill(labels, &mut row[start..]);
    }

    fn fill<S: AsRef<str>>(&self, labels: &[S], out: &mut [f64]) {
        for label in labels {
            if let Some(&idx) = self.positions.get(label.as_ref()) {
                out[idx] = 1.0;
            }
        }
    }
}
