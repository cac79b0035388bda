//! k-nearest-neighbours classifier loaded from a JSON artifact

use super::{read_artifact, Classifier};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Standardisation applied to a sample before distances are measured.
/// Stored reference points are expected to be scaled already.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct KnnArtifact {
    k: usize,
    points: Vec<Vec<f64>>,
    labels: Vec<i64>,
    #[serde(default)]
    scaler: Option<Scaler>,
}

/// Euclidean distance, uniform weights, majority vote.
///
/// Ties between equally distant points go to the earlier point; ties in
/// the vote go to the smallest label.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    n_features: usize,
    points: Vec<Vec<f64>>,
    labels: Vec<i64>,
    scaler: Option<Scaler>,
}

impl KnnClassifier {
    pub fn new(
        k: usize,
        points: Vec<Vec<f64>>,
        labels: Vec<i64>,
        scaler: Option<Scaler>,
    ) -> Result<Self, ModelError> {
        let n_features = match points.first() {
            Some(p) if !p.is_empty() => p.len(),
            _ => {
                return Err(ModelError::Invalid(
                    "knn model has no reference points".to_string(),
                ))
            }
        };

        if labels.len() != points.len() {
            return Err(ModelError::Invalid(format!(
                "knn model has {} points but {} labels",
                points.len(),
                labels.len()
            )));
        }
        if k == 0 || k > points.len() {
            return Err(ModelError::Invalid(format!(
                "k = {} must be between 1 and {}",
                k,
                points.len()
            )));
        }
        if let Some((idx, _)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| p.len() != n_features || p.iter().any(|v| !v.is_finite()))
        {
            return Err(ModelError::Invalid(format!(
                "reference point {} is malformed",
                idx
            )));
        }
        if let Some(s) = &scaler {
            let usable = s.mean.len() == n_features
                && s.scale.len() == n_features
                && s.scale.iter().all(|v| v.is_finite() && *v != 0.0)
                && s.mean.iter().all(|v| v.is_finite());
            if !usable {
                return Err(ModelError::Invalid("knn scaler is malformed".to_string()));
            }
        }

        Ok(Self {
            k,
            n_features,
            points,
            labels,
            scaler,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let artifact: KnnArtifact = read_artifact(path)?;
        Self::new(artifact.k, artifact.points, artifact.labels, artifact.scaler)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn scaled(&self, features: &[f64]) -> Vec<f64> {
        match &self.scaler {
            Some(s) => features
                .iter()
                .zip(s.mean.iter().zip(&s.scale))
                .map(|(x, (m, sd))| (x - m) / sd)
                .collect(),
            None => features.to_vec(),
        }
    }
}

impl Classifier for KnnClassifier {
    fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let sample = self.scaled(features);
        let mut neighbours: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| {
                let dist: f64 = point
                    .iter()
                    .zip(&sample)
                    .map(|(p, x)| (p - x) * (p - x))
                    .sum();
                (dist, idx)
            })
            .collect();
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for (_, idx) in neighbours.iter().take(self.k) {
            *votes.entry(self.labels[*idx]).or_insert(0) += 1;
        }

        let mut best: Option<(i64, usize)> = None;
        for (label, count) in votes {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }

        best.map(|(label, _)| label)
            .ok_or_else(|| ModelError::Inference("knn produced no votes".to_string()))
    }

    fn name(&self) -> &str {
        "knn"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
