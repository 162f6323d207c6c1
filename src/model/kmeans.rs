// src/model/kmeans.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{read_json, ClusterId, ClusterModel, FeatureVector, ModelError};

/// JSON export of a fitted k-means model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansArtifact {
    pub cluster_centers: Vec<Vec<f32>>,
}

/// Nearest-centre assignment over fixed centroids.
#[derive(Debug, Clone)]
pub struct KMeansModel {
    centers: Vec<Vec<f32>>,
    dim: usize,
}

impl KMeansModel {
    pub fn new(centers: Vec<Vec<f32>>) -> Result<Self, ModelError> {
        let dim = match centers.first() {
            Some(c) if !c.is_empty() => c.len(),
            Some(_) => return Err(ModelError::InvalidArtifact("zero-length centre".into())),
            None => return Err(ModelError::Unfitted("k-means model has no centres")),
        };
        if let Some((i, c)) = centers.iter().enumerate().find(|(_, c)| c.len() != dim) {
            return Err(ModelError::InvalidArtifact(format!(
                "centre {i} has dimension {} but centre 0 has {dim}",
                c.len()
            )));
        }
        Ok(Self { centers, dim })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let artifact: KMeansArtifact = read_json(path, "k-means model")?;
        Ok(Self::new(artifact.cluster_centers)?)
    }

    pub fn centers(&self) -> &[Vec<f32>] {
        &self.centers
    }

    /// Closest centre by squared Euclidean distance; ties go to the lower id.
    fn nearest(&self, v: &[f32]) -> ClusterId {
        let mut best = 0usize;
        let mut best_d = f32::INFINITY;
        for (i, c) in self.centers.iter().enumerate() {
            let d: f32 = c.iter().zip(v).map(|(a, b)| (a - b) * (a - b)).sum();
            if d < best_d {
                best = i;
                best_d = d;
            }
        }
        ClusterId(best)
    }
}

impl ClusterModel for KMeansModel {
    fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<ClusterId>, ModelError> {
        if let Some(bad) = vectors.iter().find(|v| v.dim() != self.dim) {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                actual: bad.dim(),
            });
        }
        Ok(vectors.iter().map(|v| self.nearest(v.as_slice())).collect())
    }

    fn n_clusters(&self) -> usize {
        self.centers.len()
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> KMeansModel {
        KMeansModel::new(vec![vec![0.0, 0.0], vec![10.0, 10.0], vec![0.0, 10.0]]).unwrap()
    }

    #[test]
    fn assigns_nearest_centre() {
        let m = model();
        let out = m
            .predict(&[
                FeatureVector::new(vec![1.0, 1.0]),
                FeatureVector::new(vec![9.0, 9.5]),
                FeatureVector::new(vec![0.5, 8.0]),
            ])
            .unwrap();
        assert_eq!(out, vec![ClusterId(0), ClusterId(1), ClusterId(2)]);
    }

    #[test]
    fn ties_break_to_lowest_id() {
        let m = KMeansModel::new(vec![vec![1.0], vec![-1.0]]).unwrap();
        let out = m.predict(&[FeatureVector::new(vec![0.0])]).unwrap();
        assert_eq!(out, vec![ClusterId(0)]);
    }

    #[test]
    fn wrong_dimension_is_fatal() {
        let err = model()
            .predict(&[FeatureVector::new(vec![1.0, 2.0, 3.0])])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn ragged_centres_are_rejected() {
        let err = KMeansModel::new(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
        assert!(matches!(
            KMeansModel::new(vec![]),
            Err(ModelError::Unfitted(_))
        ));
    }
}
