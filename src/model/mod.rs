// src/model/mod.rs
//! Inference-only boundary to the fitted text model: a vectorizer that turns
//! normalized skill text into feature vectors and a clustering model that
//! assigns each vector a cluster id. Nothing here re-fits anything.

pub mod kmeans;
pub mod tfidf;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub use kmeans::KMeansModel;
pub use tfidf::TfidfVectorizer;

/// Fatal model failures. These indicate a setup defect, not a bad posting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model is not fitted: {0}")]
    Unfitted(&'static str),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("cluster id {id} outside 0..{n_clusters}")]
    ClusterOutOfRange { id: usize, n_clusters: usize },

    #[error("model returned {actual} results for {expected} inputs")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Identifier of a pre-trained cluster, in `0..K`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClusterId(pub usize);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense term-weight vector. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(data: Vec<f32>) -> Self {
        Self(data)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Maps normalized texts to fixed-dimension vectors using a fitted vocabulary.
pub trait Vectorizer: Send + Sync {
    fn transform(&self, texts: &[String]) -> Result<Vec<FeatureVector>, ModelError>;
    /// Size of the fitted vocabulary.
    fn dimension(&self) -> usize;
}

/// Assigns a cluster id to each vector. Must be deterministic.
pub trait ClusterModel: Send + Sync {
    fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<ClusterId>, ModelError>;
    fn n_clusters(&self) -> usize;
    /// Dimension of the vectors the model was fitted on.
    fn dimension(&self) -> usize;
}

/// Read and deserialize a JSON model export.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {what} {}", path.display()))
}

/// Fitted shape of a loaded model pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelInfo {
    pub n_clusters: usize,
    pub dimension: usize,
}
