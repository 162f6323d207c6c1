// src/pipeline.rs
//! normalize → vectorize → predict over a batch of scraped postings, and
//! filtering of the classified batch by cluster.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::pipeline::ModelPaths;
use crate::ingest::types::PostingRecord;
use crate::model::{
    ClusterId, ClusterModel, KMeansModel, ModelError, ModelInfo, TfidfVectorizer, Vectorizer,
};
use crate::normalize::normalize_skills;

/// A posting with its normalized skills and assigned cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedPosting {
    pub title: String,
    pub company: String,
    pub raw_skills: String,
    pub normalized_skills: String,
    pub cluster_id: ClusterId,
}

/// Title/company view of a matched posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedJob {
    pub title: String,
    pub company: String,
}

/// Loaded models, read-only and shared across runs.
#[derive(Clone)]
pub struct PipelineContext {
    vectorizer: Arc<dyn Vectorizer>,
    model: Arc<dyn ClusterModel>,
}

impl PipelineContext {
    /// Pairs a vectorizer with a clustering model. Fails when their
    /// dimensions disagree, before anything is classified.
    pub fn new(
        vectorizer: Arc<dyn Vectorizer>,
        model: Arc<dyn ClusterModel>,
    ) -> Result<Self, ModelError> {
        if model.n_clusters() == 0 {
            return Err(ModelError::Unfitted("clustering model has no clusters"));
        }
        if vectorizer.dimension() != model.dimension() {
            return Err(ModelError::DimensionMismatch {
                expected: model.dimension(),
                actual: vectorizer.dimension(),
            });
        }
        Ok(Self { vectorizer, model })
    }

    /// Load both JSON exports.
    pub fn load(paths: &ModelPaths) -> Result<Self> {
        let vectorizer = TfidfVectorizer::load(&paths.vectorizer_path)?;
        let model = KMeansModel::load(&paths.kmeans_path)?;
        let ctx = Self::new(Arc::new(vectorizer), Arc::new(model))?;
        info!(
            n_clusters = ctx.n_clusters(),
            dimension = ctx.dimension(),
            "models loaded"
        );
        Ok(ctx)
    }

    pub fn n_clusters(&self) -> usize {
        self.model.n_clusters()
    }

    pub fn dimension(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            n_clusters: self.n_clusters(),
            dimension: self.dimension(),
        }
    }

    /// Normalize, vectorize and assign every posting. Output order matches
    /// input order. Any model failure aborts the whole batch.
    pub fn classify(
        &self,
        postings: &[PostingRecord],
    ) -> Result<Vec<ClassifiedPosting>, ModelError> {
        if postings.is_empty() {
            return Ok(Vec::new());
        }

        let normalized: Vec<String> = postings
            .iter()
            .map(|p| normalize_skills(&p.raw_skills))
            .collect();

        let vectors = self.vectorizer.transform(&normalized)?;
        if vectors.len() != postings.len() {
            return Err(ModelError::LengthMismatch {
                expected: postings.len(),
                actual: vectors.len(),
            });
        }

        let ids = self.model.predict(&vectors)?;
        if ids.len() != postings.len() {
            return Err(ModelError::LengthMismatch {
                expected: postings.len(),
                actual: ids.len(),
            });
        }

        let k = self.n_clusters();
        if let Some(bad) = ids.iter().find(|id| id.0 >= k) {
            return Err(ModelError::ClusterOutOfRange {
                id: bad.0,
                n_clusters: k,
            });
        }

        let out: Vec<ClassifiedPosting> = postings
            .iter()
            .zip(normalized)
            .zip(ids)
            .map(|((p, normalized_skills), cluster_id)| ClassifiedPosting {
                title: p.title.clone(),
                company: p.company.clone(),
                raw_skills: p.raw_skills.clone(),
                normalized_skills,
                cluster_id,
            })
            .collect();

        counter!("classify_postings_total").increment(out.len() as u64);
        debug!(target: "classify", count = out.len(), "postings classified");
        Ok(out)
    }
}

/// Postings assigned to `wanted`, in their original order. Empty when none match.
pub fn match_cluster(postings: &[ClassifiedPosting], wanted: ClusterId) -> Vec<ClassifiedPosting> {
    postings
        .iter()
        .filter(|p| p.cluster_id == wanted)
        .cloned()
        .collect()
}

pub fn project(postings: &[ClassifiedPosting]) -> Vec<MatchedJob> {
    postings
        .iter()
        .map(|p| MatchedJob {
            title: p.title.clone(),
            company: p.company.clone(),
        })
        .collect()
}

/// Sorted, distinct cluster ids present in a batch.
pub fn cluster_summary(postings: &[ClassifiedPosting]) -> Vec<ClusterId> {
    postings
        .iter()
        .map(|p| p.cluster_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
