// src/lib.rs
// Public library surface for the binary, integration tests and reuse.

pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::ingest::types::{PageFetcher, PostingRecord};
pub use crate::ingest::{CrawlReport, Crawler};
pub use crate::model::{ClusterId, FeatureVector, ModelError};
pub use crate::normalize::normalize_skills;
pub use crate::pipeline::{match_cluster, ClassifiedPosting, MatchedJob, PipelineContext};
