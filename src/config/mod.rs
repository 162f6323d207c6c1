// src/config/mod.rs
pub mod pipeline;

pub use pipeline::{ModelPaths, PipelineConfig, ServerConfig, SiteConfig};
