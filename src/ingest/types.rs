// src/ingest/types.rs
use anyhow::Result;

/// One listing block as found on a results page. Missing markup yields empty
/// strings, never an absent field.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct PostingRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub raw_skills: String,
}

/// Fetches the body of one listing page.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}
