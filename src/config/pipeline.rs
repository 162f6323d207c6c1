// src/config/pipeline.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/pipeline.toml";
pub const DEFAULT_JSON_PATH: &str = "config/pipeline.json";

fn default_base_url() -> String {
    "https://www.karkidi.com/Find-Jobs".to_string()
}
fn default_region() -> String {
    "India".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_pages() -> u32 {
    5
}
fn default_vectorizer_path() -> PathBuf {
    PathBuf::from("models/tfidf_vectorizer.json")
}
fn default_kmeans_path() -> PathBuf {
    PathBuf::from("models/kmeans_model.json")
}
fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

/// Listing site the crawler targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on pages per request accepted by the API.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            region: default_region(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

/// Locations of the fitted model exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPaths {
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: PathBuf,
    #[serde(default = "default_kmeans_path")]
    pub kmeans_path: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            vectorizer_path: default_vectorizer_path(),
            kmeans_path: default_kmeans_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub model: ModelPaths,
    #[serde(default)]
    pub server: ServerConfig,
}

impl PipelineConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = match ext.as_str() {
            "json" => serde_json::from_str::<PipelineConfig>(&content)
                .with_context(|| format!("parsing json config {}", path.display()))?,
            _ => toml::from_str::<PipelineConfig>(&content)
                .with_context(|| format!("parsing toml config {}", path.display()))?,
        };
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $PIPELINE_CONFIG_PATH
    /// 2) config/pipeline.toml
    /// 3) config/pipeline.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PIPELINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_PIPELINE_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON_PATH);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Blank strings fall back to defaults, `max_pages` is at least 1 and the
    /// base URL carries no trailing slash.
    pub fn sanitized(mut self) -> Self {
        let site = &mut self.site;
        site.base_url = site.base_url.trim().trim_end_matches('/').to_string();
        if site.base_url.is_empty() {
            site.base_url = default_base_url();
        }
        site.region = site.region.trim().to_string();
        if site.region.is_empty() {
            site.region = default_region();
        }
        if site.user_agent.trim().is_empty() {
            site.user_agent = default_user_agent();
        }
        if site.timeout_secs == 0 {
            site.timeout_secs = default_timeout_secs();
        }
        site.max_pages = site.max_pages.max(1);

        if self.server.bind.trim().is_empty() {
            self.server.bind = default_bind();
        }
        self
    }
}
