// tests/common/mod.rs
// Shared builders for integration tests: a small fitted model pair and
// in-memory page fetchers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use job_cluster_notifier::model::{KMeansModel, TfidfVectorizer};
use job_cluster_notifier::{PageFetcher, PipelineContext};

pub const VOCAB: [&str; 6] = ["python", "sql", "java", "spring", "figma", "photoshop"];

/// K=3: data (python/sql), backend (java/spring), design (figma/photoshop).
pub fn three_cluster_context() -> PipelineContext {
    let vocabulary: HashMap<String, usize> = VOCAB
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();
    let vectorizer = TfidfVectorizer::from_parts(vocabulary, vec![1.0; VOCAB.len()]).unwrap();
    let h = std::f32::consts::FRAC_1_SQRT_2;
    let model = KMeansModel::new(vec![
        vec![h, h, 0.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, h, h, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, h, h],
    ])
    .unwrap();
    PipelineContext::new(Arc::new(vectorizer), Arc::new(model)).unwrap()
}

/// One listing page with a block per `(title, company, skills)`.
pub fn page_html(blocks: &[(&str, &str, &str)]) -> String {
    let mut html = String::from("<html><body><div class=\"list\">");
    for (title, company, skills) in blocks {
        html.push_str(&format!(
            r#"<div class="ads-details"><h4>{title}</h4><a href="/Employer-Profile/{slug}">{company}</a><span>Key Skills</span><p>{skills}</p></div>"#,
            slug = company.to_lowercase().replace(' ', "-"),
        ));
    }
    html.push_str("</div></body></html>");
    html
}

/// Serves pages by 1-based index (parsed from the URL path) and records
/// every requested URL with the (possibly paused) clock reading.
pub struct ScriptedFetcher {
    pages: HashMap<u32, Result<String, String>>,
    calls: Mutex<Vec<(String, tokio::time::Instant)>>,
}

impl ScriptedFetcher {
    pub fn new(pages: Vec<Result<String, String>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, p)| (i as u32 + 1, p))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect()
    }

    pub fn instants(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

fn page_index(url: &str) -> Option<u32> {
    // <base>/<page>/all/<region>?search=...
    let path = url.split('?').next()?;
    let mut parts = path.rsplit('/');
    parts.next()?; // region
    parts.next()?; // "all"
    parts.next()?.parse().ok()
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), tokio::time::Instant::now()));
        let idx = page_index(url).ok_or_else(|| anyhow!("unexpected url {url}"))?;
        match self.pages.get(&idx) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(e)) => Err(anyhow!("{e}")),
            None => Err(anyhow!("no page {idx}")),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
