//! Job cluster service: binary entrypoint.
//! Loads config and the fitted models, then serves the pipeline over HTTP.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_cluster_notifier::api::{self, AppState};
use job_cluster_notifier::config::PipelineConfig;
use job_cluster_notifier::ingest::fetch::HttpPageFetcher;
use job_cluster_notifier::metrics::Metrics;
use job_cluster_notifier::{Crawler, PipelineContext};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::load_default()?;

    // Missing or inconsistent models are fatal: nothing can be classified.
    let ctx = PipelineContext::load(&cfg.model).context("loading fitted models")?;

    let fetcher = HttpPageFetcher::new(&cfg.site)?;
    let crawler = Crawler::new(Arc::new(fetcher), cfg.site.clone());
    let metrics = Metrics::init()?;

    let state = AppState {
        ctx,
        crawler: Arc::new(crawler),
    };
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("binding {}", cfg.server.bind))?;
    info!(bind = %cfg.server.bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
