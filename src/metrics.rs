use anyhow::Context;
use axum::{extract::State, routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::ingest::PACING_DELAY;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the fixed pacing delay.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        gauge!("crawl_pacing_delay_ms").set(PACING_DELAY.as_millis() as f64);

        Ok(Self { handle })
    }

    /// `/metrics` scrape endpoint for the crawl (`crawl_*`), extraction
    /// (`extract_blocks_*`) and classification (`classify_postings_total`)
    /// series.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render))
            .with_state(self.handle.clone())
    }
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
