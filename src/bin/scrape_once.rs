//! One-shot run from the terminal: crawl, classify, print the postings of one cluster.
//!
//! Usage: `scrape_once [keyword] [pages] [cluster]`

use std::sync::Arc;

use job_cluster_notifier::config::PipelineConfig;
use job_cluster_notifier::ingest::fetch::HttpPageFetcher;
use job_cluster_notifier::pipeline::{cluster_summary, project};
use job_cluster_notifier::{match_cluster, ClusterId, Crawler, PipelineContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let mut args = std::env::args().skip(1);
    let keyword = args.next().unwrap_or_else(|| "data science".to_string());
    let pages: u32 = args.next().map(|s| s.parse::<u32>()).transpose()?.unwrap_or(1);
    let wanted = args.next().map(|s| s.parse::<usize>()).transpose()?;

    let cfg = PipelineConfig::load_default()?;
    let ctx = PipelineContext::load(&cfg.model)?;
    let crawler = Crawler::new(Arc::new(HttpPageFetcher::new(&cfg.site)?), cfg.site.clone());

    let report = crawler.crawl_report(&keyword, pages).await?;
    if report.postings.is_empty() {
        println!("No postings found for '{keyword}'.");
        return Ok(());
    }

    let classified = ctx.classify(&report.postings)?;
    let clusters = cluster_summary(&classified);
    println!(
        "Found {} jobs; clusters present: {:?} (model has {})",
        classified.len(),
        clusters.iter().map(|c| c.0).collect::<Vec<_>>(),
        ctx.n_clusters()
    );
    if !report.failed_pages.is_empty() {
        println!("Pages that failed to load: {:?}", report.failed_pages);
    }

    let wanted = ClusterId(wanted.unwrap_or_else(|| clusters[0].0));
    let jobs = project(&match_cluster(&classified, wanted));
    if jobs.is_empty() {
        println!("No jobs found in cluster {wanted}.");
    } else {
        println!("Jobs in cluster {wanted}:");
        for j in jobs {
            println!("  {} at {}", j.title, j.company);
        }
    }
    Ok(())
}
