// tests/crawl_pacing.rs
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{page_html, ScriptedFetcher};
use job_cluster_notifier::config::SiteConfig;
use job_cluster_notifier::ingest::PACING_DELAY;
use job_cluster_notifier::Crawler;

fn site() -> SiteConfig {
    SiteConfig {
        base_url: "https://jobs.example.test/Find-Jobs".into(),
        ..SiteConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn one_fetch_per_page_in_order_with_pacing() {
    let pages = (1..=3)
        .map(|p| {
            let title = format!("Job {p}");
            Ok(page_html(&[(title.as_str(), "Acme", "Python")]))
        })
        .collect();
    let fetcher = Arc::new(ScriptedFetcher::new(pages));
    let crawler = Crawler::new(fetcher.clone(), site());

    let start = tokio::time::Instant::now();
    let recs = crawler.crawl("data science", 3).await.unwrap();

    assert_eq!(
        fetcher.urls(),
        vec![
            "https://jobs.example.test/Find-Jobs/1/all/India?search=data%20science",
            "https://jobs.example.test/Find-Jobs/2/all/India?search=data%20science",
            "https://jobs.example.test/Find-Jobs/3/all/India?search=data%20science",
        ]
    );
    let titles: Vec<_> = recs.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Job 1", "Job 2", "Job 3"]);

    for pair in fetcher.instants().windows(2) {
        assert!(pair[1] - pair[0] >= PACING_DELAY);
    }
    assert!(start.elapsed() >= PACING_DELAY * 3);
}

#[tokio::test(start_paused = true)]
async fn failed_page_is_skipped_and_crawl_continues() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(page_html(&[("A", "One", "Go")])),
        Err("503 Service Unavailable".into()),
        Ok(page_html(&[("C", "Three", "Rust")])),
    ]));
    let crawler = Crawler::new(fetcher.clone(), site());

    let start = tokio::time::Instant::now();
    let report = crawler.crawl_report("rust", 3).await.unwrap();

    assert_eq!(fetcher.urls().len(), 3);
    assert_eq!(report.failed_pages, vec![2]);
    let titles: Vec<_> = report.postings.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C"]);
    // The delay also follows the failed fetch.
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn empty_pages_give_empty_result() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(page_html(&[]))]));
    let crawler = Crawler::new(fetcher, site());
    let recs = crawler.crawl("nothing", 1).await.unwrap();
    assert!(recs.is_empty());
}

#[tokio::test]
async fn zero_pages_is_rejected() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![]));
    let crawler = Crawler::new(fetcher.clone(), site());
    assert!(crawler.crawl("x", 0).await.is_err());
    assert!(fetcher.urls().is_empty());
}
