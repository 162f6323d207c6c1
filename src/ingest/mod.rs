// src/ingest/mod.rs
pub mod extract;
pub mod fetch;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{info, warn};

use crate::config::pipeline::SiteConfig;
use crate::ingest::types::{PageFetcher, PostingRecord};

/// Pause after every page fetch, successful or not.
pub const PACING_DELAY: Duration = Duration::from_secs(1);

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("crawl_pages_total", "Listing pages requested.");
        describe_counter!("crawl_page_errors_total", "Listing pages that failed to fetch.");
        describe_counter!("extract_blocks_total", "Posting blocks found on fetched pages.");
        describe_counter!(
            "extract_blocks_skipped_total",
            "Posting blocks dropped because their skills could not be read."
        );
        describe_histogram!("crawl_fetch_ms", "Page fetch time in milliseconds.");
    });
}

// RFC 3986 unreserved characters pass through; everything else, space
// included, is percent-encoded.
const KEYWORD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a search keyword for the query string. Spaces become `%20`.
pub fn encode_keyword(keyword: &str) -> String {
    utf8_percent_encode(keyword, KEYWORD_ENCODE_SET).to_string()
}

/// `<base>/<page>/all/<region>?search=<keyword>`
pub fn page_url(site: &SiteConfig, keyword: &str, page: u32) -> String {
    format!(
        "{}/{}/all/{}?search={}",
        site.base_url,
        page,
        site.region,
        encode_keyword(keyword)
    )
}

/// Outcome of a crawl: records in page-then-block order plus the pages that
/// could not be fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CrawlReport {
    pub postings: Vec<PostingRecord>,
    pub failed_pages: Vec<u32>,
}

/// Walks the result pages of one keyword, one page at a time.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    site: SiteConfig,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, site: SiteConfig) -> Self {
        Self { fetcher, site }
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Crawl pages `1..=page_count`. A page that fails to fetch is logged and
    /// skipped; the remaining pages are still crawled.
    pub async fn crawl_report(&self, keyword: &str, page_count: u32) -> Result<CrawlReport> {
        if page_count == 0 {
            bail!("page_count must be at least 1");
        }
        ensure_metrics_described();

        let mut report = CrawlReport::default();
        for page in 1..=page_count {
            let url = page_url(&self.site, keyword, page);
            counter!("crawl_pages_total").increment(1);

            match self.fetcher.fetch(&url).await {
                Ok(body) => {
                    let mut recs = extract::extract_postings(&body);
                    info!(target: "crawl", page, count = recs.len(), "page extracted");
                    report.postings.append(&mut recs);
                }
                Err(e) => {
                    warn!(
                        target: "crawl",
                        page,
                        %url,
                        error = ?e,
                        fetcher = self.fetcher.name(),
                        "page fetch failed, skipping"
                    );
                    counter!("crawl_page_errors_total").increment(1);
                    report.failed_pages.push(page);
                }
            }

            tokio::time::sleep(PACING_DELAY).await;
        }

        info!(
            target: "crawl",
            keyword,
            pages = page_count,
            postings = report.postings.len(),
            failed = report.failed_pages.len(),
            "crawl finished"
        );
        Ok(report)
    }

    /// Crawl and return only the records.
    pub async fn crawl(&self, keyword: &str, page_count: u32) -> Result<Vec<PostingRecord>> {
        Ok(self.crawl_report(keyword, page_count).await?.postings)
    }
}
