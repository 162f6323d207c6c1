// src/ingest/extract.rs
//! Listing-page extraction: one `PostingRecord` per posting block.
//!
//! Every block is handled independently. A block either yields a record or is
//! skipped with a reason; a bad block never aborts the page. A block that wraps
//! another block (an unclosed container) keeps its own fields, and the wrapped
//! block is extracted on its own.

use metrics::counter;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::ingest::types::PostingRecord;

/// Class marker of the container wrapping a single listing.
pub const BLOCK_CLASS: &str = "ads-details";
/// Path fragment identifying employer profile links.
pub const EMPLOYER_PATH: &str = "Employer-Profile";
/// Label text preceding the skills paragraph.
pub const SKILLS_LABEL: &str = "Key Skills";

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static BLOCK: Lazy<Selector> = Lazy::new(|| sel(&format!("div.{BLOCK_CLASS}")));
static H4: Lazy<Selector> = Lazy::new(|| sel("h4"));
static H2: Lazy<Selector> = Lazy::new(|| sel("h2"));
static EMPLOYER_LINK: Lazy<Selector> =
    Lazy::new(|| sel(&format!(r#"a[href*="{EMPLOYER_PATH}"]"#)));
static SPAN: Lazy<Selector> = Lazy::new(|| sel("span"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| sel("p"));
static SKILLS_BOX: Lazy<Selector> = Lazy::new(|| sel("div.job-skills"));

/// Why a block produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A "Key Skills" label with no paragraph after it and no skills container
    /// to fall back on.
    SkillsParagraphMissing,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SkillsParagraphMissing => {
                write!(f, "'{SKILLS_LABEL}' label has no paragraph and no skills container")
            }
        }
    }
}

/// Result of extracting one block, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Extracted(PostingRecord),
    Skipped { index: usize, reason: SkipReason },
}

/// Extract every block on the page, keeping skipped ones visible.
pub fn extract_blocks(page: &str) -> Vec<BlockOutcome> {
    let doc = Html::parse_document(page);
    doc.select(&BLOCK)
        .enumerate()
        .map(|(index, block)| match extract_block(block) {
            Ok(rec) => BlockOutcome::Extracted(rec),
            Err(reason) => BlockOutcome::Skipped { index, reason },
        })
        .collect()
}

/// Extract the records of a page; skipped blocks are logged and counted.
pub fn extract_postings(page: &str) -> Vec<PostingRecord> {
    let outcomes = extract_blocks(page);
    counter!("extract_blocks_total").increment(outcomes.len() as u64);

    let mut out = Vec::with_capacity(outcomes.len());
    for o in outcomes {
        match o {
            BlockOutcome::Extracted(rec) => out.push(rec),
            BlockOutcome::Skipped { index, reason } => {
                warn!(target: "extract", block = index, %reason, "posting block skipped");
                counter!("extract_blocks_skipped_total").increment(1);
            }
        }
    }
    out
}

fn extract_block(block: ElementRef<'_>) -> Result<PostingRecord, SkipReason> {
    let own = own_elements(block);

    let title = first(&own, &H4)
        .or_else(|| first(&own, &H2))
        .map(stripped_text)
        .unwrap_or_default();

    let company = first(&own, &EMPLOYER_LINK)
        .map(stripped_text)
        .unwrap_or_default();

    let labeled = labeled_skills(&own);
    let mut raw_skills = labeled.clone().flatten().unwrap_or_default();
    if raw_skills.is_empty() {
        match first(&own, &SKILLS_BOX) {
            Some(el) => raw_skills = stripped_text(el),
            None if labeled == Some(None) => return Err(SkipReason::SkillsParagraphMissing),
            None => {}
        }
    }

    Ok(PostingRecord {
        title,
        company,
        raw_skills,
    })
}

/// Elements of `block` in document order, leaving out the subtrees of any
/// posting blocks nested inside it.
fn own_elements(block: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut out = Vec::new();
    let mut stack: Vec<ElementRef<'_>> = block.children().filter_map(ElementRef::wrap).collect();
    stack.reverse();
    while let Some(el) = stack.pop() {
        if BLOCK.matches(&el) {
            continue;
        }
        out.push(el);
        let mut children: Vec<_> = el.children().filter_map(ElementRef::wrap).collect();
        children.reverse();
        stack.extend(children);
    }
    out
}

fn first<'a>(own: &[ElementRef<'a>], selector: &Selector) -> Option<ElementRef<'a>> {
    own.iter().copied().find(|el| selector.matches(el))
}

/// Primary skills path: the first `<p>` after the "Key Skills" label.
///
/// `None` when the block has no label, `Some(None)` when the label is there
/// but nothing follows it.
fn labeled_skills(own: &[ElementRef<'_>]) -> Option<Option<String>> {
    let pos = own.iter().position(|s| {
        SPAN.matches(s) && stripped_text(*s).trim_end_matches(':').trim() == SKILLS_LABEL
    })?;
    Some(
        own[pos + 1..]
            .iter()
            .find(|el| PARAGRAPH.matches(el))
            .map(|p| stripped_text(*p)),
    )
}

/// Text nodes trimmed, empties dropped, joined with single spaces.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
