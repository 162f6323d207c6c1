// src/normalize.rs
//! Skill text canonicalization: raw "Key Skills" text → bag-of-tokens string.

use once_cell::sync::Lazy;
use regex::Regex;

// Anything outside lowercase ASCII letters, digits and commas, including runs
// of whitespace.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9,]+").expect("skills regex"));

/// Canonicalize a raw, comma-separated skill list.
///
/// Lower-cases the input, replaces every run of characters outside
/// `[a-z0-9,]` with one space, splits on commas, trims each segment, drops
/// empty segments and rejoins the rest with single spaces. The result never
/// contains a comma or a double space, so normalizing it again is a no-op.
///
/// Dropped characters act as separators rather than being deleted:
/// `"Node.js, CI/CD"` gives `"node js ci cd"`, not `"nodejs cicd"`. A
/// vectorizer fitted on text that had those characters deleted has no
/// column for `node`/`js`, so such terms carry zero weight here. Refit on
/// text produced by this function to keep them.
///
/// ```
/// use job_cluster_notifier::normalize::normalize_skills;
/// assert_eq!(normalize_skills("C++, Data-Science!!"), "c data science");
/// ```
pub fn normalize_skills(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let spaced = DISALLOWED.replace_all(&lowered, " ");
    spaced
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Missing skill text normalizes to the empty string.
pub fn normalize_optional(raw: Option<&str>) -> String {
    raw.map(normalize_skills).unwrap_or_default()
}
