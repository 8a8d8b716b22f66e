//! Bounded plain-text digest of a crawl result.

use super::types::{CrawlResult, Page};
use std::fmt::Write as _;

/// Line appended when a page body hits its cap.
pub const TRUNCATION_MARKER: &str = "...<truncated>...";

const MAX_HEADINGS: usize = 30;
const MAX_LINKS: usize = 40;

/// How much of each page to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestMode {
    /// Up to ten pages with short text previews.
    Crawl,
    /// A single page with its full text.
    Fetch,
}

impl DigestMode {
    fn max_pages(self) -> usize {
        match self {
            Self::Crawl => 10,
            Self::Fetch => 1,
        }
    }

    fn max_chars(self) -> usize {
        match self {
            Self::Crawl => 2_000,
            Self::Fetch => 25_000,
        }
    }

    fn body_label(self) -> &'static str {
        match self {
            Self::Crawl => "textPreview:",
            Self::Fetch => "text:",
        }
    }
}

/// Render `result` as a digest. Pure; never fails.
pub fn shape(result: &CrawlResult, mode: DigestMode) -> String {
    let mut out = String::new();
    let started_at = result.started_at.as_deref().unwrap_or("unknown");
    let count = result.count.unwrap_or(result.pages.len() as u64);
    let _ = writeln!(out, "startedAt: {started_at}");
    let _ = writeln!(out, "count: {count}");
    out.push('\n');

    for (i, page) in result.pages.iter().take(mode.max_pages()).enumerate() {
        push_page(&mut out, i + 1, page, mode);
    }

    out.trim().to_owned()
}

fn push_page(out: &mut String, index: usize, page: &Page, mode: DigestMode) {
    let _ = writeln!(out, "[{index}] {}", page.url);
    let _ = writeln!(out, "status: {}", render_status(&page.status));

    for (label, value) in [
        ("title", &page.title),
        ("h1", &page.h1),
        ("metaDescription", &page.meta_description),
    ] {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "{label}: {v}");
        }
    }

    if !page.headings.is_empty() {
        out.push_str("headings:\n");
        for heading in page.headings.iter().take(MAX_HEADINGS) {
            let _ = writeln!(out, "  - {heading}");
        }
    }

    let (body, truncated) = truncate_chars(&page.text, mode.max_chars());
    if !body.is_empty() {
        out.push_str(mode.body_label());
        out.push('\n');
        out.push_str(body);
        out.push('\n');
        if truncated {
            out.push_str(TRUNCATION_MARKER);
            out.push('\n');
        }
    }

    if !page.links.is_empty() {
        out.push_str("links:\n");
        for link in page.links.iter().take(MAX_LINKS) {
            let _ = writeln!(out, "  - {link}");
        }
    }

    out.push('\n');
}

fn render_status(status: &serde_json::Value) -> String {
    match status {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First `max` characters of `text`, and whether anything was cut.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
