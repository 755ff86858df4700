//! Table-of-contents discovery and LLM chapter extraction.
//!
//! The TOC page is located by a plain substring scan over the document's
//! leading pages. The chapter list itself comes from the model: TOC layouts
//! vary too much (dot leaders, column breaks, nested numbering) for a regex
//! to survive contact with real textbooks. The model is asked for a JSON
//! object mapping chapter title to printed page number; parsing failures are
//! typed errors so callers can tell "no chapters" from "garbage response".

use crate::client::LlmClient;
use crate::error::ForgeError;
use crate::extract::{self, OpenedPdf};
use crate::prompts;
use crate::split::ChapterEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// TOC text sent to the model is truncated to this many characters.
const TOC_SAMPLE_LIMIT: usize = 8_000;

/// A continuation page must carry this much text to be included.
const CONTINUATION_MIN_CHARS: usize = 100;

/// Find the table-of-contents text within the first `scan_pages` pages.
///
/// Returns the text of the first page mentioning "contents", plus the next
/// page when it looks like a TOC continuation (more than a trivial amount
/// of text).
pub fn find_toc_text(pdf: &OpenedPdf, scan_pages: usize) -> Option<String> {
    let pages: Vec<u32> = pdf.doc.get_pages().keys().copied().collect();
    let mut texts = Vec::new();

    for (i, page_no) in pages.iter().take(scan_pages).enumerate() {
        let Some(text) = extract::page_text(&pdf.doc, *page_no) else {
            continue;
        };
        if text.to_lowercase().contains("contents") {
            texts.push(text);
            if let Some(next_no) = pages.get(i + 1) {
                if let Some(next_text) = extract::page_text(&pdf.doc, *next_no) {
                    if next_text.trim().len() > CONTINUATION_MIN_CHARS {
                        texts.push(next_text);
                    }
                }
            }
            break;
        }
    }

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n\n"))
    }
}

/// Ask the model for the chapter list of `pdf`.
///
/// Entries are returned in response order, un-deduplicated and unsorted —
/// [`crate::split::dedup_and_sort`] handles both.
pub async fn extract_chapters(
    client: &LlmClient,
    pdf: &OpenedPdf,
) -> Result<Vec<ChapterEntry>, ForgeError> {
    let scan_pages = client.config().toc_scan_pages;
    let toc_text = find_toc_text(pdf, scan_pages).ok_or_else(|| ForgeError::TocNotFound {
        path: pdf.path().to_path_buf(),
    })?;

    let sample: String = toc_text.chars().take(TOC_SAMPLE_LIMIT).collect();
    let completion = client
        .complete_prompt(&prompts::toc_prompt(&sample), None)
        .await?;

    let entries = parse_chapter_response(&completion.text)?;
    info!(chapters = entries.len(), "extracted chapter list");
    Ok(entries)
}

static RE_JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]+?\}").unwrap());

// Matches one `"Title": 123` entry line, with an optional trailing
// parenthetical the model sometimes appends, e.g. `"Intro": 12 (page 12),`.
static RE_ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*"[^"]+"\s*:\s*)(\d+)(\s*\([^)]+\))?\s*,?\s*$"#).unwrap()
});

static RE_TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*\})").unwrap());

/// Parse the model's TOC response into chapter entries.
///
/// The first `{...}` block is extracted, each entry line normalised (page
/// annotations stripped), trailing commas removed, then the block parsed as
/// JSON. Values that are not non-negative integers are dropped — a title
/// with no plausible page is useless for slicing. An absent or unparseable
/// block is a [`ForgeError::ChapterParse`]; a parseable block with zero
/// usable entries is `Ok(vec![])`.
pub fn parse_chapter_response(response: &str) -> Result<Vec<ChapterEntry>, ForgeError> {
    let block = RE_JSON_OBJECT
        .find(response)
        .ok_or_else(|| ForgeError::ChapterParse {
            detail: "no JSON object found in response".into(),
        })?
        .as_str();

    let cleaned: Vec<String> = block
        .lines()
        .map(|line| match RE_ENTRY_LINE.captures(line) {
            Some(caps) => format!("{}{},", &caps[1], &caps[2]),
            None => line.to_string(),
        })
        .collect();
    let cleaned = RE_TRAILING_COMMA
        .replace_all(&cleaned.join("\n"), "$1")
        .into_owned();

    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&cleaned)
        .map_err(|e| {
            debug!("unparseable chapter block:\n{cleaned}");
            ForgeError::ChapterParse {
                detail: e.to_string(),
            }
        })?;

    let entries = object
        .into_iter()
        .filter_map(|(title, value)| {
            value
                .as_u64()
                .and_then(|p| u32::try_from(p).ok())
                .map(|page| ChapterEntry { title, page })
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_object_parses() {
        let response = r#"Here is the chapter list:
{
    "1. Introduction": 1,
    "2. Thermodynamics": 25,
    "3. Waves": 61
}
Hope that helps!"#;
        let entries = parse_chapter_response(response).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "1. Introduction");
        assert_eq!(entries[0].page, 1);
        assert_eq!(entries[2].page, 61);
    }

    #[test]
    fn page_annotations_and_trailing_commas_are_tolerated() {
        let response = r#"{
    "1. Cells": 5 (page 5),
    "2. Genetics": 40 (approx.),
}"#;
        let entries = parse_chapter_response(response).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].page, 40);
    }

    #[test]
    fn response_without_object_is_a_parse_error() {
        let err = parse_chapter_response("Sorry, I cannot find a table of contents.").unwrap_err();
        assert!(matches!(err, ForgeError::ChapterParse { .. }));
    }

    #[test]
    fn malformed_object_is_a_parse_error() {
        let err = parse_chapter_response(r#"{"broken: 12"#).unwrap_err();
        assert!(matches!(err, ForgeError::ChapterParse { .. }));
    }

    #[test]
    fn non_integer_pages_are_dropped_not_fatal() {
        let response = r#"{
    "1. Real": 10,
    "2. Unknown": "n/a"
}"#;
        let entries = parse_chapter_response(response).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "1. Real");
    }

    #[test]
    fn entries_keep_response_order() {
        let response = r#"{"B later": 30, "A earlier": 10}"#;
        let entries = parse_chapter_response(response).unwrap();
        assert_eq!(entries[0].title, "B later");
        assert_eq!(entries[1].title, "A earlier");
    }
}
