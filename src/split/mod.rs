//! Chapter splitting: turn one textbook PDF into per-chapter PDFs.
//!
//! ## Data Flow
//!
//! ```text
//! toc ──▶ dedup/sort ──▶ pagemap ──▶ map_to_physical ──▶ slicer
//! (LLM)   (by page)      (detect +   (drop unmapped)     (one PDF
//!                         interpolate)                    per range)
//! ```
//!
//! 1. [`toc`]     — find the table of contents and ask the model for the
//!    chapter list (the only stage with network I/O)
//! 2. [`pagemap`] — detect printed page numbers and interpolate the gaps
//! 3. [`slicer`]  — write one sanitised, order-prefixed PDF per chapter
//!
//! Everything is transient: the only artefacts are the chapter files under
//! the output directory.

pub mod pagemap;
pub mod slicer;
pub mod toc;

use crate::client::LlmClient;
use crate::error::ForgeError;
use crate::extract::OpenedPdf;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub use pagemap::{detect_visible_pages, interpolate, PageMap};
pub use slicer::{chapter_filename, sanitize_title, slice_chapters};
pub use toc::{extract_chapters, find_toc_text, parse_chapter_response};

/// A chapter as listed in the table of contents: title plus the page number
/// printed in the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub title: String,
    /// Visible page number (as printed, not the physical index).
    pub page: u32,
}

/// A chapter resolved to its physical starting page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    /// Zero-based physical page index where the chapter starts.
    pub index: usize,
}

/// Result of a successful split.
#[derive(Debug)]
pub struct SplitOutput {
    /// Resolved chapters, in slicing order.
    pub chapters: Vec<Chapter>,
    /// Written chapter files, matching `chapters` one-to-one.
    pub files: Vec<PathBuf>,
}

/// Collapse duplicate page numbers (the last title seen for a page wins)
/// and return entries sorted by page.
pub fn dedup_and_sort(entries: Vec<ChapterEntry>) -> Vec<ChapterEntry> {
    let mut by_page: BTreeMap<u32, String> = BTreeMap::new();
    for entry in entries {
        by_page.insert(entry.page, entry.title);
    }
    by_page
        .into_iter()
        .map(|(page, title)| ChapterEntry { title, page })
        .collect()
}

/// Resolve each entry's visible page through `map`, dropping entries whose
/// visible number has no mapping. Order is preserved — callers pre-sort.
pub fn map_to_physical(entries: &[ChapterEntry], map: &PageMap) -> Vec<Chapter> {
    entries
        .iter()
        .filter_map(|entry| {
            map.get(&entry.page).map(|&index| Chapter {
                title: entry.title.clone(),
                index,
            })
        })
        .collect()
}

/// Split `pdf` into chapter files under `output_dir/<source stem>/`.
///
/// The chapter list comes from the model ([`toc::extract_chapters`]); the
/// rest of the pipeline is deterministic. Use [`split_prepared`] to supply
/// your own chapter list or page map.
pub async fn split_document(
    client: &LlmClient,
    pdf: &OpenedPdf,
    output_dir: &Path,
) -> Result<SplitOutput, ForgeError> {
    let entries = toc::extract_chapters(client, pdf).await?;
    if entries.is_empty() {
        return Err(ForgeError::NoChaptersDetected);
    }
    split_prepared(
        pdf,
        entries,
        None,
        client.config().interpolation_max_gap,
        output_dir,
    )
}

/// Split with a pre-supplied chapter list and optionally a pre-computed
/// page map (detection + interpolation run when `page_map` is `None`).
///
/// No provider calls are made here.
pub fn split_prepared(
    pdf: &OpenedPdf,
    entries: Vec<ChapterEntry>,
    page_map: Option<PageMap>,
    max_gap: u32,
    output_dir: &Path,
) -> Result<SplitOutput, ForgeError> {
    let entries = dedup_and_sort(entries);

    let map = match page_map {
        Some(m) => m,
        None => {
            info!("mapping visible page numbers to physical indices");
            let detected = detect_visible_pages(&pdf.doc);
            interpolate(&detected, max_gap)
        }
    };

    let chapters = map_to_physical(&entries, &map);
    if chapters.is_empty() {
        return Err(ForgeError::NoChaptersMapped);
    }

    let dir = output_dir.join(pdf.stem());
    info!(chapters = chapters.len(), "splitting into {}", dir.display());
    let files = slice_chapters(&pdf.doc, &chapters, &dir)?;

    Ok(SplitOutput { chapters, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, page: u32) -> ChapterEntry {
        ChapterEntry {
            title: title.into(),
            page,
        }
    }

    #[test]
    fn entries_sort_by_page() {
        let sorted = dedup_and_sort(vec![entry("A", 5), entry("B", 2)]);
        assert_eq!(sorted, vec![entry("B", 2), entry("A", 5)]);
    }

    #[test]
    fn duplicate_pages_keep_the_last_title() {
        let deduped = dedup_and_sort(vec![entry("Ch1", 5), entry("Ch2", 5)]);
        assert_eq!(deduped, vec![entry("Ch2", 5)]);
    }

    #[test]
    fn unmapped_entries_are_dropped() {
        let map: PageMap = [(2u32, 1usize), (5, 4)].into_iter().collect();
        let chapters = map_to_physical(&[entry("B", 2), entry("X", 3), entry("A", 5)], &map);
        assert_eq!(
            chapters,
            vec![
                Chapter {
                    title: "B".into(),
                    index: 1
                },
                Chapter {
                    title: "A".into(),
                    index: 4
                },
            ]
        );
    }

    #[test]
    fn ranges_derive_from_sorted_neighbours() {
        // After sorting, A starts at 2 and ends where B starts; B runs to the
        // end of the document. Range arithmetic itself lives in the slicer;
        // this pins the ordering contract it depends on.
        let sorted = dedup_and_sort(vec![entry("A", 5), entry("B", 2)]);
        let map: PageMap = (1..=20u32).map(|v| (v, (v - 1) as usize)).collect();
        let chapters = map_to_physical(&sorted, &map);
        assert_eq!(chapters[0].title, "B");
        assert_eq!(chapters[0].index, 1);
        assert_eq!(chapters[1].title, "A");
        assert_eq!(chapters[1].index, 4);
    }
}
