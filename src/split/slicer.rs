//! PDF slicing: one output file per chapter range.

use crate::error::ForgeError;
use crate::split::Chapter;
use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sanitised titles are truncated to this many characters.
const TITLE_LIMIT: usize = 50;

static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\-. ]").unwrap());

/// Replace filesystem-hostile characters with `_` and truncate.
///
/// The allowed set is word characters, `-`, `.`, and space — safe on every
/// mainstream filesystem without escaping.
pub fn sanitize_title(title: &str) -> String {
    RE_UNSAFE.replace_all(title, "_").chars().take(TITLE_LIMIT).collect()
}

/// File name for the `order`-th chapter (1-based).
///
/// The zero-padded numeric prefix keeps directory listings in reading order
/// regardless of how titles sort.
pub fn chapter_filename(order: usize, title: &str) -> String {
    format!("{:02}_{}.pdf", order, sanitize_title(title))
}

/// Write one PDF per chapter under `output_dir`.
///
/// Chapter `i` covers physical pages `[chapters[i].index,
/// chapters[i+1].index)`; the last chapter runs to the end of the document.
/// Two chapters mapped to the same physical page produce an empty PDF for
/// the first — not detected or rejected here.
pub fn slice_chapters(
    doc: &Document,
    chapters: &[Chapter],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, ForgeError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ForgeError::OutputWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let total_pages = doc.get_pages().len();
    let mut written = Vec::with_capacity(chapters.len());

    for (i, chapter) in chapters.iter().enumerate() {
        let start = chapter.index;
        let end = chapters
            .get(i + 1)
            .map(|c| c.index)
            .unwrap_or(total_pages);

        // lopdf numbers pages from 1; keep [start, end), delete the rest.
        let delete: Vec<u32> = (0..total_pages)
            .filter(|&p| p < start || p >= end)
            .map(|p| (p + 1) as u32)
            .collect();

        let mut part = doc.clone();
        if !delete.is_empty() {
            part.delete_pages(&delete);
        }
        part.prune_objects();

        let path = output_dir.join(chapter_filename(i + 1, &chapter.title));
        part.save(&path).map_err(|e| ForgeError::ChapterWrite {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        info!(
            pages = end.saturating_sub(start),
            "saved {}",
            path.display()
        );
        written.push(path);
    }

    Ok(written)
}
