//! Document input: resolve a path or URL to a parsed PDF and pull text out.
//!
//! URL inputs are downloaded into a [`TempDir`] that lives as long as the
//! returned [`OpenedPdf`], mirroring the transient-upload lifecycle: nothing
//! persists once the value is dropped. The `%PDF` magic is validated before
//! parsing so callers get a meaningful error instead of a parser backtrace.
//!
//! Text extraction degrades per page: a page whose content stream cannot be
//! decoded yields empty text and a warning, and processing continues with
//! whatever was extracted.

use crate::error::ForgeError;
use lopdf::Document;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// A parsed PDF plus the provenance of its bytes.
#[derive(Debug)]
pub struct OpenedPdf {
    /// The parsed document.
    pub doc: Document,
    /// Path the bytes came from (inside a temp dir for URL inputs).
    path: PathBuf,
    /// Keeps a downloaded file alive until the document is dropped.
    _temp_dir: Option<TempDir>,
}

impl OpenedPdf {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source file name without the `.pdf` extension, for output naming.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve `input` (local path or HTTP/HTTPS URL) and parse it as a PDF.
pub async fn open_pdf(input: &str) -> Result<OpenedPdf, ForgeError> {
    if is_url(input) {
        open_url(input).await
    } else {
        open_local(Path::new(input))
    }
}

/// Parse an in-memory PDF, validating the magic bytes first.
///
/// `origin` is used for error reporting and output naming only.
pub fn open_bytes(bytes: &[u8], origin: &Path) -> Result<OpenedPdf, ForgeError> {
    check_magic(bytes, origin)?;
    let doc = Document::load_mem(bytes).map_err(|e| ForgeError::PdfParse {
        path: origin.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(pages = doc.get_pages().len(), "parsed PDF: {}", origin.display());
    Ok(OpenedPdf {
        doc,
        path: origin.to_path_buf(),
        _temp_dir: None,
    })
}

fn open_local(path: &Path) -> Result<OpenedPdf, ForgeError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ForgeError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(ForgeError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    };
    open_bytes(&bytes, path)
}

async fn open_url(url: &str) -> Result<OpenedPdf, ForgeError> {
    info!("downloading PDF from {url}");
    let response = reqwest::get(url)
        .await
        .map_err(|e| ForgeError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if !response.status().is_success() {
        return Err(ForgeError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ForgeError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let temp_dir = TempDir::new().map_err(|e| ForgeError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(url_filename(url));
    std::fs::write(&file_path, &bytes).map_err(|source| ForgeError::OutputWrite {
        path: file_path.clone(),
        source,
    })?;

    let mut opened = open_bytes(&bytes, &file_path)?;
    opened._temp_dir = Some(temp_dir);
    Ok(opened)
}

fn check_magic(bytes: &[u8], path: &Path) -> Result<(), ForgeError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        for (i, b) in bytes.iter().take(4).enumerate() {
            magic[i] = *b;
        }
        return Err(ForgeError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Derive a filename from the final URL path segment.
fn url_filename(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && s.contains('.'))
        .map(|s| s.to_string())
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

/// Extract the text of one page (1-based page number).
///
/// Extraction failures degrade to `None` with a warning; callers continue
/// with the pages that did decode.
pub fn page_text(doc: &Document, page_no: u32) -> Option<String> {
    match doc.extract_text(&[page_no]) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(page = page_no, "text extraction failed: {e}");
            None
        }
    }
}

/// Extract the whole document's text, pages joined with newlines.
///
/// Pages that fail to decode contribute nothing; the result may be empty.
pub fn full_text(doc: &Document) -> String {
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut parts = Vec::with_capacity(pages.len());
    for page_no in pages {
        if let Some(text) = page_text(doc, page_no) {
            parts.push(text);
        }
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com/book.pdf"));
        assert!(is_url("http://example.com/book.pdf"));
        assert!(!is_url("/tmp/book.pdf"));
        assert!(!is_url("book.pdf"));
    }

    #[test]
    fn url_filename_extraction() {
        assert_eq!(url_filename("https://x.org/a/chapter1.pdf"), "chapter1.pdf");
        assert_eq!(url_filename("https://x.org/paper"), "downloaded.pdf");
        assert_eq!(url_filename("https://x.org/"), "downloaded.pdf");
    }

    #[test]
    fn non_pdf_bytes_are_rejected() {
        let err = open_bytes(b"<html>nope</html>", Path::new("x.pdf")).unwrap_err();
        match err {
            ForgeError::NotAPdf { magic, .. } => assert_eq!(&magic, b"<htm"),
            other => panic!("expected NotAPdf, got {other}"),
        }
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(open_bytes(b"%P", Path::new("x.pdf")).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = open_local(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, ForgeError::FileNotFound { .. }));
    }
}
