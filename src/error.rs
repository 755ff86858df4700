//! Error types for the studyforge library.
//!
//! One crate-wide [`ForgeError`] covers every failure mode. Parsing helpers
//! return `Result<_, ForgeError>` so a valid-but-empty result (`Ok(vec![])`)
//! is never conflated with a parse failure — callers that want the old
//! "empty on failure" behaviour can `.unwrap_or_default()` explicitly.
//!
//! Batch flashcard generation does not abort on the first bad document;
//! per-document failures are carried as `Err(ForgeError)` entries inside
//! [`crate::generate::flashcards::BatchOutcome`] so callers can inspect
//! partial success.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the studyforge library.
#[derive(Debug, Error)]
pub enum ForgeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("file is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// HTTP URL was syntactically valid but download failed.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Text submitted for generation was empty or whitespace-only.
    ///
    /// Rejected before any provider call is made.
    #[error("input text is empty — nothing to generate from")]
    EmptyInput,

    /// A directory given as flashcard input contained no PDF files.
    #[error("no PDF files found in folder: '{path}'")]
    NoPdfsInFolder { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF header/xref could not be parsed.
    #[error("failed to parse PDF '{path}': {detail}")]
    PdfParse { path: PathBuf, detail: String },

    /// Writing a sliced chapter PDF failed.
    #[error("failed to write chapter file '{path}': {detail}")]
    ChapterWrite { path: PathBuf, detail: String },

    /// No page in the first pages of the document mentioned a table of
    /// contents, so chapter extraction has nothing to work with.
    #[error("no table of contents found in '{path}'")]
    TocNotFound { path: PathBuf },

    /// The model's TOC response could not be parsed into chapter entries.
    #[error("could not parse chapter list from model response: {detail}")]
    ChapterParse { detail: String },

    /// The model returned a parseable response holding zero chapter entries.
    #[error("no chapters detected in the table of contents")]
    NoChaptersDetected,

    /// Chapters were extracted but none of their visible page numbers could
    /// be mapped to a physical page index.
    #[error("could not map any chapter to a physical page")]
    NoChaptersMapped,

    // ── Provider errors ───────────────────────────────────────────────────
    /// HTTP 429 from the provider. Retried with backoff up to the configured
    /// attempt ceiling; the final occurrence propagates unchanged.
    #[error("rate limit exceeded (retry-after: {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-retryable provider error (HTTP status + body excerpt).
    #[error("provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never reached the provider (DNS, TLS, timeout, ...).
    #[error("provider request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered 200 but the body did not match the expected
    /// chat-completion shape.
    #[error("malformed provider response: {detail}")]
    ResponseFormat { detail: String },

    /// The prompt alone fills (or overfills) the model's context window, so
    /// no output tokens can be requested.
    #[error("prompt of {input_tokens} tokens exhausts the {context_limit}-token context window of '{model}'")]
    BudgetExhausted {
        model: String,
        input_tokens: usize,
        context_limit: usize,
    },

    // ── Generation parsing errors ─────────────────────────────────────────
    /// Quiz response held no parseable JSON question array.
    #[error("could not parse quiz from model response: {detail}")]
    QuizParse { detail: String },

    /// Flashcard response for one document was not a valid JSON map.
    #[error("invalid flashcard JSON for '{document}': {detail}")]
    FlashcardParse { document: String, detail: String },

    // ── Export / I/O errors ───────────────────────────────────────────────
    /// PDF or DOCX rendering failed inside the writer library.
    #[error("document export failed: {detail}")]
    Export { detail: String },

    /// Could not create or write an output file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ForgeError {
    /// True for errors the retry loop is allowed to absorb.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ForgeError::RateLimited { .. })
    }
}
