//! Progress-callback trait for batch flashcard generation.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] into
//! [`crate::generate::flashcards::flashcards_batch`] to receive real-time
//! events as documents move through the worker pool. The callback approach
//! keeps the library ignorant of how the host renders progress — a terminal
//! bar, a log line, a channel — while staying `Send + Sync` for the
//! concurrent pool.

use std::path::Path;
use std::sync::Arc;

/// Called by the flashcard worker pool as it processes each document.
///
/// Documents complete in no particular order; implementations must protect
/// shared mutable state. All methods default to no-ops so callers only
/// override what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is processed.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a worker picks up a document.
    fn on_document_start(&self, source: &Path) {
        let _ = source;
    }

    /// Called when a document's flashcards parsed successfully.
    fn on_document_complete(&self, source: &Path, card_count: usize) {
        let _ = (source, card_count);
    }

    /// Called when a document failed (extraction, provider, or parse).
    fn on_document_error(&self, source: &Path, error: &str) {
        let _ = (source, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, succeeded: usize) {
        let _ = (total_documents, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared-callback form the pool accepts.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
