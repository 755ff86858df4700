//! Flashcard generation: per-document and batched over a worker pool.
//!
//! ## Batch semantics
//!
//! One task per document, fanned out over `buffer_unordered` with the pool
//! width from [`crate::config::ForgeConfig::effective_concurrency`]. A
//! failing document does not abort the batch: every document produces a
//! [`DocumentOutcome`], and the merged map is built from the successes in
//! completion order — later-completing documents overwrite colliding
//! question keys, with no deduplication beyond the overwrite.

use crate::client::LlmClient;
use crate::error::ForgeError;
use crate::extract;
use crate::progress::ProgressCallback;
use crate::prompts;
use crate::tokens;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Question → answer map for one or more documents.
pub type FlashcardSet = HashMap<String, String>;

/// Input text is capped at this many tokens per document.
const MAX_INPUT_TOKENS: usize = 100_000;

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    pub result: Result<FlashcardSet, ForgeError>,
}

/// Outcome of a whole batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Per-document outcomes, in completion order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Union of all successful documents' cards (completion-order overwrite
    /// on key collision).
    pub combined: FlashcardSet,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Generate flashcards for a single PDF.
pub async fn flashcards_from_pdf(
    client: &LlmClient,
    path: &Path,
) -> Result<FlashcardSet, ForgeError> {
    let pdf = extract::open_pdf(&path.to_string_lossy()).await?;
    let full_text = extract::full_text(&pdf.doc);
    let model = client.config().model.clone();
    let limited = clip_to_token_budget(&full_text, &model, MAX_INPUT_TOKENS);
    debug!(
        source = %path.display(),
        chars = limited.len(),
        "prepared flashcard input"
    );

    let completion = client
        .complete_prompt(&prompts::flashcard_prompt(&limited), None)
        .await?;
    parse_flashcards(&completion.text, &path.to_string_lossy())
}

/// Keep whole leading lines while the running token count stays within
/// `budget`.
fn clip_to_token_budget(text: &str, model: &str, budget: usize) -> String {
    let mut selected = Vec::new();
    let mut total = 0usize;
    for line in text.lines() {
        let line_tokens = tokens::count_tokens(line, model);
        if total + line_tokens > budget {
            break;
        }
        selected.push(line);
        total += line_tokens;
    }
    selected.join("\n")
}

/// Parse a model response as a strict JSON question→answer map.
///
/// The prompt forbids markdown wrapping, so anything that isn't bare JSON
/// is a typed [`ForgeError::FlashcardParse`] naming the offending document.
pub fn parse_flashcards(content: &str, document: &str) -> Result<FlashcardSet, ForgeError> {
    serde_json::from_str::<FlashcardSet>(content.trim()).map_err(|e| {
        ForgeError::FlashcardParse {
            document: document.to_string(),
            detail: e.to_string(),
        }
    })
}

/// Expand a flashcard input path: a single PDF stays as-is, a directory
/// yields every `.pdf` directly inside it.
pub fn collect_pdf_paths(input: &Path) -> Result<Vec<PathBuf>, ForgeError> {
    if input.is_file() {
        if input
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
        {
            return Ok(vec![input.to_path_buf()]);
        }
        return Err(ForgeError::NotAPdf {
            path: input.to_path_buf(),
            magic: [0; 4],
        });
    }

    if input.is_dir() {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(input)
            .map_err(|source| ForgeError::OutputWrite {
                path: input.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .map(|e| e.eq_ignore_ascii_case("pdf"))
                        .unwrap_or(false)
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(ForgeError::NoPdfsInFolder {
                path: input.to_path_buf(),
            });
        }
        return Ok(paths);
    }

    Err(ForgeError::FileNotFound {
        path: input.to_path_buf(),
    })
}

/// Generate flashcards for every document, bounded by the configured pool
/// width.
///
/// Never fails as a whole: inspect [`BatchOutcome::outcomes`] for
/// per-document errors.
pub async fn flashcards_batch(
    client: &LlmClient,
    paths: &[PathBuf],
    progress: Option<ProgressCallback>,
) -> BatchOutcome {
    let width = client.config().effective_concurrency().max(1);
    info!(documents = paths.len(), width, "starting flashcard batch");
    if let Some(cb) = &progress {
        cb.on_batch_start(paths.len());
    }

    let outcomes: Vec<DocumentOutcome> = stream::iter(paths.iter().cloned().map(|path| {
        let client = client.clone();
        let progress = progress.clone();
        async move {
            if let Some(cb) = &progress {
                cb.on_document_start(&path);
            }
            let result = flashcards_from_pdf(&client, &path).await;
            if let Some(cb) = &progress {
                match &result {
                    Ok(set) => cb.on_document_complete(&path, set.len()),
                    Err(e) => cb.on_document_error(&path, &e.to_string()),
                }
            }
            DocumentOutcome {
                source: path,
                result,
            }
        }
    }))
    .buffer_unordered(width)
    .collect()
    .await;

    let mut combined = FlashcardSet::new();
    for outcome in &outcomes {
        if let Ok(set) = &outcome.result {
            combined.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    let batch = BatchOutcome { outcomes, combined };
    if let Some(cb) = &progress {
        cb.on_batch_complete(batch.outcomes.len(), batch.succeeded());
    }
    info!(
        succeeded = batch.succeeded(),
        failed = batch.failed(),
        cards = batch.combined.len(),
        "flashcard batch finished"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_map_parses() {
        let set = parse_flashcards(r#"{"What is DNA?": "Genetic material."}"#, "bio.pdf").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set["What is DNA?"], "Genetic material.");
    }

    #[test]
    fn non_map_json_is_a_typed_error_naming_the_source() {
        let err = parse_flashcards(r#"["not", "a", "map"]"#, "bio.pdf").unwrap_err();
        match err {
            ForgeError::FlashcardParse { document, .. } => assert_eq!(document, "bio.pdf"),
            other => panic!("expected FlashcardParse, got {other}"),
        }
    }

    #[test]
    fn fenced_json_is_rejected_the_prompt_forbids_fences() {
        let err = parse_flashcards("```json\n{\"q\": \"a\"}\n```", "x.pdf").unwrap_err();
        assert!(matches!(err, ForgeError::FlashcardParse { .. }));
    }

    #[test]
    fn clipping_keeps_whole_leading_lines() {
        let text = "alpha beta gamma\ndelta epsilon\nzeta eta theta iota";
        let clipped = clip_to_token_budget(text, "gpt-oss-120b", 6);
        // Whatever the exact token counts, the clip boundary falls between
        // lines and preserves prefix order.
        assert!(text.starts_with(&clipped) || clipped.is_empty());
        assert!(!clipped.contains("zeta") || clipped.contains("delta"));
    }

    #[test]
    fn clipping_huge_budget_keeps_everything() {
        let text = "one\ntwo\nthree";
        assert_eq!(clip_to_token_budget(text, "gpt-oss-120b", 10_000), text);
    }

    #[test]
    fn missing_path_is_reported() {
        let err = collect_pdf_paths(Path::new("/no/such/thing")).unwrap_err();
        assert!(matches!(err, ForgeError::FileNotFound { .. }));
    }

    #[test]
    fn directory_without_pdfs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        let err = collect_pdf_paths(dir.path()).unwrap_err();
        assert!(matches!(err, ForgeError::NoPdfsInFolder { .. }));
    }

    #[test]
    fn directory_lists_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), "x").unwrap();
        std::fs::write(dir.path().join("a.PDF"), "x").unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();
        let paths = collect_pdf_paths(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }
}
