//! # studyforge
//!
//! Generate educational content — quizzes, summaries, worksheets,
//! flashcards, chapter splits — from study material using an
//! OpenAI-compatible LLM endpoint, and export the results to PDF/DOCX.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input text / PDF
//!  │
//!  ├─ 1. Extract   parse the PDF, pull per-page text (lopdf)
//!  ├─ 2. Generate  build a prompt, call the provider (budgeted + retried)
//!  ├─ 3. Reformat  model pass producing clean printable Markdown
//!  └─ 4. Export    PDF (A4) or DOCX byte buffers
//!
//! chapter splitting instead runs:
//!  TOC (LLM) ─▶ dedup/sort ─▶ page map (detect + interpolate) ─▶ slice
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use studyforge::{generate, ForgeConfig, LlmClient};
//! use studyforge::generate::{Grade, QuestionFormat, Subject};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ForgeConfig::from_env()?;
//!     let client = LlmClient::new(config)?;
//!     let quiz = generate::generate_quiz(
//!         &client,
//!         "Photosynthesis converts light energy into chemical energy.",
//!         5,
//!         QuestionFormat::Mcqs,
//!         Grade::Grade9,
//!         Subject::Biology,
//!     )
//!     .await?;
//!     println!("{quiz}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `studyforge` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! studyforge = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod generate;
pub mod progress;
pub mod prompts;
pub mod split;
pub mod tokens;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{ChatMessage, Completion, CompletionStream, LlmClient, Role};
pub use config::{ForgeConfig, ForgeConfigBuilder};
pub use error::ForgeError;
pub use export::{render_docx, render_pdf};
pub use extract::{open_pdf, OpenedPdf};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use split::{split_document, Chapter, ChapterEntry, SplitOutput};
