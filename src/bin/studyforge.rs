//! CLI binary for studyforge.
//!
//! A thin shim over the library crate that maps CLI flags to library calls
//! and prints results.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use studyforge::generate::{self, Grade, QuestionFormat, Subject, SummaryStyle};
use studyforge::{export, extract, split, BatchProgressCallback, ForgeConfig, LlmClient};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Quiz from a PDF, 10 MCQs for grade 9 biology
  studyforge quiz textbook.pdf -n 10 --format mcqs --grade grade9 --subject biology

  # Quiz exported to PDF and Word
  studyforge quiz notes.txt --grade grade11 --subject physics --format mixed \
      --pdf quiz.pdf --docx quiz.docx

  # Summarize pasted text as a lesson plan
  cat notes.txt | studyforge summarize - --style lesson-plan --grade grade5 --subject history

  # Stream a summary token by token
  studyforge summarize chapter.pdf --stream --grade college-year1 --subject psychology

  # Flashcards from every PDF in a folder, merged into one JSON file
  studyforge flashcards ./chapters/ -o cards.json

  # Split a textbook into per-chapter PDFs
  studyforge split textbook.pdf --out-dir chapters_output

ENVIRONMENT VARIABLES:
  STUDYFORGE_API_KEY    Provider API key (falls back to OPENAI_API_KEY)
  STUDYFORGE_BASE_URL   Chat-completions base URL (any OpenAI-compatible endpoint)
  STUDYFORGE_MODEL      Default model ID

SETUP:
  1. Set API key:   export OPENAI_API_KEY=sk-...
  2. Generate:      studyforge quiz material.pdf --grade grade9 --subject science --format mcqs
"#;

/// Generate quizzes, summaries, worksheets, and flashcards from study material.
#[derive(Parser, Debug)]
#[command(
    name = "studyforge",
    version,
    about = "Generate quizzes, summaries, worksheets, and flashcards from study material",
    long_about = "Generate educational content from study material using an OpenAI-compatible \
LLM endpoint. Accepts pasted text, text files, and PDFs (local or URL); exports to PDF and DOCX; \
splits textbooks into per-chapter PDFs.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LLM model ID (e.g. gpt-oss-120b, gpt-4o, o4-mini).
    #[arg(long, global = true, env = "STUDYFORGE_MODEL")]
    model: Option<String>,

    /// Chat-completions base URL (any OpenAI-compatible endpoint).
    #[arg(long, global = true, env = "STUDYFORGE_BASE_URL")]
    base_url: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "STUDYFORGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "STUDYFORGE_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a quiz (questions + answer key) from text or a PDF.
    Quiz(QuestionArgs),
    /// Generate a worksheet from text or a PDF.
    Worksheet(QuestionArgs),
    /// Summarize text or a PDF as a summary, class notes, or a lesson plan.
    Summarize(SummarizeArgs),
    /// Generate flashcards from one or more PDFs (parallel per document).
    Flashcards(FlashcardArgs),
    /// Split a textbook PDF into one PDF per chapter.
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct QuestionArgs {
    /// Input: PDF path or URL, text file, or '-' for stdin.
    input: String,

    /// Number of questions.
    #[arg(short = 'n', long, default_value_t = 5)]
    questions: u32,

    /// Question style.
    #[arg(long, value_enum)]
    format: QuestionFormat,

    /// Class grade.
    #[arg(long, value_enum)]
    grade: Grade,

    /// Class subject.
    #[arg(long, value_enum)]
    subject: Subject,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct SummarizeArgs {
    /// Input: PDF path or URL, text file, or '-' for stdin.
    input: String,

    /// Summary flavour.
    #[arg(long, value_enum, default_value = "summary")]
    style: SummaryStyle,

    /// Class grade.
    #[arg(long, value_enum)]
    grade: Grade,

    /// Class subject.
    #[arg(long, value_enum)]
    subject: Subject,

    /// Stream tokens to stdout as they arrive.
    #[arg(long)]
    stream: bool,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write the generated text to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export as PDF to this path (runs the Markdown reformat pass).
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Also export as DOCX to this path (runs the Markdown reformat pass).
    #[arg(long)]
    docx: Option<PathBuf>,

    /// Document title used in exports.
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args, Debug)]
struct FlashcardArgs {
    /// PDF files and/or directories of PDFs.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the merged question→answer JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker-pool width (default: available CPU cores).
    #[arg(short, long, default_value_t = 0)]
    concurrency: usize,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Textbook PDF path or URL.
    input: String,

    /// Directory that receives one subdirectory per source file.
    #[arg(long, default_value = "chapters_output")]
    out_dir: PathBuf,

    /// Maximum visible-page gap one interpolation segment may bridge.
    #[arg(long, default_value_t = 100)]
    max_gap: u32,

    /// How many leading pages to scan for the table of contents.
    #[arg(long, default_value_t = 10)]
    toc_pages: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Config + client ──────────────────────────────────────────────────
    let mut config = ForgeConfig::from_env().context("Provider configuration failed")?;
    if let Some(model) = cli.model.clone() {
        config.model = model;
    }
    if let Some(url) = cli.base_url.clone() {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Command::Flashcards(ref args) = cli.command {
        config.concurrency = args.concurrency;
    }
    if let Command::Split(ref args) = cli.command {
        config.interpolation_max_gap = args.max_gap;
        config.toc_scan_pages = args.toc_pages;
    }
    let client = LlmClient::new(config).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Quiz(args) => run_quiz(&client, args, cli.quiet, false).await,
        Command::Worksheet(args) => run_quiz(&client, args, cli.quiet, true).await,
        Command::Summarize(args) => run_summarize(&client, args, cli.quiet).await,
        Command::Flashcards(args) => run_flashcards(&client, args, cli.quiet).await,
        Command::Split(args) => run_split(&client, args, cli.quiet).await,
    }
}

// ── Subcommand handlers ──────────────────────────────────────────────────────

async fn run_quiz(
    client: &LlmClient,
    args: QuestionArgs,
    quiet: bool,
    worksheet: bool,
) -> Result<()> {
    let text = load_text(&args.input).await?;
    let kind = if worksheet { "Worksheet" } else { "Quiz" };

    let generated = if worksheet {
        generate::generate_worksheet(
            client,
            &text,
            args.questions,
            args.format,
            args.grade,
            args.subject,
        )
        .await
    } else {
        generate::generate_quiz(
            client,
            &text,
            args.questions,
            args.format,
            args.grade,
            args.subject,
        )
        .await
    }
    .with_context(|| format!("{kind} generation failed"))?;

    emit_text(&generated, args.out.output.as_deref())?;
    export_documents(
        client,
        &generated,
        args.out.title.as_deref().unwrap_or(kind),
        Some(args.grade.to_string()),
        Some(args.subject.to_string()),
        &args.out,
        quiet,
    )
    .await
}

async fn run_summarize(client: &LlmClient, args: SummarizeArgs, quiet: bool) -> Result<()> {
    let text = load_text(&args.input).await?;

    let summary = if args.stream {
        let mut stream = generate::stream_summary(client, &text, args.style, args.grade, args.subject)
            .await
            .context("Summarization failed")?;
        let mut collected = String::new();
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        while let Some(item) = stream.next().await {
            match item {
                Ok(token) => {
                    handle.write_all(token.as_bytes()).ok();
                    handle.flush().ok();
                    collected.push_str(&token);
                }
                Err(e) => {
                    handle.write_all(b"\n").ok();
                    return Err(e).context("Stream failed mid-response");
                }
            }
        }
        handle.write_all(b"\n").ok();
        if let Some(path) = args.out.output.as_deref() {
            std::fs::write(path, &collected)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
        }
        collected
    } else {
        let summary =
            generate::generate_summary(client, &text, args.style, args.grade, args.subject)
                .await
                .context("Summarization failed")?;
        emit_text(&summary, args.out.output.as_deref())?;
        summary
    };

    export_documents(
        client,
        &summary,
        args.out.title.as_deref().unwrap_or("Generated Notes"),
        Some(args.grade.to_string()),
        Some(args.subject.to_string()),
        &args.out,
        quiet,
    )
    .await
}

async fn run_flashcards(client: &LlmClient, args: FlashcardArgs, quiet: bool) -> Result<()> {
    let mut paths = Vec::new();
    for input in &args.inputs {
        paths.extend(
            generate::collect_pdf_paths(input)
                .with_context(|| format!("Bad flashcard input: {}", input.display()))?,
        );
    }

    let progress = if quiet {
        None
    } else {
        Some(Arc::new(FlashcardProgress::new()) as Arc<dyn BatchProgressCallback>)
    };

    let batch = generate::flashcards_batch(client, &paths, progress).await;

    for outcome in &batch.outcomes {
        if let Err(e) = &outcome.result {
            eprintln!(
                "{} {}  {}",
                red("✗"),
                outcome.source.display(),
                dim(&e.to_string())
            );
        }
    }

    if batch.succeeded() == 0 {
        bail!("every document failed — no flashcards produced");
    }

    let json = serde_json::to_string_pretty(&batch.combined)
        .context("Failed to serialise flashcards")?;
    emit_text(&json, args.output.as_deref())?;

    if !quiet {
        eprintln!(
            "{} {} cards from {}/{} documents",
            green("✔"),
            bold(&batch.combined.len().to_string()),
            batch.succeeded(),
            batch.outcomes.len(),
        );
    }
    Ok(())
}

async fn run_split(client: &LlmClient, args: SplitArgs, quiet: bool) -> Result<()> {
    let pdf = extract::open_pdf(&args.input)
        .await
        .context("Failed to open PDF")?;

    let spinner = if quiet {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!(
            "Extracting chapters from {} ({} pages)…",
            pdf.stem(),
            pdf.page_count()
        ));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    };

    let result = split::split_document(client, &pdf, &args.out_dir).await;
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Chapter split failed")?;

    for (chapter, file) in output.chapters.iter().zip(&output.files) {
        let size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
        println!(
            "{} {}  {}",
            green("✓"),
            file.display(),
            dim(&format!("{} ({} KiB)", chapter.title, size / 1024)),
        );
    }
    if !quiet {
        eprintln!(
            "{} {} chapters written under {}",
            green("✔"),
            bold(&output.files.len().to_string()),
            args.out_dir.display(),
        );
    }
    Ok(())
}

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Load the study material: stdin (`-`), a PDF (path or URL), or a text file.
async fn load_text(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    if extract::is_url(input) || input.to_lowercase().ends_with(".pdf") {
        let pdf = extract::open_pdf(input).await.context("Failed to open PDF")?;
        // Extraction failures degrade per page; whatever decoded is used.
        return Ok(extract::full_text(&pdf.doc));
    }

    std::fs::read_to_string(input).with_context(|| format!("Failed to read '{input}'"))
}

/// Print to stdout or write to a file.
fn emit_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("{} wrote {}", green("✔"), bold(&path.display().to_string()));
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes()).ok();
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}

/// Run the reformat pass and write the requested PDF/DOCX exports.
async fn export_documents(
    client: &LlmClient,
    raw_text: &str,
    title: &str,
    grade: Option<String>,
    subject: Option<String>,
    out: &OutputArgs,
    quiet: bool,
) -> Result<()> {
    if out.pdf.is_none() && out.docx.is_none() {
        return Ok(());
    }

    let formatted = generate::reformat_markdown(client, raw_text)
        .await
        .context("Formatting for export failed")?;

    if let Some(path) = &out.pdf {
        let bytes = export::render_pdf(&formatted, title, grade.as_deref(), subject.as_deref())
            .context("PDF rendering failed")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        if !quiet {
            eprintln!("{} wrote {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    if let Some(path) = &out.docx {
        let bytes = export::render_docx(&formatted, title, grade.as_deref(), subject.as_deref())
            .context("DOCX rendering failed")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        if !quiet {
            eprintln!("{} wrote {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    Ok(())
}

// ── Flashcard progress bar ───────────────────────────────────────────────────

/// Terminal progress callback for the flashcard worker pool. Documents
/// complete out of order; the bar only ever moves forward.
struct FlashcardProgress {
    bar: ProgressBar,
}

impl FlashcardProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>2}/{len} documents  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Flashcards");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl BatchProgressCallback for FlashcardProgress {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, source: &Path) {
        self.bar.set_message(
            source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    }

    fn on_document_complete(&self, source: &Path, card_count: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            source.display(),
            dim(&format!("{card_count} cards")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, source: &Path, error: &str) {
        let msg: String = error.chars().take(80).collect();
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            source.display(),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total_documents: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}
