//! Markdown reformatting ahead of document export.
//!
//! Two passes. The model rewrites raw generated text into headed, bulleted
//! Markdown (layout decisions a regex can't make); a deterministic cleanup
//! then fixes the quirks models reliably introduce — output wrapped in
//! ` ```markdown ` fences despite instructions, CRLF endings, invisible
//! Unicode — so the exporters see uniform input.

use crate::client::LlmClient;
use crate::error::ForgeError;
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;

/// Reformat raw generated text into clean printable Markdown.
pub async fn reformat_markdown(client: &LlmClient, raw_text: &str) -> Result<String, ForgeError> {
    let completion = client
        .complete_prompt(&prompts::reformat_prompt(raw_text), None)
        .await?;
    Ok(tidy_markdown(&completion.text))
}

/// Deterministic cleanup of model-produced Markdown.
///
/// Rules (applied in order):
/// 1. Strip outer markdown fences
/// 2. Normalise line endings (CRLF → LF)
/// 3. Strip invisible Unicode (zero-width space, BOM, soft hyphen)
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to one
/// 6. End with exactly one newline
pub fn tidy_markdown(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s: String = s
        .chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{feff}' | '\u{00ad}'))
        .collect();
    let s = s
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let s = RE_BLANK_RUN.replace_all(&s, "\n\n").into_owned();
    let trimmed = s.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown)?\n(.*)\n```\s*$").unwrap());

static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn strip_outer_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_fences_are_stripped() {
        let fenced = "```markdown\n# Title\n\nBody\n```";
        assert_eq!(tidy_markdown(fenced), "# Title\n\nBody\n");
    }

    #[test]
    fn inner_fences_survive() {
        let text = "# Code\n\n```rust\nfn main() {}\n```\n\nDone";
        let out = tidy_markdown(text);
        assert!(out.contains("```rust"));
    }

    #[test]
    fn crlf_and_trailing_whitespace_are_normalised() {
        let text = "# A  \r\nline one   \r\n\r\nline two";
        assert_eq!(tidy_markdown(text), "# A\nline one\n\nline two\n");
    }

    #[test]
    fn blank_runs_collapse_to_one_blank_line() {
        let text = "a\n\n\n\n\nb";
        assert_eq!(tidy_markdown(text), "a\n\nb\n");
    }

    #[test]
    fn invisible_chars_are_removed() {
        let text = "a\u{200b}b\u{feff}c";
        assert_eq!(tidy_markdown(text), "abc\n");
    }

    #[test]
    fn empty_input_becomes_single_newline() {
        assert_eq!(tidy_markdown("   \n  "), "\n");
    }
}
