//! Summarisation in a chosen style.

use crate::client::{ChatMessage, CompletionStream, LlmClient};
use crate::error::ForgeError;
use crate::generate::{require_text, Grade, Subject, SummaryStyle};
use crate::prompts;

/// Summarise study material as a summary, class notes, or a lesson plan.
pub async fn generate_summary(
    client: &LlmClient,
    text: &str,
    style: SummaryStyle,
    grade: Grade,
    subject: Subject,
) -> Result<String, ForgeError> {
    let text = require_text(text)?;
    let prompt = prompts::summary_prompt(
        &style.to_string(),
        &grade.to_string(),
        &subject.to_string(),
        text,
    );
    let completion = client.complete_prompt(&prompt, None).await?;
    Ok(completion.text)
}

/// Streaming variant: yields text increments as the model produces them.
///
/// Terminal provider failures arrive as the stream's final `Err` item; drop
/// the stream to cancel early.
pub async fn stream_summary(
    client: &LlmClient,
    text: &str,
    style: SummaryStyle,
    grade: Grade,
    subject: Subject,
) -> Result<CompletionStream, ForgeError> {
    let text = require_text(text)?;
    let prompt = prompts::summary_prompt(
        &style.to_string(),
        &grade.to_string(),
        &subject.to_string(),
        text,
    );
    client
        .complete_stream(&[ChatMessage::user(prompt)], None)
        .await
}
