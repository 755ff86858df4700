//! Worksheet generation.

use crate::client::LlmClient;
use crate::error::ForgeError;
use crate::generate::{require_text, Grade, QuestionFormat, Subject};
use crate::prompts;

/// Generate a worksheet (questions plus answer key) from study material.
pub async fn generate_worksheet(
    client: &LlmClient,
    text: &str,
    num_questions: u32,
    format: QuestionFormat,
    grade: Grade,
    subject: Subject,
) -> Result<String, ForgeError> {
    let text = require_text(text)?;
    let prompt = prompts::worksheet_prompt(
        text,
        num_questions,
        &format.to_string(),
        &grade.to_string(),
        &subject.to_string(),
    );
    let completion = client.complete_prompt(&prompt, None).await?;
    Ok(completion.text)
}
