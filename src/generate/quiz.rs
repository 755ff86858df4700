//! Quiz generation and structured quiz parsing.

use crate::client::LlmClient;
use crate::error::ForgeError;
use crate::generate::{require_text, Grade, QuestionFormat, Subject};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One parsed quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Answer options; empty for non-MCQ styles.
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
}

/// Generate a quiz (questions plus answer key) from study material.
///
/// Returns the model's text as-is; use [`parse_quiz`] when the caller needs
/// the structured form.
pub async fn generate_quiz(
    client: &LlmClient,
    text: &str,
    num_questions: u32,
    format: QuestionFormat,
    grade: Grade,
    subject: Subject,
) -> Result<String, ForgeError> {
    let text = require_text(text)?;
    let prompt = prompts::quiz_prompt(
        text,
        num_questions,
        &format.to_string(),
        &grade.to_string(),
        &subject.to_string(),
    );
    let completion = client.complete_prompt(&prompt, None).await?;
    Ok(completion.text)
}

static RE_JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*\{[\s\S]*\}\s*\]").unwrap());

/// Extract the JSON question array from a model response.
///
/// Accepts either a bare array or an array embedded in surrounding prose.
/// Failure is a typed [`ForgeError::QuizParse`] — never a placeholder
/// question carrying the error text.
pub fn parse_quiz(content: &str) -> Result<Vec<QuizQuestion>, ForgeError> {
    let content = content.trim();

    let json_str = if content.starts_with('[') {
        content
    } else {
        RE_JSON_ARRAY
            .find(content)
            .ok_or_else(|| ForgeError::QuizParse {
                detail: "no JSON question array found in response".into(),
            })?
            .as_str()
    };

    serde_json::from_str(json_str).map_err(|e| ForgeError::QuizParse {
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForgeConfig;

    const QUIZ_JSON: &str = r#"[
        {"question": "What is 2+2?", "options": ["3", "4", "5"], "answer": "B"},
        {"question": "Water boils at 100C.", "answer": "True"}
    ]"#;

    #[test]
    fn bare_array_parses() {
        let quiz = parse_quiz(QUIZ_JSON).unwrap();
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[0].options.len(), 3);
        assert!(quiz[1].options.is_empty());
        assert_eq!(quiz[1].answer, "True");
    }

    #[test]
    fn array_embedded_in_prose_parses() {
        let wrapped = format!("Here is your quiz:\n{QUIZ_JSON}\nEnjoy!");
        let quiz = parse_quiz(&wrapped).unwrap();
        assert_eq!(quiz.len(), 2);
    }

    #[test]
    fn prose_without_array_is_a_typed_error() {
        let err = parse_quiz("Q1: What is 2+2?\nA: 4").unwrap_err();
        assert!(matches!(err, ForgeError::QuizParse { .. }));
    }

    #[test]
    fn malformed_array_is_a_typed_error() {
        let err = parse_quiz(r#"[{"question": "broken"#).unwrap_err();
        assert!(matches!(err, ForgeError::QuizParse { .. }));
    }

    #[test]
    fn empty_text_is_rejected_before_any_request() {
        // The base URL points nowhere; the guard must fire first.
        let config = ForgeConfig::builder()
            .api_key("test")
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let client = LlmClient::new(config).unwrap();
        let err = tokio_test::block_on(generate_quiz(
            &client,
            "   \n ",
            5,
            QuestionFormat::Mcqs,
            Grade::Grade9,
            Subject::Biology,
        ))
        .unwrap_err();
        assert!(matches!(err, ForgeError::EmptyInput));
    }
}
