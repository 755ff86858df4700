//! Prompt templates for every generator.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing how a generator asks for its
//!    output requires editing exactly one place.
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live provider, making prompt regressions easy to catch.

/// Prompt for quiz generation (questions plus an answer key at the end).
pub fn quiz_prompt(
    text: &str,
    num_questions: u32,
    quiz_type: &str,
    class_grade: &str,
    subject: &str,
) -> String {
    format!(
        "You are a quiz generator AI. Generate {num_questions} questions in {quiz_type} \
question answer format, from the following study material, for a {subject} {class_grade} class.\n\
Output questions and answers key in the end.\n\n\
Study Material:\n{text}"
    )
}

/// Prompt for worksheet generation.
pub fn worksheet_prompt(
    text: &str,
    num_questions: u32,
    worksheet_type: &str,
    class_grade: &str,
    subject: &str,
) -> String {
    format!(
        "You are a worksheet generator AI. Generate {num_questions} questions in {worksheet_type} \
question answer format, from the following study material, for a {subject} {class_grade} class.\n\
Output questions and answers key in the end.\n\n\
Study Material:\n{text}"
    )
}

/// Prompt for summarisation in a chosen style.
pub fn summary_prompt(style: &str, class_grade: &str, subject: &str, text: &str) -> String {
    format!(
        "You are an experienced {subject} teacher. Write a {style} of the following material, \
pitched at a {class_grade} class. Keep the structure clear and the language appropriate for \
that level.\n\n\
Material:\n{text}"
    )
}

/// Prompt reformatting raw generated text into clean printable Markdown.
pub fn reformat_prompt(raw_text: &str) -> String {
    format!(
        "You are a teacher preparing educational content to be turned into a printable document. \
Take the following unformatted text and reformat it using Markdown so it's clean and readable.\n\n\
Use:\n\
- `#` for main headings\n\
- `##` for subheadings\n\
- Bullet points for lists\n\
- Numbered lists when needed\n\
- Bold text for key terms or definitions\n\
- Keep paragraphs clean and separated\n\n\
Text:\n\"\"\"{raw_text}\"\"\""
    )
}

/// Prompt for flashcard generation over one document's text.
///
/// Asks for bare JSON so the response parses without fence stripping.
pub fn flashcard_prompt(text: &str) -> String {
    format!(
        "You are an expert flashcard generator.\n\
Create a dictionary of flashcards from the following text.\n\
Each key should be a concise question or term. Each value should be the answer or explanation.\n\
Return ONLY valid JSON (no markdown, no explanation).\n\n\
Text:\n{text}"
    )
}

/// Prompt extracting chapter titles and page numbers from TOC text.
pub fn toc_prompt(toc_text: &str) -> String {
    format!(
        "You are a document parser. Extract a list of major chapters and their corresponding \
page numbers from the following textbook index or table of contents.\n\n\
Output the result as a valid JSON object in the format:\n\
{{\n    \"Chapter Number: Name\": page_number,\n    ...\n}}\n\n\
Rules:\n\
- Only extract top-level chapters or major sections (ignore subheadings)\n\
- If a chapter is numbered (like \"1. Introduction\" or \"Chapter 1 - Basics\"), clean the title but preserve the number\n\
- The page number must be a number (integer) from the right side of each entry\n\
- Do not include sections like \"Preface\", \"About the Author\", or \"Index\"\n\n\
Text sample:\n\
----------------\n\
{toc_text}\n\
----------------"
    )
}
