//! Content generators: quiz, worksheet, summary, flashcards.
//!
//! Each generator builds a prompt from typed inputs and delegates to the
//! [`crate::client::LlmClient`]. Inputs that the original UI offered as
//! drop-downs are enums here so a caller cannot ask for a "grade 19
//! Alchemy" quiz. Empty or whitespace-only study material is rejected with
//! [`ForgeError::EmptyInput`] before any provider call.

pub mod flashcards;
pub mod format;
pub mod quiz;
pub mod summary;
pub mod worksheet;

use crate::error::ForgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use flashcards::{
    collect_pdf_paths, flashcards_batch, flashcards_from_pdf, parse_flashcards, BatchOutcome,
    DocumentOutcome, FlashcardSet,
};
pub use format::reformat_markdown;
pub use quiz::{generate_quiz, parse_quiz, QuizQuestion};
pub use summary::{generate_summary, stream_summary};
pub use worksheet::generate_worksheet;

/// Reject empty or whitespace-only study material.
pub(crate) fn require_text(text: &str) -> Result<&str, ForgeError> {
    if text.trim().is_empty() {
        Err(ForgeError::EmptyInput)
    } else {
        Ok(text)
    }
}

/// Class grade, primary school through fourth-year college.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Grade {
    Grade1,
    Grade2,
    Grade3,
    Grade4,
    Grade5,
    Grade6,
    Grade7,
    Grade8,
    Grade9,
    Grade10,
    Grade11,
    Grade12,
    CollegeYear1,
    CollegeYear2,
    CollegeYear3,
    CollegeYear4,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::Grade1 => "grade 1",
            Grade::Grade2 => "grade 2",
            Grade::Grade3 => "grade 3",
            Grade::Grade4 => "grade 4",
            Grade::Grade5 => "grade 5",
            Grade::Grade6 => "grade 6",
            Grade::Grade7 => "grade 7",
            Grade::Grade8 => "grade 8",
            Grade::Grade9 => "grade 9",
            Grade::Grade10 => "grade 10",
            Grade::Grade11 => "grade 11",
            Grade::Grade12 => "grade 12",
            Grade::CollegeYear1 => "1st year college",
            Grade::CollegeYear2 => "2nd year college",
            Grade::CollegeYear3 => "3rd year college",
            Grade::CollegeYear4 => "4th year college",
        };
        f.write_str(s)
    }
}

/// Class subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Subject {
    Science,
    Mathematics,
    History,
    Geography,
    EnglishLanguage,
    Physics,
    Chemistry,
    Biology,
    ComputerStudies,
    Psychology,
    Other,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subject::Science => "Science",
            Subject::Mathematics => "Mathematics",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::EnglishLanguage => "English Language",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::ComputerStudies => "Computer Studies",
            Subject::Psychology => "Psychology",
            Subject::Other => "Other",
        };
        f.write_str(s)
    }
}

/// Question style for quizzes and worksheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum QuestionFormat {
    Mcqs,
    TrueFalse,
    ShortAnswers,
    LongAnswers,
    FillInTheBlanks,
    Mixed,
}

impl fmt::Display for QuestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionFormat::Mcqs => "MCQs",
            QuestionFormat::TrueFalse => "True/False",
            QuestionFormat::ShortAnswers => "Short Answers",
            QuestionFormat::LongAnswers => "Long Answers",
            QuestionFormat::FillInTheBlanks => "Fill in the Blanks",
            QuestionFormat::Mixed => "Mixed",
        };
        f.write_str(s)
    }
}

/// Summary flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SummaryStyle {
    Summary,
    ClassNotes,
    LessonPlan,
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SummaryStyle::Summary => "Summary",
            SummaryStyle::ClassNotes => "Class Notes",
            SummaryStyle::LessonPlan => "Lesson Plan",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_is_rejected() {
        assert!(matches!(require_text("   \n\t "), Err(ForgeError::EmptyInput)));
        assert_eq!(require_text(" cells ").unwrap(), " cells ");
    }

    #[test]
    fn display_strings_match_the_option_lists() {
        assert_eq!(Grade::Grade11.to_string(), "grade 11");
        assert_eq!(Grade::CollegeYear2.to_string(), "2nd year college");
        assert_eq!(Subject::EnglishLanguage.to_string(), "English Language");
        assert_eq!(QuestionFormat::FillInTheBlanks.to_string(), "Fill in the Blanks");
        assert_eq!(SummaryStyle::ClassNotes.to_string(), "Class Notes");
    }
}
