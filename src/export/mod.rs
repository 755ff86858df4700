//! Document export: formatted text to PDF or DOCX bytes.
//!
//! Both writers consume the same shape — a title, an optional
//! Class/Subject metadata line, and a body split on blank lines into
//! paragraphs — and produce a byte buffer the caller writes wherever it
//! wants. No provider calls happen here; run
//! [`crate::generate::reformat_markdown`] first if the text needs cleanup.

pub mod docx;
pub mod pdf;

pub use docx::render_docx;
pub use pdf::render_pdf;

/// Split body text on blank lines into non-empty trimmed paragraphs.
pub(crate) fn paragraphs(text: &str) -> Vec<&str> {
    text.trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Build the `Class: … Subject: …` metadata line, if any field is present.
pub(crate) fn meta_line(class_grade: Option<&str>, subject: Option<&str>) -> Option<String> {
    let mut line = String::new();
    if let Some(grade) = class_grade {
        line.push_str(&format!("Class: {grade}  "));
    }
    if let Some(subject) = subject {
        line.push_str(&format!("Subject: {subject}"));
    }
    let line = line.trim_end().to_string();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "first para\nstill first\n\nsecond\n\n\nthird";
        let paras = paragraphs(text);
        assert_eq!(paras.len(), 3);
        assert_eq!(paras[0], "first para\nstill first");
        assert_eq!(paras[2], "third");
    }

    #[test]
    fn meta_line_variants() {
        assert_eq!(meta_line(None, None), None);
        assert_eq!(meta_line(Some("grade 9"), None).unwrap(), "Class: grade 9");
        assert_eq!(
            meta_line(Some("grade 9"), Some("Biology")).unwrap(),
            "Class: grade 9  Subject: Biology"
        );
        assert_eq!(meta_line(None, Some("Biology")).unwrap(), "Subject: Biology");
    }
}
