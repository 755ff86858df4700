//! DOCX rendering: formatted text to a Word document.

use crate::error::ForgeError;
use crate::export::{meta_line, paragraphs};
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;

/// Render formatted text as a DOCX byte buffer.
///
/// Structure matches the PDF writer: heading, optional Class/Subject line,
/// a spacer, then one paragraph per blank-line-separated block.
pub fn render_docx(
    formatted_text: &str,
    title: &str,
    class_grade: Option<&str>,
    subject: Option<&str>,
) -> Result<Vec<u8>, ForgeError> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(title).size(36).bold()),
    );

    if let Some(meta) = meta_line(class_grade, subject) {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(meta)));
    }

    docx = docx.add_paragraph(Paragraph::new());

    for para in paragraphs(formatted_text) {
        // DOCX paragraphs hold no raw newlines; fold interior line breaks.
        let flat = para.lines().map(str::trim).collect::<Vec<_>>().join(" ");
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(flat)));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ForgeError::Export {
            detail: e.to_string(),
        })?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_a_zip_container() {
        let bytes = render_docx(
            "First paragraph.\n\nSecond paragraph.",
            "Worksheet",
            Some("grade 7"),
            Some("Science"),
        )
        .unwrap();
        // DOCX is a ZIP archive: PK magic.
        assert_eq!(&bytes[..2], b"PK");
        assert!(bytes.len() > 500);
    }

    #[test]
    fn renders_without_metadata() {
        let bytes = render_docx("Body only.", "Notes", None, None).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_body_still_produces_a_document() {
        let bytes = render_docx("", "Empty", None, None).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
