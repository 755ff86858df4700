//! PDF rendering: formatted text to an A4 document.
//!
//! Layout is deliberately simple — built-in Helvetica, character-count line
//! wrapping, a fixed baseline grid on an A4 page (210 × 297 mm, 20 mm
//! margins). The input is print-oriented Markdown from the reformat pass;
//! heading markers are rendered as bold lines rather than typeset
//! hierarchically.

use crate::error::ForgeError;
use crate::export::{meta_line, paragraphs};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

/// Characters per body line under 11pt Helvetica inside the margins.
const WRAP_COLUMNS: usize = 95;

/// Render formatted text as an A4 PDF.
pub fn render_pdf(
    formatted_text: &str,
    title: &str,
    class_grade: Option<&str>,
    subject: Option<&str>,
) -> Result<Vec<u8>, ForgeError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ForgeError::Export {
            detail: e.to_string(),
        })?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ForgeError::Export {
            detail: e.to_string(),
        })?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    // Baseline cursor in mm from the page bottom; new page below 20 mm.
    let mut y = 277.0;

    layer.use_text(title, 18.0, Mm(20.0), Mm(y), &bold);
    y -= 12.0;

    if let Some(meta) = meta_line(class_grade, subject) {
        layer.use_text(meta, 11.0, Mm(20.0), Mm(y), &bold);
        y -= 8.0;
    }
    y -= 4.0;

    for para in paragraphs(formatted_text) {
        for raw_line in para.lines() {
            let (text, font) = styled_line(raw_line, &regular, &bold);
            for line in wrap_line(text, WRAP_COLUMNS) {
                if y < 20.0 {
                    let (page, new_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
                    layer = doc.get_page(page).get_layer(new_layer);
                    y = 277.0;
                }
                layer.use_text(line, 11.0, Mm(20.0), Mm(y), font);
                y -= 6.0;
            }
        }
        y -= 4.0;
    }

    doc.save_to_bytes().map_err(|e| ForgeError::Export {
        detail: e.to_string(),
    })
}

/// Render `# Heading` lines bold with the marker stripped.
fn styled_line<'a, 'f>(
    line: &'a str,
    regular: &'f IndirectFontRef,
    bold: &'f IndirectFontRef,
) -> (&'a str, &'f IndirectFontRef) {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        (trimmed.trim_start_matches('#').trim_start(), bold)
    } else {
        (line, regular)
    }
}

/// Greedy word wrap at `columns` characters.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    if line.chars().count() <= columns {
        return vec![line.to_string()];
    }
    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_a_pdf() {
        let bytes = render_pdf(
            "# Heading\n\nFirst paragraph.\n\nSecond paragraph.",
            "Quiz",
            Some("grade 9"),
            Some("Biology"),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_body_spans_multiple_pages() {
        let body = (0..200)
            .map(|i| format!("Paragraph number {i} with a little content."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let bytes = render_pdf(&body, "Notes", None, None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // Reload and confirm pagination happened.
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn wrap_respects_column_limit() {
        let line = "word ".repeat(60);
        for piece in wrap_line(&line, 40) {
            assert!(piece.chars().count() <= 40, "too long: {piece:?}");
        }
    }

    #[test]
    fn wrap_keeps_short_lines_intact() {
        assert_eq!(wrap_line("short line", 95), vec!["short line".to_string()]);
    }

    #[test]
    fn oversized_single_word_is_not_dropped() {
        let word = "x".repeat(120);
        let wrapped = wrap_line(&word, 40);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0], word);
    }

    #[test]
    fn heading_marker_is_stripped() {
        let regular = dummy_font();
        let bold = dummy_font();
        let (text, font) = styled_line("## Section One", &regular, &bold);
        assert_eq!(text, "Section One");
        assert!(std::ptr::eq(font, &bold));
    }

    fn dummy_font() -> IndirectFontRef {
        // Build a real font ref from a throwaway document.
        let (doc, _, _) = PdfDocument::new("t", Mm(10.0), Mm(10.0), "l");
        doc.add_builtin_font(BuiltinFont::Helvetica).unwrap()
    }
}
