//! Word emitter: classified lines → `.docx`.
//!
//! The document uses Segoe UI at 11pt as its default run font, four heading
//! styles and one bullet numbering definition. Inline emphasis has already
//! been stripped by [`crate::pipeline::normalize`], so every paragraph is a
//! single plain run.

use crate::error::GenerationError;
use crate::pipeline::classify::{classify_line, BlockKind, ClassifiedLine, MAX_HEADING_LEVEL};
use crate::pipeline::normalize::clean_lines;
use crate::request::OutputFormat;
use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, RunFonts, SpecialIndentType, Start, Style, StyleType,
};
use std::io::Cursor;
use tracing::debug;

/// Default paragraph font.
pub const DEFAULT_FONT: &str = "Segoe UI";

/// Default paragraph size in points.
pub const DEFAULT_FONT_SIZE_PT: usize = 11;

/// Style id used for bullet paragraphs.
pub const LIST_BULLET_STYLE: &str = "ListBullet";

const BULLET_NUMBERING_ID: usize = 1;

/// Clean and classify every line of `markdown`, dropping separators and blanks.
pub fn classified_lines(markdown: &str) -> Vec<ClassifiedLine> {
    clean_lines(markdown).map(|line| classify_line(&line)).collect()
}

/// Style id for a heading level, e.g. `Heading2`.
pub fn heading_style_id(level: u8) -> String {
    format!("Heading{}", level.clamp(1, MAX_HEADING_LEVEL))
}

/// Assemble the document for already-classified lines.
pub fn build_document(lines: &[ClassifiedLine]) -> Docx {
    lines
        .iter()
        .fold(base_document(), |doc, line| doc.add_paragraph(paragraph_for(line)))
}

/// Render `markdown` as a serialized `.docx`.
pub fn emit_docx(markdown: &str) -> Result<Vec<u8>, GenerationError> {
    let lines = classified_lines(markdown);
    debug!("Word emitter: {} classified lines", lines.len());

    let mut buf = Cursor::new(Vec::new());
    build_document(&lines)
        .build()
        .pack(&mut buf)
        .map_err(|e| GenerationError::Render {
            format: OutputFormat::Word,
            detail: e.to_string(),
        })?;
    Ok(buf.into_inner())
}

fn base_document() -> Docx {
    let fonts = RunFonts::new()
        .ascii(DEFAULT_FONT)
        .hi_ansi(DEFAULT_FONT)
        .east_asia(DEFAULT_FONT)
        .cs(DEFAULT_FONT);

    let bullets = AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    );

    let mut doc = Docx::new()
        .default_fonts(fonts)
        .default_size(DEFAULT_FONT_SIZE_PT * 2)
        .add_style(Style::new(LIST_BULLET_STYLE, StyleType::Paragraph).name("List Bullet"))
        .add_abstract_numbering(bullets)
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    for level in 1..=MAX_HEADING_LEVEL {
        doc = doc.add_style(heading_style(level));
    }
    doc
}

fn heading_style(level: u8) -> Style {
    // sizes in half-points
    let size = match level {
        1 => 32,
        2 => 26,
        3 => 24,
        _ => 22,
    };
    Style::new(heading_style_id(level), StyleType::Paragraph)
        .name(format!("Heading {level}"))
        .size(size)
        .bold()
}

fn paragraph_for(line: &ClassifiedLine) -> Paragraph {
    let p = Paragraph::new().add_run(Run::new().add_text(line.text.as_str()));
    match line.kind {
        BlockKind::Heading(level) => p.style(&heading_style_id(level)),
        BlockKind::BulletItem => p
            .style(LIST_BULLET_STYLE)
            .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
        BlockKind::Paragraph => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    const SAMPLE: &str = "# The Future of AI\n\n\
        Intro with **bold** and *italic* words.\n\n\
        ---\n\n\
        ## Why it matters\n\n\
        - first point\n\
        * second point\n\n\
        ####### Deep dive\n";

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn lines_are_cleaned_then_classified() {
        let lines = classified_lines(SAMPLE);
        let kinds: Vec<BlockKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading(1),
                BlockKind::Paragraph,
                BlockKind::Heading(2),
                BlockKind::BulletItem,
                BlockKind::BulletItem,
                BlockKind::Heading(4),
            ]
        );
        assert_eq!(lines[1].text, "Intro with bold and italic words.");
        assert_eq!(lines[4].text, "second point");
        assert_eq!(lines[5].text, "Deep dive");
    }

    #[test]
    fn separator_produces_no_node() {
        assert!(classified_lines("---").is_empty());
        assert!(classified_lines("===\n___\n\n").is_empty());
    }

    #[test]
    fn heading_style_ids_are_clamped() {
        assert_eq!(heading_style_id(2), "Heading2");
        assert_eq!(heading_style_id(9), "Heading4");
        assert_eq!(heading_style_id(0), "Heading1");
    }

    #[test]
    fn emits_a_zip_package() {
        let bytes = emit_docx(SAMPLE).unwrap();
        assert!(bytes.starts_with(b"PK"), "not a zip container");
    }

    #[test]
    fn document_xml_carries_styles_and_text() {
        let bytes = emit_docx(SAMPLE).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("Heading1"));
        assert!(xml.contains("Heading2"));
        assert!(xml.contains(LIST_BULLET_STYLE));
        assert!(xml.contains("The Future of AI"));
        assert!(xml.contains("second point"));
        assert!(!xml.contains("**"));
        assert!(!xml.contains("---"));
    }

    #[test]
    fn default_font_is_declared() {
        let bytes = emit_docx("plain text").unwrap();
        let styles = read_part(&bytes, "word/styles.xml");
        assert!(styles.contains(DEFAULT_FONT));
    }

    #[test]
    fn empty_input_still_serializes() {
        let bytes = emit_docx("").unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
