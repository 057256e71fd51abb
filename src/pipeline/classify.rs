//! Block classification: one cleaned line → heading, bullet or paragraph.
//!
//! Classification looks at a single line and nothing else, so the Word
//! emitter can stream lines through it without keeping state.

/// Deepest heading level the Word output uses.
pub const MAX_HEADING_LEVEL: u8 = 4;

/// Structural role of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Heading at level 1..=[`MAX_HEADING_LEVEL`].
    Heading(u8),
    BulletItem,
    Paragraph,
}

/// A line together with its role and the text to emit for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: BlockKind,
    pub text: String,
}

impl ClassifiedLine {
    fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Classify one cleaned, non-empty line. First match wins:
///
/// 1. a run of `#` followed by a space → heading; the level is the length of
///    the run clamped to 1..=4 and the text is the line with every `#`
///    removed and trimmed;
/// 2. `"- "` or `"* "` → bullet item, text after the marker;
/// 3. anything else → paragraph, text unchanged.
pub fn classify_line(line: &str) -> ClassifiedLine {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes > 0 && line[hashes..].starts_with(' ') {
        let level = hashes.clamp(1, MAX_HEADING_LEVEL as usize) as u8;
        let text = line.replace('#', "");
        return ClassifiedLine::new(BlockKind::Heading(level), text.trim());
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return ClassifiedLine::new(BlockKind::BulletItem, rest);
    }

    ClassifiedLine::new(BlockKind::Paragraph, line)
}
