//! Line normalisation for rich-text output.
//!
//! Word documents carry bold and italic as run properties, not as `**`
//! markers, and a `---` rule line means nothing to a paragraph list. This
//! module turns one line of generated Markdown into the plain text the Word
//! emitter should see, or drops it entirely.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines that are pure decoration and never become a paragraph.
pub const SEPARATOR_TOKENS: [&str; 3] = ["---", "===", "___"];

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static RE_DASH_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3,}$").unwrap());
static RE_EQUALS_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^={3,}$").unwrap());

/// Remove `**bold**` and `*italic*` markers, keeping the enclosed text.
///
/// Bold is handled first so `**x**` never degrades into `*x*`.
pub fn strip_inline_styles(line: &str) -> String {
    let s = RE_BOLD.replace_all(line, "$1");
    RE_ITALIC.replace_all(&s, "$1").into_owned()
}

/// True for the literal separator tokens `---`, `===` and `___`.
pub fn is_separator(line: &str) -> bool {
    SEPARATOR_TOKENS.contains(&line)
}

/// Normalise one line, or return `None` when it must not produce a node.
///
/// A leading `* ` bullet marker is kept out of the italic rule so that
/// `* item with *emphasis*` stays a bullet.
pub fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || is_separator(line) {
        return None;
    }

    let cleaned = match line.strip_prefix("* ") {
        Some(rest) => format!("* {}", strip_inline_styles(rest)),
        None => strip_inline_styles(line),
    };
    let cleaned = RE_DASH_RULE.replace(&cleaned, "");
    let cleaned = RE_EQUALS_RULE.replace(&cleaned, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Every surviving line of `text`, cleaned, in order.
pub fn clean_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split('\n').filter_map(clean_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bold_and_italic() {
        assert_eq!(
            strip_inline_styles("This is **bold** and *italic*"),
            "This is bold and italic"
        );
    }

    #[test]
    fn strips_multiple_markers_non_greedily() {
        assert_eq!(strip_inline_styles("**a** x **b** *c* y *d*"), "a x b c y d");
    }

    #[test]
    fn separators_are_dropped() {
        for sep in ["---", "===", "___", "  ---  "] {
            assert_eq!(clean_line(sep), None, "{sep:?} survived");
        }
    }

    #[test]
    fn long_rules_are_dropped() {
        assert_eq!(clean_line("----------"), None);
        assert_eq!(clean_line("====="), None);
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(clean_line(""), None);
        assert_eq!(clean_line(" \t "), None);
    }

    #[test]
    fn content_lines_are_trimmed() {
        assert_eq!(clean_line("   ## **Intro**  ").as_deref(), Some("## Intro"));
    }

    #[test]
    fn star_bullets_survive_italic_stripping() {
        assert_eq!(
            clean_line("* item with *emphasis*").as_deref(),
            Some("* item with emphasis")
        );
    }

    #[test]
    fn clean_lines_filters_and_orders() {
        let text = "# Title\n\n---\nBody **text**\n===\n- point";
        let lines: Vec<String> = clean_lines(text).collect();
        assert_eq!(lines, vec!["# Title", "Body text", "- point"]);
    }
}
