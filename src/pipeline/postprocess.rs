//! Post-processing: deterministic cleanup of the raw completion text.
//!
//! Chat models sometimes wrap the whole answer in a ```` ```markdown ````
//! fence, answer with CRLF line endings, or sprinkle zero-width characters
//! into headings. None of that belongs in the post. These rules run once,
//! before the text becomes the immutable GeneratedText that every emitter
//! reads; they never touch wording.
//!
//! Controlled by [`crate::config::GeneratorConfig::clean_output`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every cleanup rule in order:
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip an outer markdown fence
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 4. Trim trailing whitespace of the whole text
pub fn clean_completion(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_markdown_fences(&s);
    let s = remove_invisible_chars(&s);
    s.trim_end().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?[ \t]*\n(.*)\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
