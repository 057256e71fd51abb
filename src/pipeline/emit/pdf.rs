//! PDF emitter: Markdown → HTML → one typeset block per HTML line → PDF.
//!
//! The Markdown is rendered to HTML first, and the HTML is cut on newlines.
//! Every non-blank line becomes one block on a US Letter page followed by
//! 12pt of vertical space. Lines are not parsed as a tree: a `<ul>` line and
//! its `<li>` lines are independent segments.
//!
//! Inside a segment the inline tags a rich paragraph understands are kept
//! (`strong`/`b`, `em`/`i`, `code`, `del`/`s`, `br`), headings are set bold
//! at a larger size and list items get a bullet. Any other tag is dropped
//! instead of being printed, and a segment with no visible text left
//! (`<ul>`, `</ol>`, …) produces no block.
//!
//! Typesetting goes through Typst: the segments are written out as Typst
//! markup, compiled, and exported with `typst-pdf`. Libertinus Serif (body)
//! and DejaVu Sans Mono (`raw`) are always loaded from `typst-assets`; font
//! files passed by the caller are loaded alongside them and become the
//! preferred body families, in the order given.

use crate::error::GenerationError;
use crate::request::OutputFormat;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::path::PathBuf;
use tracing::debug;
use typst::foundations::Bytes;
use typst::layout::PagedDocument;
use typst::text::FontInfo;
use typst_as_lib::TypstEngine;

/// Vertical space after every block, in points.
pub const BLOCK_SPACING_PT: u32 = 12;

/// Body font used when the caller supplies none, and fallback after theirs.
pub const DEFAULT_BODY_FAMILY: &str = "Libertinus Serif";

/// Families taken from the bundled font set.
const BUNDLED_FAMILIES: [&str; 2] = [DEFAULT_BODY_FAMILY, "DejaVu Sans Mono"];

static RE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>").unwrap());

static RE_HEADING_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<h([1-6])\b").unwrap());

/// Render Markdown to HTML (CommonMark + tables + strikethrough).
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// The non-blank lines of the HTML, in order.
pub fn html_segments(html: &str) -> impl Iterator<Item = &str> {
    html.split('\n').filter(|s| !s.trim().is_empty())
}

/// Build the complete Typst source for `markdown`.
///
/// `body_families` are tried before [`DEFAULT_BODY_FAMILY`].
pub fn build_typst_source(markdown: &str, body_families: &[String]) -> String {
    let html = markdown_to_html(markdown);
    let mut source = preamble(body_families);
    let mut blocks = 0usize;

    for segment in html_segments(&html) {
        if let Some(content) = segment_to_typst(segment) {
            source.push_str("#block[");
            source.push_str(&content);
            source.push_str("]\n");
            source.push_str(&format!("#v({BLOCK_SPACING_PT}pt)\n"));
            blocks += 1;
        }
    }

    debug!("PDF emitter: {} blocks", blocks);
    source
}

/// Translate one HTML line into Typst content, or `None` if nothing visible remains.
pub fn segment_to_typst(segment: &str) -> Option<String> {
    let segment = segment.trim();
    let inline = inline_to_typst(segment)?;

    match RE_HEADING_OPEN.captures(segment) {
        Some(caps) => {
            let size = match &caps[1] {
                "1" => 18,
                "2" => 15,
                "3" => 13,
                _ => 11,
            };
            Some(format!("#text(size: {size}pt, weight: \"bold\")[{inline}]"))
        }
        None => Some(inline),
    }
}

/// Page and text set-up shared by every document.
fn preamble(body_families: &[String]) -> String {
    let families: Vec<String> = body_families
        .iter()
        .map(String::as_str)
        .chain([DEFAULT_BODY_FAMILY])
        .map(typst_string)
        .collect();
    // a one-element Typst array needs the trailing comma
    let font_list = match families.len() {
        1 => format!("({},)", families[0]),
        _ => format!("({})", families.join(", ")),
    };
    format!(
        "#set page(paper: \"us-letter\", margin: 1in)\n\
#set text(font: {font_list}, size: 10pt)\n\
#set block(spacing: 0pt)\n"
    )
}

/// Typeset `markdown` and return the PDF bytes.
pub fn emit_pdf(markdown: &str, font_paths: &[PathBuf]) -> Result<Vec<u8>, GenerationError> {
    let user_fonts = read_fonts(font_paths)?;
    let source = build_typst_source(markdown, &font_families(&user_fonts));
    let document = compile_document(&source, user_fonts)?;

    let options = typst_pdf::PdfOptions::default();
    let bytes = typst_pdf::pdf(&document, &options)
        .map_err(|e| render_error(format!("PDF export failed: {e:?}")))?;

    Ok(bytes.into())
}

/// The bundled font files for [`BUNDLED_FAMILIES`].
fn bundled_fonts() -> impl Iterator<Item = &'static [u8]> {
    typst_assets::fonts().filter(|data| {
        FontInfo::iter(data).any(|info| {
            BUNDLED_FAMILIES
                .iter()
                .any(|family| info.family.eq_ignore_ascii_case(family))
        })
    })
}

/// Read every font file up front; a file Typst cannot parse is an error.
fn read_fonts(font_paths: &[PathBuf]) -> Result<Vec<Bytes>, GenerationError> {
    font_paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path).map_err(|e| {
                render_error(format!("Failed to read font {}: {}", path.display(), e))
            })?;
            if FontInfo::iter(&data).next().is_none() {
                return Err(render_error(format!(
                    "{} is not a font Typst can load",
                    path.display()
                )));
            }
            Ok(Bytes::new(data))
        })
        .collect()
}

/// Distinct family names in `fonts`, in first-seen order.
fn font_families(fonts: &[Bytes]) -> Vec<String> {
    let mut families: Vec<String> = Vec::new();
    for info in fonts.iter().flat_map(|data| FontInfo::iter(data)) {
        if !families.iter().any(|f| f.eq_ignore_ascii_case(&info.family)) {
            families.push(info.family);
        }
    }
    families
}

/// Compile Typst source with the bundled fonts plus `user_fonts`.
///
/// All fonts go to the engine in one call; the builder keeps only the list
/// it was given last.
fn compile_document(source: &str, user_fonts: Vec<Bytes>) -> Result<PagedDocument, GenerationError> {
    let fonts: Vec<Bytes> = bundled_fonts().map(Bytes::new).chain(user_fonts).collect();
    debug!("PDF emitter: {} font faces loaded", fonts.len());

    let engine = TypstEngine::builder()
        .main_file(source.to_string())
        .fonts(fonts)
        .build();

    engine
        .compile()
        .output
        .map_err(|e| render_error(format!("typesetting failed: {e:?}")))
}

fn render_error(detail: String) -> GenerationError {
    GenerationError::Render {
        format: OutputFormat::Pdf,
        detail,
    }
}

// ── Inline translation ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrap {
    Strong,
    Emph,
    Strike,
}

impl Wrap {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "strong" | "b" => Some(Wrap::Strong),
            "em" | "i" => Some(Wrap::Emph),
            "del" | "s" => Some(Wrap::Strike),
            _ => None,
        }
    }

    fn open(self) -> &'static str {
        match self {
            Wrap::Strong => "#strong[",
            Wrap::Emph => "#emph[",
            Wrap::Strike => "#strike[",
        }
    }
}

/// Walk the tags of one segment, emitting Typst for text and inline styles.
fn inline_to_typst(segment: &str) -> Option<String> {
    let mut out = String::new();
    let mut stack: Vec<Wrap> = Vec::new();
    let mut code_depth = 0usize;
    let mut has_text = false;
    let mut cursor = 0usize;

    for caps in RE_TAG.captures_iter(segment) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(
            &mut out,
            &segment[cursor..whole.start()],
            code_depth > 0,
            &mut has_text,
        );
        cursor = whole.end();

        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();

        match (tag.as_str(), closing) {
            ("code", false) => code_depth += 1,
            ("code", true) => code_depth = code_depth.saturating_sub(1),
            ("br", _) => out.push_str("#linebreak()"),
            ("li", false) => push_text(&mut out, "• ", false, &mut has_text),
            (t, false) => {
                if let Some(wrap) = Wrap::from_tag(t) {
                    out.push_str(wrap.open());
                    stack.push(wrap);
                }
            }
            (t, true) => {
                if let Some(wrap) = Wrap::from_tag(t) {
                    if let Some(pos) = stack.iter().rposition(|w| *w == wrap) {
                        for _ in pos..stack.len() {
                            out.push(']');
                        }
                        stack.truncate(pos);
                    }
                }
            }
        }
    }
    push_text(&mut out, &segment[cursor..], code_depth > 0, &mut has_text);

    for _ in 0..stack.len() {
        out.push(']');
    }

    has_text.then_some(out)
}

fn push_text(out: &mut String, raw: &str, as_code: bool, has_text: &mut bool) {
    if raw.is_empty() {
        return;
    }
    let text = decode_entities(raw);
    if text.trim().is_empty() && !*has_text {
        return;
    }
    let literal = typst_string(&text);
    if as_code {
        out.push_str(&format!("#raw({literal})"));
    } else {
        out.push('#');
        out.push_str(&literal);
    }
    if !text.trim().is_empty() {
        *has_text = true;
    }
}

/// Quote `s` as a Typst string literal.
fn typst_string(s: &str) -> String {
    let mut lit = String::with_capacity(s.len() + 2);
    lit.push('"');
    for c in s.chars() {
        match c {
            '\\' => lit.push_str("\\\\"),
            '"' => lit.push_str("\\\""),
            '\t' => lit.push_str("\\t"),
            c => lit.push(c),
        }
    }
    lit.push('"');
    lit
}

/// Decode the entities pulldown-cmark emits plus numeric references.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|&end| end <= 10) {
            Some(end) => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(c) => out.push(c),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typst::layout::{Frame, FrameItem};

    #[test]
    fn html_has_one_line_per_block() {
        let html = markdown_to_html("# Title\n\nSome **bold** text.\n\n- a\n- b\n");
        let segments: Vec<&str> = html_segments(&html).collect();
        assert_eq!(
            segments,
            vec![
                "<h1>Title</h1>",
                "<p>Some <strong>bold</strong> text.</p>",
                "<ul>",
                "<li>a</li>",
                "<li>b</li>",
                "</ul>",
            ]
        );
    }

    #[test]
    fn paragraph_with_inline_styles() {
        let t = segment_to_typst("<p>Some <strong>bold</strong> and <em>it</em>.</p>").unwrap();
        assert_eq!(t, "#\"Some \"#strong[#\"bold\"]#\" and \"#emph[#\"it\"]#\".\"");
    }

    #[test]
    fn heading_is_bold_and_larger() {
        let t = segment_to_typst("<h2>Why it matters</h2>").unwrap();
        assert_eq!(t, "#text(size: 15pt, weight: \"bold\")[#\"Why it matters\"]");
    }

    #[test]
    fn list_item_gets_bullet() {
        let t = segment_to_typst("<li>first</li>").unwrap();
        assert_eq!(t, "#\"• \"#\"first\"");
    }

    #[test]
    fn structural_only_segments_are_skipped() {
        assert_eq!(segment_to_typst("<ul>"), None);
        assert_eq!(segment_to_typst("</ol>"), None);
        assert_eq!(segment_to_typst("<hr />"), None);
    }

    #[test]
    fn entities_are_decoded_and_quotes_escaped() {
        let t = segment_to_typst("<p>A &amp; B &lt;tag&gt; &quot;q&quot; &#39;s&#x21;</p>").unwrap();
        assert_eq!(t, "#\"A & B <tag> \\\"q\\\" 's!\"");
    }

    #[test]
    fn typst_markup_characters_are_inert() {
        let t = segment_to_typst("<p>#set * _ $ [x] \\ @ref</p>").unwrap();
        assert_eq!(t, "#\"#set * _ $ [x] \\\\ @ref\"");
    }

    #[test]
    fn code_spans_become_raw() {
        let t = segment_to_typst("<p>run <code>cargo test</code></p>").unwrap();
        assert_eq!(t, "#\"run \"#raw(\"cargo test\")");
    }

    #[test]
    fn unbalanced_tags_are_closed() {
        let t = segment_to_typst("<p><strong>open").unwrap();
        assert_eq!(t, "#strong[#\"open\"]");
        let t = segment_to_typst("<p>stray</em> close</p>").unwrap();
        assert_eq!(t, "#\"stray\"#\" close\"");
    }

    #[test]
    fn source_has_us_letter_and_spacing() {
        let src = build_typst_source("# T\n\nBody\n", &[]);
        assert!(src.starts_with("#set page(paper: \"us-letter\""));
        assert_eq!(src.matches("#v(12pt)").count(), 2);
        assert_eq!(src.matches("#block[").count(), 2);
    }

    #[test]
    fn blank_input_has_no_blocks() {
        let src = build_typst_source("\n\n", &[]);
        assert_eq!(src, preamble(&[]));
    }

    #[test]
    fn preamble_prefers_caller_families() {
        assert!(preamble(&[]).contains("#set text(font: (\"Libertinus Serif\",), size: 10pt)"));
        let src = preamble(&["Inter".to_string(), "Noto Sans".to_string()]);
        assert!(
            src.contains("font: (\"Inter\", \"Noto Sans\", \"Libertinus Serif\")"),
            "got: {src}"
        );
    }

    /// (font family, text) of every laid-out text run.
    fn text_runs(document: &PagedDocument) -> Vec<(String, String)> {
        fn walk(frame: &Frame, out: &mut Vec<(String, String)>) {
            for (_, item) in frame.items() {
                match item {
                    FrameItem::Group(group) => walk(&group.frame, out),
                    FrameItem::Text(text) => {
                        out.push((text.font.info().family.clone(), text.text.to_string()))
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        for page in &document.pages {
            walk(&page.frame, &mut out);
        }
        out
    }

    /// Two bundled-asset fonts of different families that the emitter does not load by default.
    fn extra_fonts() -> Vec<(&'static [u8], String)> {
        let mut picked: Vec<(&'static [u8], String)> = Vec::new();
        for data in typst_assets::fonts() {
            let Some(info) = FontInfo::iter(data).next() else {
                continue;
            };
            let bundled = BUNDLED_FAMILIES
                .iter()
                .any(|f| info.family.eq_ignore_ascii_case(f));
            if !bundled && !picked.iter().any(|(_, family)| *family == info.family) {
                picked.push((data, info.family));
            }
        }
        picked.truncate(2);
        assert_eq!(picked.len(), 2, "need two extra font families");
        picked
    }

    #[test]
    fn default_fonts_lay_out_every_block() {
        let src = build_typst_source(
            "# Hello\n\nSome body text here.\n\n- one\n\nRun `cargo test` now.\n",
            &[],
        );
        let document = compile_document(&src, Vec::new()).unwrap();
        let runs = text_runs(&document);
        let all: String = runs
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        assert!(all.contains("Hello"), "got: {all}");
        assert!(all.contains("body"), "got: {all}");
        assert!(all.contains("one"), "got: {all}");
        assert!(runs
            .iter()
            .any(|(family, _)| family.eq_ignore_ascii_case(DEFAULT_BODY_FAMILY)));
        assert!(runs
            .iter()
            .any(|(family, _)| family.eq_ignore_ascii_case("DejaVu Sans Mono")));
    }

    #[test]
    fn compiles_to_pdf_with_embedded_font() {
        let bytes = emit_pdf("# Hello\n\nThis is a **test** document.\n\n- one\n- two\n", &[])
            .expect("typesetting should succeed");
        assert!(bytes.starts_with(b"%PDF"), "missing PDF header");
        let contains = |needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
        assert!(contains(b"/FontFile"), "no embedded font program");
        assert!(contains(b"LibertinusSerif-Regular"));
        assert!(contains(b"LibertinusSerif-Bold"));
    }

    #[test]
    fn every_caller_font_is_available() {
        let dir = tempfile::tempdir().unwrap();
        let extra = extra_fonts();
        let paths: Vec<PathBuf> = extra
            .iter()
            .enumerate()
            .map(|(i, (data, _))| {
                let path = dir.path().join(format!("extra-{i}.otf"));
                std::fs::write(&path, data).unwrap();
                path
            })
            .collect();

        let user_fonts = read_fonts(&paths).unwrap();
        let families = font_families(&user_fonts);
        assert_eq!(families, vec![extra[0].1.clone(), extra[1].1.clone()]);

        let mut src = build_typst_source("Body text\n", &families);
        src.push_str(&format!("#text(font: {})[beta]\n", typst_string(&families[1])));
        let runs = text_runs(&compile_document(&src, user_fonts).unwrap());

        let family_of = |needle: &str| {
            runs.iter()
                .find(|(_, text)| text.contains(needle))
                .map(|(family, _)| family.clone())
        };
        assert_eq!(family_of("Body"), Some(families[0].clone()));
        assert_eq!(family_of("beta"), Some(families[1].clone()));

        let bytes = emit_pdf("Body text\n", &paths).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unreadable_font_is_a_render_error() {
        let err = emit_pdf("x", &[PathBuf::from("/definitely/not/a/font.ttf")]).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Render {
                format: OutputFormat::Pdf,
                ..
            }
        ));
    }

    #[test]
    fn non_font_file_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = emit_pdf("x", &[path]).unwrap_err();
        assert!(err.to_string().contains("not a font"), "got: {err}");
    }
}
