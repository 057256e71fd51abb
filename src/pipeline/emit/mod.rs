//! Document emitters: GeneratedText → downloadable bytes.
//!
//! One emitter per [`OutputFormat`]. All three read the same immutable
//! Markdown and never modify it; only the Word path runs the text through
//! [`crate::pipeline::normalize`] and [`crate::pipeline::classify`].
//!
//! ```text
//! markdown ──┬─▶ markdown  (identity)
//!            ├─▶ pdf       (HTML → one typeset block per line → PDF)
//!            └─▶ docx      (clean → classify → heading / bullet / paragraph)
//! ```

pub mod docx;
pub mod pdf;

use crate::error::GenerationError;
use crate::output::OutputArtifact;
use crate::request::OutputFormat;
use std::path::PathBuf;
use tracing::debug;

/// Options the emitters need beyond the text itself.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Extra font files for the PDF typesetter.
    pub pdf_font_paths: Vec<PathBuf>,
}

/// Render `markdown` in `format` and wrap it with its download metadata.
pub fn render(
    markdown: &str,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<OutputArtifact, GenerationError> {
    let bytes = match format {
        OutputFormat::Markdown => emit_markdown(markdown),
        OutputFormat::Pdf => pdf::emit_pdf(markdown, &options.pdf_font_paths)?,
        OutputFormat::Word => docx::emit_docx(markdown)?,
    };
    debug!("Rendered {} → {} bytes", format, bytes.len());
    Ok(OutputArtifact::new(format, bytes))
}

/// The Markdown emitter: the generated text, byte for byte.
pub fn emit_markdown(markdown: &str) -> Vec<u8> {
    markdown.as_bytes().to_vec()
}
