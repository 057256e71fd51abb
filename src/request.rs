//! What the user asks for: a topic, a tone and a download format.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Voice the post should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Informative,
    Conversational,
    Professional,
    Casual,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Informative,
        Tone::Conversational,
        Tone::Professional,
        Tone::Casual,
    ];

    /// Label used in the prompt and in user-facing lists.
    pub fn label(self) -> &'static str {
        match self {
            Tone::Informative => "Informative",
            Tone::Conversational => "Conversational",
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tone {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tone::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GenerationError::InvalidChoice {
                field: "tone",
                value: s.to_string(),
                expected: Tone::ALL.map(Tone::label).join(", "),
            })
    }
}

/// Download format of the generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// The generated Markdown, byte for byte.
    #[default]
    Markdown,
    /// A US Letter PDF.
    Pdf,
    /// A Word (`.docx`) document.
    Word,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Markdown, OutputFormat::Pdf, OutputFormat::Word];

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "Markdown",
            OutputFormat::Pdf => "PDF",
            OutputFormat::Word => "Word (.docx)",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Word => "docx",
        }
    }

    /// File name offered for download.
    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "blog_post.md",
            OutputFormat::Pdf => "blog_post.pdf",
            OutputFormat::Word => "blog_post.docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = GenerationError;

    /// Accepts the label, the extension, or a few common aliases
    /// (`md`, `word`, `docx`, `Word (.docx)`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "pdf" => Ok(OutputFormat::Pdf),
            "word" | "docx" | "word (.docx)" => Ok(OutputFormat::Word),
            _ => Err(GenerationError::InvalidChoice {
                field: "format",
                value: s.to_string(),
                expected: "markdown, pdf, word".to_string(),
            }),
        }
    }
}

/// One "generate" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRequest {
    pub topic: String,
    pub tone: Tone,
    pub format: OutputFormat,
}

impl BlogRequest {
    pub fn new(topic: impl Into<String>, tone: Tone, format: OutputFormat) -> Self {
        Self {
            topic: topic.into(),
            tone,
            format,
        }
    }

    /// The topic with surrounding whitespace removed, or `MissingTopic`.
    pub fn validated_topic(&self) -> Result<&str, GenerationError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            Err(GenerationError::MissingTopic)
        } else {
            Ok(topic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_and_mime_types() {
        assert_eq!(OutputFormat::Markdown.file_name(), "blog_post.md");
        assert_eq!(OutputFormat::Pdf.file_name(), "blog_post.pdf");
        assert_eq!(OutputFormat::Word.file_name(), "blog_post.docx");
        assert_eq!(OutputFormat::Markdown.mime_type(), "text/markdown");
        assert_eq!(OutputFormat::Pdf.mime_type(), "application/pdf");
        assert!(OutputFormat::Word.mime_type().contains("wordprocessingml"));
        for f in OutputFormat::ALL {
            assert!(f.file_name().ends_with(f.extension()));
        }
    }

    #[test]
    fn parse_tone_case_insensitive() {
        assert_eq!("casual".parse::<Tone>().unwrap(), Tone::Casual);
        assert_eq!(" Professional ".parse::<Tone>().unwrap(), Tone::Professional);
        let err = "snarky".parse::<Tone>().unwrap_err();
        assert!(err.to_string().contains("Informative, Conversational"), "got: {err}");
    }

    #[test]
    fn parse_format_aliases() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("docx".parse::<OutputFormat>().unwrap(), OutputFormat::Word);
        assert_eq!(
            "Word (.docx)".parse::<OutputFormat>().unwrap(),
            OutputFormat::Word
        );
        assert!("rtf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn blank_topic_is_rejected() {
        let req = BlogRequest::new("   ", Tone::Casual, OutputFormat::Pdf);
        assert!(matches!(
            req.validated_topic(),
            Err(GenerationError::MissingTopic)
        ));
        let req = BlogRequest::new("  Rust in 2026 ", Tone::Casual, OutputFormat::Pdf);
        assert_eq!(req.validated_topic().unwrap(), "Rust in 2026");
    }
}
