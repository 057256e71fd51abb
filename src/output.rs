//! Results handed back to the front-end after a successful generation.

use crate::request::OutputFormat;
use serde::{Deserialize, Serialize};

/// Downloadable bytes plus the file name and MIME type to offer them under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub format: OutputFormat,
    pub file_name: String,
    pub mime_type: String,
    /// Omitted from JSON output; use `size_bytes` there.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size_bytes: usize,
}

impl OutputArtifact {
    /// Wrap `bytes` with the metadata of `format`.
    pub fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: format.file_name().to_string(),
            mime_type: format.mime_type().to_string(),
            size_bytes: bytes.len(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Timing and token usage for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Prompt tokens, when the API reports usage.
    pub prompt_tokens: Option<u32>,
    /// Completion tokens, when the API reports usage.
    pub completion_tokens: Option<u32>,
    /// Wall-clock time of the completion call.
    pub api_duration_ms: u64,
    /// Time spent in the emitter.
    pub render_duration_ms: u64,
    /// Whole action, validation to artifact.
    pub total_duration_ms: u64,
}

/// A generated post: the Markdown to display and the artifact to download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPost {
    /// GeneratedText: what the completion API produced (after cleanup).
    pub markdown: String,
    pub artifact: OutputArtifact,
    pub stats: GenerationStats,
}
