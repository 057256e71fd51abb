//! # blogsmith
//!
//! Generate a blog post with an LLM and download it as Markdown, PDF or Word.
//!
//! One user action (a topic, a tone and a download format) produces one
//! chat-completion request. The returned Markdown is shown as-is and
//! converted into the requested file format in process; no temporary files
//! are written unless you ask for them with [`write_artifact`].
//!
//! ## Pipeline Overview
//!
//! ```text
//! BlogRequest
//!  │
//!  ├─ 1. Validate  blank topic / missing API key → no network call
//!  ├─ 2. Complete  one POST to an OpenAI-compatible chat endpoint
//!  ├─ 3. Polish    strip outer fences, CRLF, invisible chars (optional)
//!  └─ 4. Emit      Markdown (identity) │ PDF (HTML → typst) │ Word (docx)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blogsmith::{generate_post, BlogRequest, GeneratorConfig, OutputFormat, Tone};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GROQ_API_KEY
//!     let config = GeneratorConfig::from_env();
//!     let request = BlogRequest::new("Future of AI in Education", Tone::Informative, OutputFormat::Word);
//!     let post = generate_post(&request, &config).await?;
//!     println!("{}", post.markdown);
//!     std::fs::write(&post.artifact.file_name, &post.artifact.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Rendering without the API
//!
//! The emitters are plain functions of the Markdown text:
//!
//! ```rust
//! use blogsmith::{render_artifact, GeneratorConfig, OutputFormat};
//!
//! let config = GeneratorConfig::default();
//! let docx = render_artifact("# Title\n\n- point", OutputFormat::Word, &config).unwrap();
//! assert_eq!(docx.file_name, "blog_post.docx");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `blogsmith` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! blogsmith = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GeneratorConfig, GeneratorConfigBuilder, API_KEY_ENV, DEFAULT_API_URL, DEFAULT_MODEL};
pub use error::{GenerationError, Notification, NotificationLevel};
pub use generate::{
    generate_post, generate_post_sync, generate_post_with_client, render_artifact, write_artifact,
};
pub use output::{GenerationStats, OutputArtifact, RenderedPost};
pub use pipeline::llm::{Completion, CompletionClient, CompletionRequest, HttpCompletionClient};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::{BlogRequest, OutputFormat, Tone};
