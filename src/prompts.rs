//! Prompts sent to the completion API.
//!
//! Both prompts live here so tests can inspect them without a network call.
//! Callers can replace the system prompt through
//! [`crate::config::GeneratorConfig::system_prompt`]; the user prompt is
//! always built from the request.

use crate::request::Tone;

/// Default system role description.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional blog writer and researcher.";

/// Build the user-role prompt for a topic and tone.
///
/// The topic is inserted inside double quotes exactly as given.
pub fn user_prompt(topic: &str, tone: Tone) -> String {
    format!(
        r#"
Write a high-quality, well-structured blog post on the topic: "{topic}". The blog post should:

1. Be engaging, informative, and human-like in tone ({tone}).
2. Use Markdown-style headings and subheadings.
3. Be written in simple, reader-friendly language.
4. Be free of plagiarism and fluff.
5. Include facts, examples, and if appropriate, recent statistics or case studies.

Start writing the blog now.
"#,
        topic = topic,
        tone = tone.label()
    )
}
