//! Error types for the blogsmith library.
//!
//! Every failure of a generation action is a [`GenerationError`]. The
//! variants follow the order in which the handler can fail:
//!
//! * **Input / configuration**: the action is rejected before any network
//!   call (`MissingTopic`, `MissingApiKey`, `InvalidConfig`).
//! * **Upstream**: the completion API could not be reached or answered with
//!   something unusable (`Network`, `Auth`, `RateLimited`, `UpstreamStatus`,
//!   `MalformedResponse`).
//! * **Rendering**: the Markdown could not be turned into the requested
//!   document format (`Render`).
//!
//! Front-ends never show these directly; they call
//! [`GenerationError::notification`] and display the single resulting
//! [`Notification`].

use crate::request::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the blogsmith library.
#[derive(Debug, Error)]
pub enum GenerationError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The topic was empty or whitespace only.
    #[error("Please enter a blog topic.")]
    MissingTopic,

    /// A tone or format string did not name a known variant.
    #[error("Invalid {field} '{value}'. Expected one of: {expected}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key was configured.
    #[error("{env_var} not set. Provide an API key with --api-key or the {env_var} environment variable.")]
    MissingApiKey { env_var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The request never produced an HTTP response (DNS, TLS, connection reset…).
    #[error("Could not reach the completion API at '{url}': {reason}")]
    Network { url: String, reason: String },

    /// The API rejected the key (401/403).
    #[error("Authentication error from the completion API (HTTP {status}): {detail}")]
    Auth { status: u16, detail: String },

    /// The API returned HTTP 429.
    #[error("Rate limit exceeded by the completion API{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-2xx response.
    #[error("Completion API returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The response was 2xx but not the expected JSON shape.
    #[error("Unexpected response from the completion API: {detail}")]
    MalformedResponse { detail: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// An emitter failed to produce the requested document.
    #[error("Failed to render {format}: {detail}")]
    Render { format: OutputFormat, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the artifact file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn retry_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!(" (retry after {s}s)"),
        None => String::new(),
    }
}

impl GenerationError {
    /// True when the failure happened before any network call was made.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GenerationError::MissingTopic
                | GenerationError::InvalidChoice { .. }
                | GenerationError::MissingApiKey { .. }
                | GenerationError::InvalidConfig(_)
        )
    }

    /// True for failures that came back from (or on the way to) the completion API.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GenerationError::Network { .. }
                | GenerationError::Auth { .. }
                | GenerationError::RateLimited { .. }
                | GenerationError::UpstreamStatus { .. }
                | GenerationError::MalformedResponse { .. }
        )
    }

    /// Collapse the error into the one message a user gets to see.
    ///
    /// A missing topic is a warning; every other failure is an error.
    /// Upstream and rendering failures share the same generic prefix, so a
    /// broken PDF looks like a failed generation rather than its own class
    /// of problem.
    pub fn notification(&self) -> Notification {
        match self {
            GenerationError::MissingTopic => Notification::warning(self.to_string()),
            GenerationError::MissingApiKey { .. }
            | GenerationError::InvalidChoice { .. }
            | GenerationError::InvalidConfig(_) => Notification::error(self.to_string()),
            _ => Notification::error(format!("Failed to generate blog post: {self}")),
        }
    }
}

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Warning,
    Error,
}

/// A single, non-fatal, user-visible message describing a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NotificationLevel::Warning => write!(f, "warning: {}", self.message),
            NotificationLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_topic_is_a_warning() {
        let n = GenerationError::MissingTopic.notification();
        assert_eq!(n.level, NotificationLevel::Warning);
        assert_eq!(n.message, "Please enter a blog topic.");
    }

    #[test]
    fn missing_key_names_the_variable() {
        let e = GenerationError::MissingApiKey {
            env_var: "GROQ_API_KEY",
        };
        assert!(e.is_precondition());
        let n = e.notification();
        assert_eq!(n.level, NotificationLevel::Error);
        assert!(n.message.starts_with("GROQ_API_KEY not set"), "got: {}", n.message);
    }

    #[test]
    fn upstream_status_display() {
        let e = GenerationError::UpstreamStatus {
            status: 500,
            body: "boom".into(),
        };
        assert!(e.is_upstream());
        let n = e.notification();
        assert_eq!(n.level, NotificationLevel::Error);
        assert!(n.message.starts_with("Failed to generate blog post:"));
        assert!(n.message.contains("HTTP 500"), "got: {}", n.message);
        assert!(n.message.contains("boom"));
    }

    #[test]
    fn render_failure_uses_generic_prefix() {
        let e = GenerationError::Render {
            format: OutputFormat::Pdf,
            detail: "font missing".into(),
        };
        assert!(!e.is_upstream());
        let msg = e.notification().message;
        assert!(msg.starts_with("Failed to generate blog post:"));
        assert!(msg.contains("font missing"));
    }

    #[test]
    fn rate_limit_display_with_and_without_retry() {
        let with = GenerationError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(with.to_string().contains("retry after 30s"));
        let without = GenerationError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(
            without.to_string(),
            "Rate limit exceeded by the completion API"
        );
    }

    #[test]
    fn notification_display_prefixes_level() {
        assert_eq!(
            Notification::warning("careful").to_string(),
            "warning: careful"
        );
        assert_eq!(Notification::error("nope").to_string(), "error: nope");
    }
}
