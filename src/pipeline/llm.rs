//! Completion API interaction: build the chat request and call the endpoint.
//!
//! The stage is deliberately thin. Prompt text lives in [`crate::prompts`];
//! this module only knows the wire format of an OpenAI-compatible
//! `/chat/completions` endpoint and how to turn its failures into
//! [`GenerationError`] variants.
//!
//! There is exactly one attempt per generation. A 5xx, a 429 or a dropped
//! connection is reported to the user as-is; they can press the button again.

use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on how much of an error body is quoted back to the user.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Everything the completion endpoint needs for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Text returned by the completion endpoint plus token usage, if reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

/// Something that can turn a [`CompletionRequest`] into generated text.
///
/// [`HttpCompletionClient`] is the production implementation. Tests and
/// embedders can inject their own through
/// [`crate::config::GeneratorConfigBuilder::client`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GenerationError>;
}

/// Client for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpCompletionClient {
    /// Build a client for `url` authenticating with `api_key`.
    ///
    /// `timeout` bounds the whole request; `None` leaves it unbounded.
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| GenerationError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GenerationError> {
        let body = ChatRequest::from(request);
        debug!(
            "POST {} model={} temperature={} max_tokens={}",
            self.url, body.model, body.temperature, body.max_tokens
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            warn!("Completion API answered HTTP {}", status.as_u16());
            return Err(status_error(status.as_u16(), retry_after_secs, &text));
        }

        let text = response.text().await.map_err(|e| GenerationError::Network {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        parse_completion(&text)
    }
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for ChatRequest<'a> {
    fn from(r: &'a CompletionRequest) -> Self {
        Self {
            model: &r.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &r.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &r.user_prompt,
                },
            ],
            temperature: r.temperature,
            max_tokens: r.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

/// Read `choices[0].message.content` (and usage) out of a response body.
fn parse_completion(body: &str) -> Result<Completion, GenerationError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse {
            detail: format!("invalid JSON: {e}"),
        })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse {
            detail: "response contained no choices".into(),
        })?;

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GenerationError::MalformedResponse {
            detail: "first choice has no message content".into(),
        })?;

    let (prompt_tokens, completion_tokens) = parsed
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((None, None));

    Ok(Completion {
        content,
        prompt_tokens,
        completion_tokens,
    })
}

/// Map a non-2xx status to the matching error variant.
fn status_error(status: u16, retry_after_secs: Option<u64>, body: &str) -> GenerationError {
    let body = truncate(body.trim(), MAX_ERROR_BODY_CHARS);
    match status {
        401 | 403 => GenerationError::Auth {
            status,
            detail: body,
        },
        429 => GenerationError::RateLimited { retry_after_secs },
        _ => GenerationError::UpstreamStatus { status, body },
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "llama-3.3-70b-versatile".into(),
            system_prompt: "sys".into(),
            user_prompt: "usr".into(),
            temperature: 0.7,
            max_tokens: 1500,
        }
    }

    #[test]
    fn request_body_shape() {
        let req = sample_request();
        let json = serde_json::to_value(ChatRequest::from(&req)).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "sys");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["max_tokens"], 1500);
        let t = json["temperature"].as_f64().unwrap();
        assert!((t - 0.7).abs() < 1e-6);
    }

    #[test]
    fn parse_valid_completion() {
        let body = r##"{"choices":[{"message":{"role":"assistant","content":"# Hi"}}],
                       "usage":{"prompt_tokens":12,"completion_tokens":34}}"##;
        let c = parse_completion(body).unwrap();
        assert_eq!(c.content, "# Hi");
        assert_eq!(c.prompt_tokens, Some(12));
        assert_eq!(c.completion_tokens, Some(34));
    }

    #[test]
    fn parse_without_usage() {
        let body = r#"{"choices":[{"message":{"content":"text"}}]}"#;
        let c = parse_completion(body).unwrap();
        assert_eq!(c.prompt_tokens, None);
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        for body in [
            "not json",
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            r#"{"error":{"message":"x"}}"#,
        ] {
            assert!(
                matches!(
                    parse_completion(body),
                    Err(GenerationError::MalformedResponse { .. })
                ),
                "accepted: {body}"
            );
        }
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(500, None, "oops"),
            GenerationError::UpstreamStatus { status: 500, .. }
        ));
        assert!(matches!(
            status_error(401, None, "bad key"),
            GenerationError::Auth { status: 401, .. }
        ));
        assert!(matches!(
            status_error(429, Some(7), ""),
            GenerationError::RateLimited {
                retry_after_secs: Some(7)
            }
        ));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let long = "é".repeat(MAX_ERROR_BODY_CHARS + 50);
        match status_error(502, None, &long) {
            GenerationError::UpstreamStatus { body, .. } => {
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 1);
                assert!(body.ends_with('…'));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
