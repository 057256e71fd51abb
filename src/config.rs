//! Configuration for blog-post generation.
//!
//! A [`GeneratorConfig`] is built once at start-up (via
//! [`GeneratorConfig::builder`] or [`GeneratorConfig::from_env`]) and passed
//! into every generation call. The API key lives here too, so a missing key
//! is an ordinary input the handler can check before touching the network.

use crate::error::GenerationError;
use crate::pipeline::llm::CompletionClient;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable read by [`GeneratorConfig::from_env`].
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default OpenAI-compatible chat completion endpoint.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration for one generator instance.
///
/// # Example
/// ```rust
/// use blogsmith::GeneratorConfig;
///
/// let config = GeneratorConfig::builder()
///     .api_key("gsk_...")
///     .temperature(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 1500);
/// ```
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Bearer token for the completion API. `None` fails every generation
    /// with [`GenerationError::MissingApiKey`].
    pub api_key: Option<String>,

    /// Chat completion endpoint. Default: Groq's OpenAI-compatible URL.
    pub api_url: String,

    /// Model identifier sent with every request. Default: `llama-3.3-70b-versatile`.
    pub model: String,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum generated tokens. Default: 1500.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Clean the raw completion (outer fences, CRLF, invisible characters)
    /// before it is rendered. Default: true.
    pub clean_output: bool,

    /// Optional whole-request timeout in seconds. Default: None (wait for
    /// the API to answer or fail).
    pub request_timeout_secs: Option<u64>,

    /// Font files handed to the PDF typesetter.
    pub pdf_font_paths: Vec<PathBuf>,

    /// Pre-constructed completion client. Takes precedence over the HTTP
    /// client built from `api_url` / `api_key`.
    pub client: Option<Arc<dyn CompletionClient>>,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            system_prompt: None,
            clean_output: true,
            request_timeout_secs: None,
            pdf_font_paths: Vec::new(),
            client: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("clean_output", &self.clean_output)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("pdf_font_paths", &self.pdf_font_paths)
            .field("client", &self.client.as_ref().map(|_| "<dyn CompletionClient>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl GeneratorConfig {
    /// Create a new builder for `GeneratorConfig`.
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus the API key from `GROQ_API_KEY`, if set and non-empty.
    ///
    /// A missing key is not an error here; it is reported by the first
    /// generation attempt.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// The configured key, or `MissingApiKey`.
    pub fn require_api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey {
                env_var: API_KEY_ENV,
            })
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn pdf_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdf_font_paths.push(path.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The API key is deliberately not validated here; see
    /// [`GeneratorConfig::require_api_key`].
    pub fn build(self) -> Result<GeneratorConfig, GenerationError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(GenerationError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(GenerationError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.api_url.starts_with("http://") || c.api_url.starts_with("https://")) {
            return Err(GenerationError::InvalidConfig(format!(
                "api_url must be an HTTP/HTTPS URL, got '{}'",
                c.api_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(GenerationError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
