//! The generation handler: one user action in, one post and artifact out.
//!
//! [`generate_post`] is the explicit request/response function a front-end
//! calls once per click. It never re-runs on its own and keeps no state
//! between calls:
//!
//! 1. validate the topic (no network call for a blank topic)
//! 2. validate the API key (no network call without one)
//! 3. one completion request
//! 4. optional cleanup of the returned text
//! 5. render the requested format on the blocking pool
//!
//! Any failure along the way comes back as a single [`GenerationError`];
//! call [`GenerationError::notification`] to get the message to display.

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::output::{GenerationStats, OutputArtifact, RenderedPost};
use crate::pipeline::emit::{self, RenderOptions};
use crate::pipeline::llm::{CompletionClient, CompletionRequest, HttpCompletionClient};
use crate::pipeline::postprocess;
use crate::prompts::{user_prompt, DEFAULT_SYSTEM_PROMPT};
use crate::request::{BlogRequest, OutputFormat, Tone};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Generate a blog post and render it in the requested format.
///
/// The completion client is `config.client` when set, otherwise an
/// [`HttpCompletionClient`] for `config.api_url`.
///
/// # Errors
/// - [`GenerationError::MissingTopic`] / [`GenerationError::MissingApiKey`]
///   before any network traffic
/// - upstream errors from the completion API
/// - [`GenerationError::Render`] when the emitter fails
///
/// # Example
/// ```rust,no_run
/// use blogsmith::{generate_post, BlogRequest, GeneratorConfig, OutputFormat, Tone};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = GeneratorConfig::from_env();
/// let request = BlogRequest::new("Future of AI in Education", Tone::Informative, OutputFormat::Pdf);
/// match generate_post(&request, &config).await {
///     Ok(post) => println!("{} ({} bytes)", post.artifact.file_name, post.artifact.len()),
///     Err(e) => eprintln!("{}", e.notification()),
/// }
/// # }
/// ```
pub async fn generate_post(
    request: &BlogRequest,
    config: &GeneratorConfig,
) -> Result<RenderedPost, GenerationError> {
    let outcome = validate_and_generate(request, config, None).await;
    report_failure(config, outcome)
}

/// Same as [`generate_post`], with an explicit completion client.
///
/// The API key is still required; the check is part of the action's
/// contract, not of the transport.
pub async fn generate_post_with_client(
    request: &BlogRequest,
    config: &GeneratorConfig,
    client: &dyn CompletionClient,
) -> Result<RenderedPost, GenerationError> {
    let outcome = validate_and_generate(request, config, Some(client)).await;
    report_failure(config, outcome)
}

/// Synchronous wrapper around [`generate_post`].
///
/// Creates a temporary tokio runtime internally; do not call it from inside
/// an async context.
pub fn generate_post_sync(
    request: &BlogRequest,
    config: &GeneratorConfig,
) -> Result<RenderedPost, GenerationError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GenerationError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_post(request, config))
}

/// Render already-generated Markdown without calling the API.
pub fn render_artifact(
    markdown: &str,
    format: OutputFormat,
    config: &GeneratorConfig,
) -> Result<OutputArtifact, GenerationError> {
    emit::render(markdown, format, &render_options(config))
}

/// Write `artifact` into `dir` under its own file name.
///
/// Uses atomic write (temp file + rename) so a failed write never leaves a
/// truncated document behind. Returns the final path.
pub async fn write_artifact(
    artifact: &OutputArtifact,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, GenerationError> {
    let dir = dir.as_ref();
    let path = dir.join(&artifact.file_name);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| GenerationError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    let tmp_path = dir.join(format!("{}.tmp", artifact.file_name));
    tokio::fs::write(&tmp_path, &artifact.bytes)
        .await
        .map_err(|e| GenerationError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| GenerationError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Wrote {} ({} bytes)", path.display(), artifact.len());
    Ok(path)
}

/// Build the completion request for a validated topic.
pub fn build_completion_request(topic: &str, tone: Tone, config: &GeneratorConfig) -> CompletionRequest {
    CompletionRequest {
        model: config.model.clone(),
        system_prompt: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        user_prompt: user_prompt(topic, tone),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn validate_and_generate(
    request: &BlogRequest,
    config: &GeneratorConfig,
    client: Option<&dyn CompletionClient>,
) -> Result<RenderedPost, GenerationError> {
    let topic = request.validated_topic()?;
    let api_key = config.require_api_key()?;

    match client {
        Some(client) => run(topic, request, config, client).await,
        None => {
            let client = resolve_client(config, api_key)?;
            run(topic, request, config, client.as_ref()).await
        }
    }
}

/// Use the injected client, or build the HTTP one from the config.
fn resolve_client(
    config: &GeneratorConfig,
    api_key: &str,
) -> Result<Arc<dyn CompletionClient>, GenerationError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }
    let timeout = config.request_timeout_secs.map(Duration::from_secs);
    let client = HttpCompletionClient::new(&config.api_url, api_key, timeout)?;
    Ok(Arc::new(client))
}

async fn run(
    topic: &str,
    request: &BlogRequest,
    config: &GeneratorConfig,
    client: &dyn CompletionClient,
) -> Result<RenderedPost, GenerationError> {
    let total_start = Instant::now();
    let format = request.format;
    info!(
        "Generating {} post on {:?} as {}",
        request.tone, topic, format
    );

    // ── Step 1: Completion ───────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_request_start(topic, request.tone);
    }
    let completion_request = build_completion_request(topic, request.tone, config);
    let api_start = Instant::now();
    let completion = client.complete(&completion_request).await?;
    let api_duration_ms = api_start.elapsed().as_millis() as u64;
    debug!(
        "Completion: {} chars in {}ms (tokens in/out: {:?}/{:?})",
        completion.content.len(),
        api_duration_ms,
        completion.prompt_tokens,
        completion.completion_tokens
    );

    // ── Step 2: Cleanup ──────────────────────────────────────────────────
    let markdown = if config.clean_output {
        postprocess::clean_completion(&completion.content)
    } else {
        completion.content
    };
    if markdown.trim().is_empty() {
        return Err(GenerationError::MalformedResponse {
            detail: "completion was empty after cleanup".into(),
        });
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_completion_received(markdown.len());
        cb.on_render_start(format);
    }

    // ── Step 3: Render ───────────────────────────────────────────────────
    let render_start = Instant::now();
    let options = render_options(config);
    let (markdown, artifact) = tokio::task::spawn_blocking(move || {
        let artifact = emit::render(&markdown, format, &options);
        (markdown, artifact)
    })
    .await
    .map_err(|e| GenerationError::Internal(format!("render task failed: {e}")))?;
    let artifact = artifact?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(format, artifact.len());
    }

    let stats = GenerationStats {
        prompt_tokens: completion.prompt_tokens,
        completion_tokens: completion.completion_tokens,
        api_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generated {} ({} bytes) in {}ms",
        artifact.file_name,
        artifact.len(),
        stats.total_duration_ms
    );

    Ok(RenderedPost {
        markdown,
        artifact,
        stats,
    })
}

fn render_options(config: &GeneratorConfig) -> RenderOptions {
    RenderOptions {
        pdf_font_paths: config.pdf_font_paths.clone(),
    }
}

/// Log a failed action and tell the progress callback, then pass the result through.
fn report_failure(
    config: &GeneratorConfig,
    outcome: Result<RenderedPost, GenerationError>,
) -> Result<RenderedPost, GenerationError> {
    if let Err(ref e) = outcome {
        if e.is_precondition() {
            warn!("Generation rejected: {}", e);
        } else {
            warn!("Generation failed: {}", e);
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_failure(&e.notification().message);
        }
    }
    outcome
}
