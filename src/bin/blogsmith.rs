//! CLI binary for blogsmith.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `GeneratorConfig` + `BlogRequest`, prints the post and saves the
//! requested download.

use anyhow::{Context, Result};
use blogsmith::{
    generate_post, write_artifact, BlogRequest, GenerationError, GenerationProgressCallback,
    GeneratorConfig, NotificationLevel, OutputFormat, ProgressCallback, Tone,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the request is in flight and the file is rendered.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Writing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_request_start(&self, topic: &str, tone: Tone) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{tone} post on \"{topic}\""))
        ));
        self.bar.set_message("Crafting your blog with AI magic…");
    }

    fn on_completion_received(&self, markdown_len: usize) {
        self.bar.println(format!(
            "  {} Draft received  {}",
            green("✓"),
            dim(&format!("{markdown_len} chars"))
        ));
    }

    fn on_render_start(&self, format: OutputFormat) {
        self.bar.set_prefix("Rendering");
        self.bar.set_message(format!("{format}…"));
    }

    fn on_render_complete(&self, format: OutputFormat, bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "  {} {} ready  {}",
            green("✓"),
            format,
            dim(&format!("{bytes} bytes"))
        );
    }

    fn on_failure(&self, _message: &str) {
        // main() prints the notification itself
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to stdout and ./blog_post.md
  blogsmith --topic "Future of AI in Education"

  # Conversational tone, Word download into ./out
  blogsmith -t "Remote work habits" --tone conversational -f word -o out

  # PDF with a custom body font
  blogsmith -t "Rust for data engineers" -f pdf --pdf-font ~/fonts/Inter.ttf

  # Keep the model's raw answer (no fence / whitespace cleanup)
  blogsmith -t "Sourdough basics" --raw

  # JSON summary (post + artifact metadata) for scripting
  blogsmith -t "Kubernetes costs" --json > post.json

TONES:
  informative (default), conversational, professional, casual

FORMATS:
  Format     File             MIME type
  ────────   ──────────────   ───────────────────────────────────────────────
  markdown   blog_post.md     text/markdown
  pdf        blog_post.pdf    application/pdf
  word       blog_post.docx   application/vnd.openxmlformats-officedocument.wordprocessingml.document

ENVIRONMENT VARIABLES:
  GROQ_API_KEY         API key for the completion endpoint (required)
  BLOGSMITH_API_URL    Override the chat completion URL
  BLOGSMITH_MODEL      Override the model ID

SETUP:
  1. Set API key:  export GROQ_API_KEY=gsk_...
  2. Generate:     blogsmith -t "My topic" -f pdf
"#;

/// Generate a blog post with an LLM and save it as Markdown, PDF or Word.
#[derive(Parser, Debug)]
#[command(
    name = "blogsmith",
    version,
    about = "Generate a blog post with an LLM and save it as Markdown, PDF or Word",
    long_about = "Send one topic and tone to an OpenAI-compatible chat completion endpoint, \
print the generated Markdown and save it as Markdown, PDF or Word (.docx).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Blog topic, e.g. "Future of AI in Education".
    #[arg(short, long)]
    topic: String,

    /// Tone of voice.
    #[arg(long, env = "BLOGSMITH_TONE", value_enum, default_value = "informative")]
    tone: ToneArg,

    /// Download format.
    #[arg(short, long, env = "BLOGSMITH_FORMAT", value_enum, default_value = "markdown")]
    format: FormatArg,

    /// Directory the download is written to.
    #[arg(short, long, env = "BLOGSMITH_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// API key for the completion endpoint.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat completion endpoint URL.
    #[arg(long, env = "BLOGSMITH_API_URL")]
    api_url: Option<String>,

    /// Model ID.
    #[arg(long, env = "BLOGSMITH_MODEL")]
    model: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "BLOGSMITH_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Maximum tokens to generate.
    #[arg(long, env = "BLOGSMITH_MAX_TOKENS", default_value_t = 1500)]
    max_tokens: usize,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "BLOGSMITH_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Extra font file for PDF output (repeatable).
    #[arg(long = "pdf-font", value_name = "PATH")]
    pdf_fonts: Vec<PathBuf>,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "BLOGSMITH_TIMEOUT")]
    timeout: Option<u64>,

    /// Keep the model's answer exactly as returned.
    #[arg(long)]
    raw: bool,

    /// Output a JSON summary instead of the Markdown text.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "BLOGSMITH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BLOGSMITH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BLOGSMITH_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ToneArg {
    Informative,
    Conversational,
    Professional,
    Casual,
}

impl From<ToneArg> for Tone {
    fn from(v: ToneArg) -> Self {
        match v {
            ToneArg::Informative => Tone::Informative,
            ToneArg::Conversational => Tone::Conversational,
            ToneArg::Professional => Tone::Professional,
            ToneArg::Casual => Tone::Casual,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    #[value(alias = "md")]
    Markdown,
    Pdf,
    #[value(alias = "docx")]
    Word,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Word => OutputFormat::Word,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level feedback; only errors get through.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;
    let request = BlogRequest::new(cli.topic.clone(), cli.tone.clone().into(), cli.format.clone().into());

    // ── Generate ─────────────────────────────────────────────────────────
    let post = match generate_post(&request, &config).await {
        Ok(post) => post,
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    };

    let path = write_artifact(&post.artifact, &cli.output_dir)
        .await
        .context("Failed to save the download")?;

    if cli.json {
        let summary = serde_json::json!({
            "topic": request.topic,
            "tone": request.tone,
            "post": post,
            "path": path,
        });
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(post.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !post.markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}  {}  {}ms  →  {}",
            green("✔"),
            post.artifact.mime_type,
            post.stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
        if let (Some(input), Some(output)) = (post.stats.prompt_tokens, post.stats.completion_tokens) {
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&input.to_string()),
                dim(&output.to_string()),
            );
        }
    }

    Ok(())
}

/// Print the user-facing notification for a failed generation.
fn report(err: &GenerationError) {
    let note = err.notification();
    match note.level {
        NotificationLevel::Warning => eprintln!("{} {}", yellow("⚠"), note.message),
        NotificationLevel::Error => eprintln!("{} {}", red("✘"), note.message),
    }
}

/// Map CLI args to `GeneratorConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GeneratorConfig> {
    let mut builder = GeneratorConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .clean_output(!cli.raw);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.api_url(url.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    for font in &cli.pdf_fonts {
        builder = builder.pdf_font_path(font.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
