//! Progress-callback trait for generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GeneratorConfigBuilder::progress_callback`] to be told
//! when the completion call starts, when text arrives and when the artifact
//! is rendered. The CLI uses it to drive its spinner; a web front-end could
//! forward the same events to a status line.
//!
//! # Example
//!
//! ```rust
//! use blogsmith::{GenerationProgressCallback, GeneratorConfig, OutputFormat};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl GenerationProgressCallback for Printer {
//!     fn on_render_complete(&self, format: OutputFormat, bytes: usize) {
//!         eprintln!("{format}: {bytes} bytes");
//!     }
//! }
//!
//! let config = GeneratorConfig::builder()
//!     .api_key("gsk_test")
//!     .progress_callback(Arc::new(Printer) as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::request::{OutputFormat, Tone};
use std::sync::Arc;

/// Called by the generation handler as it moves through its stages.
///
/// All methods default to no-ops so implementors only override what they
/// need. Implementations must be `Send + Sync`; rendering runs on the
/// blocking pool.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called right before the completion request is sent.
    fn on_request_start(&self, topic: &str, tone: Tone) {
        let _ = (topic, tone);
    }

    /// Called when the completion API has answered with usable text.
    fn on_completion_received(&self, markdown_len: usize) {
        let _ = markdown_len;
    }

    /// Called before the chosen emitter runs.
    fn on_render_start(&self, format: OutputFormat) {
        let _ = format;
    }

    /// Called once the artifact bytes exist.
    fn on_render_complete(&self, format: OutputFormat, bytes: usize) {
        let _ = (format, bytes);
    }

    /// Called once when the action fails, with the user-facing message.
    fn on_failure(&self, message: &str) {
        let _ = message;
    }
}

/// Shared, thread-safe handle to a callback.
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

/// Callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl GenerationProgressCallback for Recorder {
        fn on_render_start(&self, format: OutputFormat) {
            self.events.lock().unwrap().push(format!("start {format}"));
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let rec = Recorder::default();
        rec.on_request_start("t", Tone::Casual);
        rec.on_completion_received(10);
        rec.on_render_start(OutputFormat::Pdf);
        rec.on_render_complete(OutputFormat::Pdf, 100);
        rec.on_failure("x");
        assert_eq!(*rec.events.lock().unwrap(), vec!["start PDF".to_string()]);
    }

    #[test]
    fn noop_is_object_safe() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_failure("ignored");
    }
}
