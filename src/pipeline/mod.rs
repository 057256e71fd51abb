//! Pipeline stages for blog-post generation.
//!
//! Each submodule implements one transformation step, so every step can be
//! tested without the ones around it.
//!
//! ## Data Flow
//!
//! ```text
//! llm ──▶ postprocess ──▶ emit ─┬─ markdown
//! (API)    (cleanup)            ├─ pdf
//!                               └─ docx  (normalize ─▶ classify)
//! ```
//!
//! 1. [`llm`]: the completion call; the only stage with network I/O
//! 2. [`postprocess`]: strip model quirks (outer fences, CRLF, invisible chars)
//! 3. [`normalize`]: per-line cleanup for rich-text output
//! 4. [`classify`]: heading / bullet / paragraph, one line at a time
//! 5. [`emit`]: one emitter per download format

pub mod classify;
pub mod emit;
pub mod llm;
pub mod normalize;
pub mod postprocess;
