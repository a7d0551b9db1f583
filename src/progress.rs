//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves from one stage to the next.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log record, or a terminal spinner without
//! the library knowing anything about how the host application communicates.
//! The trait is `Send + Sync` so a config holding it can cross threads.
//!
//! # Example
//!
//! ```rust
//! use edgequake_html2md::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct StageLogger;
//!
//! impl ConversionProgressCallback for StageLogger {
//!     fn on_stage_complete(&self, stage: Stage, output_len: usize) {
//!         eprintln!("{stage} done ({output_len} bytes)");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(StageLogger) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Convert,
    StripArtifacts,
    NormalizeBrackets,
    UnescapeMath,
    Assemble,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Convert,
        Stage::StripArtifacts,
        Stage::NormalizeBrackets,
        Stage::UnescapeMath,
        Stage::Assemble,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Convert => "converting HTML",
            Stage::StripArtifacts => "stripping artifacts",
            Stage::NormalizeBrackets => "normalising brackets",
            Stage::UnescapeMath => "unescaping math",
            Stage::Assemble => "assembling document",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion pipeline as it runs each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the input has been resolved, before conversion.
    ///
    /// # Arguments
    /// * `input`      — the path or URL being converted
    /// * `html_bytes` — size of the HTML text
    fn on_conversion_start(&self, input: &str, html_bytes: usize) {
        let _ = (input, html_bytes);
    }

    /// Called just before a stage runs.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage has produced its output.
    ///
    /// # Arguments
    /// * `stage`      — the stage that finished
    /// * `output_len` — byte length of the text it produced
    fn on_stage_complete(&self, stage: Stage, output_len: usize) {
        let _ = (stage, output_len);
    }

    /// Called once after the document has been assembled.
    fn on_conversion_complete(&self, output_len: usize) {
        let _ = output_len;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
