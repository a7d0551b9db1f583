//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};

/// The assembled document plus the cleaned body it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Final text: header + body + footer when the template is enabled.
    pub markdown: String,
    /// Cleaned converter output, without header or footer.
    pub body: String,
    pub stats: ConversionStats,
}

/// Sizes, counts and timings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Bytes of HTML handed to the converter.
    pub html_bytes: usize,
    /// Bytes of raw converter output.
    pub converted_bytes: usize,
    /// Bytes of the cleaned body.
    pub body_bytes: usize,
    /// Bytes of the assembled document.
    pub output_bytes: usize,
    /// Lines dropped by the artifact stripper.
    pub lines_removed: usize,
    /// Math spans found (and unescaped) in the body.
    pub math_spans: usize,
    /// Whether header and footer were added.
    pub template_applied: bool,
    pub convert_duration_ms: u64,
    pub cleanup_duration_ms: u64,
    pub total_duration_ms: u64,
}
