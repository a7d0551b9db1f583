//! Error types for the edgequake-html2md library.
//!
//! Every failure is fatal: the conversion of a document either completes
//! end-to-end or stops at the first error. There is no per-page or per-span
//! partial result to salvage and no transient failure mode worth retrying,
//! so a single enum covers the whole library.
//!
//! The variants are grouped by the stage that raises them:
//!
//! * **Dependency** — the external converter is missing. Checked before any
//!   input is read so the user learns about a broken install first.
//! * **Input** — the path/URL cannot be resolved to HTML text.
//! * **Converter** — the converter ran but failed.
//! * **Cleanup** — only raised in strict-math mode, when math delimiters
//!   cannot be paired.
//! * **Output / Config** — writing the result or validating the builder.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-html2md library.
#[derive(Debug, Error)]
pub enum Html2MdError {
    // ── Dependency errors ─────────────────────────────────────────────────
    /// A required external tool is not installed or not on `PATH`.
    #[error("Required tool '{tool}' was not found.\n{hint}")]
    MissingDependency { tool: String, hint: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a usable file path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter process exited unsuccessfully.
    #[error("Converter '{tool}' failed ({status}): {stderr}")]
    ConverterFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// Talking to the converter process failed (spawn, pipe, wait).
    #[error("I/O error while running converter '{tool}': {source}")]
    ConverterIo {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    // ── Cleanup errors ────────────────────────────────────────────────────
    /// A math delimiter has no partner (strict-math mode only).
    #[error(
        "Unbalanced math delimiter '{delimiter}' at line {line}, column {column}\n\
Disable --strict-math to leave unmatched delimiters untouched."
    )]
    UnbalancedMathDelimiter {
        delimiter: String,
        line: usize,
        column: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dependency_display() {
        let e = Html2MdError::MissingDependency {
            tool: "pandoc".into(),
            hint: "Install it from https://pandoc.org/installing.html".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'pandoc'"), "got: {msg}");
        assert!(msg.contains("pandoc.org"), "got: {msg}");
    }

    #[test]
    fn file_not_found_display() {
        let e = Html2MdError::FileNotFound {
            path: PathBuf::from("/tmp/missing.html"),
        };
        assert!(e.to_string().contains("/tmp/missing.html"));
    }

    #[test]
    fn converter_failed_display() {
        let e = Html2MdError::ConverterFailed {
            tool: "pandoc".into(),
            status: "exit status: 64".into(),
            stderr: "Unknown input format".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("exit status: 64"));
        assert!(msg.contains("Unknown input format"));
    }

    #[test]
    fn unbalanced_delimiter_display() {
        let e = Html2MdError::UnbalancedMathDelimiter {
            delimiter: "\\[".into(),
            line: 3,
            column: 7,
        };
        let msg = e.to_string();
        assert!(msg.contains("line 3, column 7"), "got: {msg}");
        assert!(msg.contains("\\["));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Html2MdError::OutputWriteFailed {
            path: PathBuf::from("out.md"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("disk full"));
    }
}
