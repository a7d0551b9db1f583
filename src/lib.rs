//! # edgequake-html2md
//!
//! Convert HTML documents to clean, math-friendly Markdown.
//!
//! ## Why this crate?
//!
//! pandoc converts HTML to Markdown faithfully, but the result is written
//! for pandoc: fenced divs, attribute spans, `{.class}` blocks, and TeX whose
//! every `_` and `*` has been backslash-escaped. Pasted into a Markdown
//! editor with MathJax or KaTeX, formulae break and noise lines pile up.
//! This crate runs pandoc, then applies a small set of deterministic rewrite
//! passes that remove the noise and unescape *only* what sits inside math
//! delimiters, leaving prose escapes alone.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Convert    pandoc -f html -t markdown (or an injected converter)
//!  ├─ 3. Artifacts  drop ::: fences and dash rules, unwrap [text]{attrs}
//!  ├─ 4. Brackets   drop {.class} blocks, collapse \\[ → \[, [ \[ → \[
//!  ├─ 5. Math       unescape inside \[…\], \(…\), $$…$$ only
//!  └─ 6. Assemble   optional header + body + optional footer
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_html2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("lecture.html", &config).await?;
//!     println!("{}", output.markdown);
//!     eprintln!("{} math spans cleaned", output.stats.math_spans);
//!     Ok(())
//! }
//! ```
//!
//! The cleanup passes are plain functions and need neither pandoc nor a
//! runtime:
//!
//! ```rust
//! use edgequake_html2md::clean_markdown;
//!
//! let md = clean_markdown(r"Area \\( \\pi r\^2 \\) stays \_ escaped outside.");
//! assert_eq!(md, r"Area \( \pi r^2 \) stays \_ escaped outside.");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-html2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Known limitation
//!
//! Math spans are matched non-greedily. A missing closing delimiter makes
//! the opener pair with the next closer of the same kind, or leaves the rest
//! of the document unprocessed. Unmatched delimiters are logged; enable
//! [`ConversionConfig::strict_math`] to fail instead.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    assemble_document, convert, convert_html, convert_sync, convert_to_file, convert_with,
};
pub use error::Html2MdError;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::artifacts::strip_artifacts;
pub use pipeline::brackets::normalize_brackets;
pub use pipeline::converter::{HtmlConverter, PandocConverter, PassthroughConverter};
pub use pipeline::input::default_output_path;
pub use pipeline::math::{unescape_math_spans, MathDelimiter, MathSpan};
pub use pipeline::postprocess::clean_markdown;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use template::{Template, DEFAULT_FOOTER, DEFAULT_HEADER};
