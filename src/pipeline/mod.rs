//! Pipeline stages for HTML-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different converter) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ converter ──▶ artifacts ──▶ brackets ──▶ math
//! (URL/path)  (pandoc)     (noise)       (escapes)    (spans)
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local file
//! 2. [`converter`] — HTML → Markdown through an injected [`converter::HtmlConverter`];
//!    the only stage with process I/O
//! 3. [`artifacts`] — drop fenced divs and dash rules, unwrap attribute spans
//! 4. [`brackets`]  — strip `{.class}` blocks and collapse over-escaped delimiters
//! 5. [`math`]      — unescape backslash sequences inside math spans only
//!
//! [`postprocess`] chains stages 3–5.

pub mod artifacts;
pub mod brackets;
pub mod converter;
pub mod input;
pub mod math;
pub mod postprocess;
