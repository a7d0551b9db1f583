//! Post-processing: deterministic cleanup of converter-generated Markdown.
//!
//! ## Why is post-processing necessary?
//!
//! pandoc's Markdown is faithful but noisy when the target is a plain
//! Markdown editor with MathJax/KaTeX:
//!
//! - `<div>` and `<span>` survive as `:::` fences and `[text]{.class}`
//! - `<hr>` and layout tables leave dash-only separator lines
//! - TeX written as page text comes back double-escaped (`\\[ … \\]`)
//! - punctuation inside math is backslash-escaped (`\_`, `\*`, `\{`)
//!
//! This module chains the three cleanup stages; each one lives in its own
//! module and is a pure `&str → String` function.
//!
//! ## Rule Order
//!
//! Stages must run in this order: artifacts are removed first so their
//! `{…}` attribute blocks never reach the brace rule, and brackets are
//! normalised before math unescaping so that `\\[` has already become the
//! `\[` delimiter the span matcher looks for.

use super::{artifacts, brackets, math};
use crate::error::Html2MdError;
use crate::progress::{ConversionProgressCallback, Stage};

/// Apply all cleanup stages to converter output.
///
/// 1. Strip converter artifacts (div fences, dash rules, attribute spans)
/// 2. Normalise escaped brackets around math delimiters
/// 3. Unescape backslash sequences inside math spans
pub fn clean_markdown(input: &str) -> String {
    let s = artifacts::strip_artifacts(input);
    let s = brackets::normalize_brackets(&s);
    math::unescape_math_spans(&s)
}

/// Output of [`clean_with`]: the cleaned body plus what the stages did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleanup {
    pub body: String,
    pub lines_removed: usize,
    pub math_spans: usize,
}

/// [`clean_markdown`] with stage reporting and optional strict math.
///
/// With `strict_math`, unmatched math delimiters in the bracket-normalised
/// text abort the cleanup with [`Html2MdError::UnbalancedMathDelimiter`].
pub fn clean_with(
    input: &str,
    strict_math: bool,
    progress: Option<&dyn ConversionProgressCallback>,
) -> Result<Cleanup, Html2MdError> {
    let stripped = run_stage(progress, Stage::StripArtifacts, || {
        artifacts::strip_artifacts(input)
    });
    let lines_removed = count_lines(input).saturating_sub(count_lines(&stripped));

    let normalized = run_stage(progress, Stage::NormalizeBrackets, || {
        brackets::normalize_brackets(&stripped)
    });
    let spans = math::find_math_spans(&normalized);
    if strict_math {
        math::check_balanced_with_spans(&normalized, &spans)?;
    } else {
        math::warn_stray_delimiters(&normalized, &spans);
    }

    let body = run_stage(progress, Stage::UnescapeMath, || {
        math::unescape_with_spans(&normalized, &spans)
    });
    let math_spans = spans.len();

    Ok(Cleanup {
        body,
        lines_removed,
        math_spans,
    })
}

/// Run `f` as `stage`, reporting start and output size to `progress`.
pub(crate) fn run_stage(
    progress: Option<&dyn ConversionProgressCallback>,
    stage: Stage,
    f: impl FnOnce() -> String,
) -> String {
    if let Some(cb) = progress {
        cb.on_stage_start(stage);
    }
    let out = f();
    tracing::debug!("Stage '{}' produced {} bytes", stage, out.len());
    if let Some(cb) = progress {
        cb.on_stage_complete(stage, out.len());
    }
    out
}

fn count_lines(text: &str) -> usize {
    text.split_inclusive('\n').count()
}
