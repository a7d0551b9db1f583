//! Math-span unescaping.
//!
//! pandoc protects TeX inside Markdown by backslash-escaping punctuation, so
//! `\( a_1 * b \)` comes back as `\( a\_1 \* b \)`. Those escapes are
//! harmless in prose but break the TeX once a Markdown renderer hands the
//! span to MathJax/KaTeX. This pass removes them, and only them:
//!
//! - a span is `\[ … \]`, `\( … \)` or `$$ … $$`, matched non-greedily and
//!   left to right, so every delimiter pairs with the nearest closer
//! - delimiters and everything outside spans are copied byte for byte
//! - inside a span, `\Y` becomes `Y` while `\\X` becomes `\X`
//!
//! The second point is the subtle one. Unescaping in a single sweep turns
//! `\\X` into `X`: the first backslash escapes the second, then the second
//! escapes `X`. The interior is therefore rewritten in three steps over a
//! token list in which a hidden backslash is its own variant, so the marker
//! can never be confused with a character of the document:
//!
//! 1. `\\X` → `[hidden] X`
//! 2. `\Y` → `Y` (a hidden marker counts as the `Y`)
//! 3. `[hidden]` → `\`

use crate::error::Html2MdError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

static RE_MATH_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\\[(.*?)\\\]|\\\((.*?)\\\)|\$\$(.*?)\$\$").unwrap()
});

static RE_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\[|\\\]|\\\(|\\\)|\$\$").unwrap());

/// The three delimiter pairs that open a math span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathDelimiter {
    /// Display math: `\[ … \]`.
    Bracket,
    /// Inline math: `\( … \)`.
    Paren,
    /// Display math, TeX style: `$$ … $$`.
    DoubleDollar,
}

impl MathDelimiter {
    pub fn open(self) -> &'static str {
        match self {
            MathDelimiter::Bracket => r"\[",
            MathDelimiter::Paren => r"\(",
            MathDelimiter::DoubleDollar => "$$",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            MathDelimiter::Bracket => r"\]",
            MathDelimiter::Paren => r"\)",
            MathDelimiter::DoubleDollar => "$$",
        }
    }
}

impl fmt::Display for MathDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…{}", self.open(), self.close())
    }
}

/// A math span located in a document.
///
/// `start..end` is the byte range of the whole span, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSpan {
    pub kind: MathDelimiter,
    pub start: usize,
    pub end: usize,
}

impl MathSpan {
    /// Byte range of the interior, delimiters excluded.
    pub fn interior(&self) -> std::ops::Range<usize> {
        self.start + self.kind.open().len()..self.end - self.kind.close().len()
    }
}

/// Locate every math span in `text`, in source order.
pub fn find_math_spans(text: &str) -> Vec<MathSpan> {
    RE_MATH_SPAN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = span_kind(&caps)?;
            Some(MathSpan {
                kind,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

fn span_kind(caps: &regex::Captures<'_>) -> Option<MathDelimiter> {
    if caps.get(1).is_some() {
        Some(MathDelimiter::Bracket)
    } else if caps.get(2).is_some() {
        Some(MathDelimiter::Paren)
    } else if caps.get(3).is_some() {
        Some(MathDelimiter::DoubleDollar)
    } else {
        None
    }
}

/// Unescape the interior of every math span in `input`.
///
/// Text outside spans is returned unchanged. Unpaired delimiters are left
/// alone (and logged); use [`check_balanced`] to turn them into an error.
pub fn unescape_math_spans(input: &str) -> String {
    let spans = find_math_spans(input);
    warn_stray_delimiters(input, &spans);
    unescape_with_spans(input, &spans)
}

/// Unescape only the given spans, which must come from
/// [`find_math_spans`] on the same `input`.
pub fn unescape_with_spans(input: &str, spans: &[MathSpan]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;

    for span in spans {
        let interior = span.interior();
        out.push_str(&input[cursor..interior.start]);
        out.push_str(&unescape_interior(&input[interior.clone()]));
        out.push_str(&input[interior.end..span.end]);
        cursor = span.end;
    }
    out.push_str(&input[cursor..]);
    out
}

/// Log every delimiter of `text` that is not part of `spans`.
pub fn warn_stray_delimiters(text: &str, spans: &[MathSpan]) {
    for stray in stray_delimiters(text, spans) {
        warn!(
            "Unmatched math delimiter '{}' at line {}, column {} left unprocessed",
            stray.delimiter, stray.line, stray.column
        );
    }
}

/// Fail on the first math delimiter that does not belong to any span.
pub fn check_balanced(text: &str) -> Result<(), Html2MdError> {
    check_balanced_with_spans(text, &find_math_spans(text))
}

/// [`check_balanced`] against spans already located in `text`.
pub fn check_balanced_with_spans(text: &str, spans: &[MathSpan]) -> Result<(), Html2MdError> {
    match stray_delimiters(text, spans).into_iter().next() {
        Some(stray) => Err(Html2MdError::UnbalancedMathDelimiter {
            delimiter: stray.delimiter,
            line: stray.line,
            column: stray.column,
        }),
        None => Ok(()),
    }
}

struct StrayDelimiter {
    delimiter: String,
    line: usize,
    column: usize,
}

/// Delimiter tokens that sit in the gaps between spans.
fn stray_delimiters(text: &str, spans: &[MathSpan]) -> Vec<StrayDelimiter> {
    let mut gaps = Vec::with_capacity(spans.len() + 1);
    let mut gap_start = 0;
    for span in spans {
        gaps.push(gap_start..span.start);
        gap_start = span.end;
    }
    gaps.push(gap_start..text.len());

    let mut strays = Vec::new();
    for gap in gaps {
        for m in RE_DELIMITER.find_iter(&text[gap.clone()]) {
            let offset = gap.start + m.start();
            let (line, column) = line_column(text, offset);
            strays.push(StrayDelimiter {
                delimiter: m.as_str().to_string(),
                line,
                column,
            });
        }
    }

    strays
}

/// 1-based line and column (in characters) of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Char(char),
    Hidden,
}

/// Run the three-step unescape on a span interior.
///
/// "Followed by a character" never includes a line break: a backslash at the
/// end of a line is kept as is.
pub fn unescape_interior(interior: &str) -> String {
    if !interior.contains('\\') {
        return interior.to_string();
    }
    let chars: Vec<char> = interior.chars().collect();
    let hidden = hide_doubled_backslashes(&chars);
    let resolved = drop_single_escapes(&hidden);
    restore_hidden(&resolved)
}

// Step 1: `\\X` → [Hidden, X].
fn hide_doubled_backslashes(chars: &[char]) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match (chars[i], chars.get(i + 1), chars.get(i + 2)) {
            ('\\', Some(&'\\'), Some(&next)) if next != '\n' => {
                pieces.push(Piece::Hidden);
                pieces.push(Piece::Char(next));
                i += 3;
            }
            (c, _, _) => {
                pieces.push(Piece::Char(c));
                i += 1;
            }
        }
    }
    pieces
}

// Step 2: `\Y` → Y, where Y may be a hidden marker.
fn drop_single_escapes(pieces: &[Piece]) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len());
    let mut i = 0;
    while i < pieces.len() {
        match (pieces[i], pieces.get(i + 1)) {
            (Piece::Char('\\'), Some(&next)) if next != Piece::Char('\n') => {
                out.push(next);
                i += 2;
            }
            (piece, _) => {
                out.push(piece);
                i += 1;
            }
        }
    }
    out
}

// Step 3: hidden marker → `\`.
fn restore_hidden(pieces: &[Piece]) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            Piece::Char(c) => *c,
            Piece::Hidden => '\\',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_without_backslash_unchanged() {
        assert_eq!(unescape_interior(" a + b = c "), " a + b = c ");
    }

    #[test]
    fn test_single_escape_removed() {
        assert_eq!(unescape_interior(r"a\_1 \* b"), "a_1 * b");
    }

    #[test]
    fn test_doubled_backslash_keeps_one() {
        assert_eq!(unescape_interior(r"\\X"), r"\X");
        assert_eq!(unescape_interior(r"\\frac{1}{2}"), r"\frac{1}{2}");
    }

    #[test]
    fn test_mixed_escapes() {
        assert_eq!(unescape_interior(r"a\\b \c"), r"a\b c");
    }

    #[test]
    fn test_only_doubled_backslashes_halve() {
        assert_eq!(unescape_interior(r"\\"), r"\");
        assert_eq!(unescape_interior(r"\\\\"), r"\\");
        assert_eq!(unescape_interior(r"\\\\\\"), r"\\\");
        assert_eq!(unescape_interior(r"\\\\\\\\"), r"\\\\");
    }

    #[test]
    fn test_backslash_before_newline_kept() {
        assert_eq!(unescape_interior("a \\\nb"), "a \\\nb");
    }

    #[test]
    fn test_mixed_scenario_in_display_span() {
        assert_eq!(unescape_math_spans(r"\[ a\\b \c \]"), r"\[ a\b c \]");
    }

    #[test]
    fn test_all_delimiter_kinds() {
        let input = r"x \( a\_1 \) y \[ b\^2 \] z $$ c\* $$ w";
        let expected = r"x \( a_1 \) y \[ b^2 \] z $$ c* $$ w";
        assert_eq!(unescape_math_spans(input), expected);
    }

    #[test]
    fn test_outside_text_is_untouched() {
        let input = r"keep \_ this \\ too \( \_ \) and \*";
        assert_eq!(unescape_math_spans(input), r"keep \_ this \\ too \( _ \) and \*");
    }

    #[test]
    fn test_spans_cross_lines() {
        let input = "\\[\n  x\\_i\n\\]\n";
        assert_eq!(unescape_math_spans(input), "\\[\n  x_i\n\\]\n");
    }

    #[test]
    fn test_non_greedy_matching() {
        let spans = find_math_spans(r"\( a \) mid \( b \)");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind, MathDelimiter::Paren);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].end, 7);

        let input = r"$$ \_ $$ text \_ $$ \_ $$";
        assert_eq!(unescape_math_spans(input), r"$$ _ $$ text \_ $$ _ $$");
    }

    #[test]
    fn test_span_interior_range() {
        let text = r"\[x\]";
        let spans = find_math_spans(text);
        assert_eq!(&text[spans[0].interior()], "x");
    }

    #[test]
    fn test_no_spans_passthrough() {
        let input = "plain \\text with \\_ escapes\n";
        assert_eq!(unescape_math_spans(input), input);
    }

    #[test]
    fn test_unclosed_span_left_alone() {
        let input = r"\( a\_1 and more";
        assert_eq!(unescape_math_spans(input), input);
    }

    #[test]
    fn test_unescape_with_located_spans() {
        let input = r"\( a\_1 \) and $$ b\_2 $$";
        let spans = find_math_spans(input);
        assert_eq!(unescape_with_spans(input, &spans), unescape_math_spans(input));
        // Only the spans handed in are rewritten.
        assert_eq!(
            unescape_with_spans(input, &spans[1..]),
            r"\( a\_1 \) and $$ b_2 $$"
        );
        assert_eq!(unescape_with_spans(input, &[]), input);
    }

    #[test]
    fn test_check_balanced_with_located_spans() {
        let text = r"\( a \) \[ b";
        let spans = find_math_spans(text);
        assert_eq!(spans.len(), 1);
        assert!(matches!(
            check_balanced_with_spans(text, &spans),
            Err(Html2MdError::UnbalancedMathDelimiter { column: 9, .. })
        ));
    }

    #[test]
    fn test_check_balanced_ok() {
        assert!(check_balanced(r"\( a \) and $$ b $$").is_ok());
        assert!(check_balanced("no math").is_ok());
    }

    #[test]
    fn test_check_balanced_reports_position() {
        let err = check_balanced("ok \\( a \\)\nthen \\[ open").unwrap_err();
        match err {
            Html2MdError::UnbalancedMathDelimiter {
                delimiter,
                line,
                column,
            } => {
                assert_eq!(delimiter, r"\[");
                assert_eq!(line, 2);
                assert_eq!(column, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_balanced_stray_closer() {
        assert!(check_balanced(r"\[ a \[ b \] c \]").is_err());
    }

    #[test]
    fn test_delimiter_display() {
        assert_eq!(MathDelimiter::Paren.to_string(), r"\(…\)");
    }
}
