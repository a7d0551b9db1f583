//! Bracket normalisation: undo escaping damage around `[ ] ( )`.
//!
//! When the source HTML carries TeX math as literal text (`\[ x^2 \]`),
//! pandoc escapes the backslash and we get `\\[ x^2 \\]` back. Pages that
//! wrap their display math in an extra pair of brackets come out as
//! `[ \[ … \] ]`. Both forms must be folded back to a single `\[` before the
//! math unescaper can recognise the span.
//!
//! All rules operate on the whole text, so matches may cross line breaks.

use once_cell::sync::Lazy;
use regex::Regex;

/// `{…}` holding at least one `.`: leftover `{.class #id}` annotations.
static RE_DOTTED_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\.[^}]*\}").unwrap());

static RE_MULTI_BACKSLASH_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\{2,}([\[(])").unwrap());

static RE_MULTI_BACKSLASH_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\{2,}([\])])").unwrap());

// The leading `[` must not be escaped itself, otherwise `\[ \(` (display
// math opening with an inline delimiter) would lose its own opener.
static RE_BRACKET_BEFORE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\\])\[\s*(\\[\[(])").unwrap());

// Each closer folds only its own bracket kind: `\] ]` and `\) )`.
static RE_BRACKET_AFTER_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\\\])\s*\]|(\\\))\s*\)").unwrap());

/// Apply the bracket rules to `input`, in order:
///
/// 1. drop `{…}` groups that contain a `.`
/// 2. `\\\\[` / `\\(` (two or more backslashes) → `\[` / `\(`
/// 3. the same for `]` and `)`
/// 4. `[ \[` / `[ \(` → `\[` / `\(`
/// 5. `\] ]` / `\) )` → `\]` / `\)`
pub fn normalize_brackets(input: &str) -> String {
    let s = strip_dotted_braces(input);
    let s = collapse_backslash_runs(&s);
    unwrap_bracketed_delimiters(&s)
}

fn strip_dotted_braces(input: &str) -> String {
    RE_DOTTED_BRACES.replace_all(input, "").into_owned()
}

fn collapse_backslash_runs(input: &str) -> String {
    let s = RE_MULTI_BACKSLASH_OPEN.replace_all(input, r"\$1");
    RE_MULTI_BACKSLASH_CLOSE
        .replace_all(&s, r"\$1")
        .into_owned()
}

fn unwrap_bracketed_delimiters(input: &str) -> String {
    let s = RE_BRACKET_BEFORE_OPEN.replace_all(input, "$1$2");
    RE_BRACKET_AFTER_CLOSE.replace_all(&s, "$1$2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_class_annotations() {
        assert_eq!(strip_dotted_braces("Title {.unnumbered}"), "Title ");
        assert_eq!(strip_dotted_braces("x{#id .cls key=v}y"), "xy");
    }

    #[test]
    fn test_braces_without_dot_kept() {
        let input = r"\frac{a}{b} and {#anchor}";
        assert_eq!(strip_dotted_braces(input), input);
    }

    #[test]
    fn test_dotted_braces_across_lines() {
        assert_eq!(strip_dotted_braces("a{.x\n.y}b"), "ab");
    }

    #[test]
    fn test_collapse_any_run_before_brackets() {
        assert_eq!(collapse_backslash_runs(r"\\\\["), r"\[");
        assert_eq!(collapse_backslash_runs(r"\\("), r"\(");
        assert_eq!(collapse_backslash_runs(r"\\\]"), r"\]");
        assert_eq!(collapse_backslash_runs(r"\\\\\\)"), r"\)");
    }

    #[test]
    fn test_single_backslash_untouched() {
        let input = r"\[ x \] and \( y \)";
        assert_eq!(collapse_backslash_runs(input), input);
    }

    #[test]
    fn test_double_backslash_elsewhere_untouched() {
        let input = r"a \\ b \\x";
        assert_eq!(normalize_brackets(input), input);
    }

    #[test]
    fn test_bracket_before_open_delimiter() {
        assert_eq!(unwrap_bracketed_delimiters(r"see [ \[x\]"), r"see \[x\]");
        assert_eq!(unwrap_bracketed_delimiters("[\n  \\(y\\)"), r"\(y\)");
    }

    #[test]
    fn test_escaped_bracket_not_eaten() {
        let input = r"\[ \(a\) \]";
        assert_eq!(unwrap_bracketed_delimiters(input), input);
    }

    #[test]
    fn test_bracket_after_close_delimiter() {
        assert_eq!(unwrap_bracketed_delimiters(r"\[x\] ] tail"), r"\[x\] tail");
        assert_eq!(unwrap_bracketed_delimiters("\\[y\\]\n]"), r"\[y\]");
    }

    #[test]
    fn test_paren_after_close_paren_delimiter() {
        assert_eq!(normalize_brackets(r"\(x\) )"), r"\(x\)");
        assert_eq!(unwrap_bracketed_delimiters("(\\(y\\)\n)"), r"(\(y\)");
    }

    #[test]
    fn test_closer_keeps_other_bracket_kind() {
        let input = r"\(x\) ] and \[y\] )";
        assert_eq!(unwrap_bracketed_delimiters(input), input);
    }

    #[test]
    fn test_full_pass_on_wrapped_display_math() {
        let input = "[ \\\\[ x^2 \\\\] ]\n";
        assert_eq!(normalize_brackets(input), "\\[ x^2 \\]\n");
    }

    #[test]
    fn test_plain_text_passthrough() {
        let input = "Nothing [to] do (here).\n";
        assert_eq!(normalize_brackets(input), input);
    }
}
