//! Artifact stripping: remove converter noise line by line.
//!
//! pandoc's Markdown writer keeps HTML structure it cannot express natively
//! as pandoc-only syntax. Three constructs survive a plain HTML → Markdown
//! run and mean nothing to other Markdown tools:
//!
//! - fenced div markers (`::: {.section}` / `:::`) wrapping `<div>`s
//! - separator rules made of dashes, left behind by `<hr>` and layout tables
//! - bracketed spans with attributes (`[text]{.smallcaps style="…"}`)
//!
//! Lines are the text between `\n` characters. A deleted line takes its own
//! terminator with it; every kept line keeps its bytes except for the
//! unwrapped spans.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_DIV_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:{3,}").unwrap());

static RE_DASH_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{2,}\s*$").unwrap());

static RE_ATTR_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\{[^}]*\}").unwrap());

/// Remove converter artifacts from `input`.
///
/// Each line is checked independently:
/// 1. lines starting with three or more `:` are dropped
/// 2. lines holding only a run of two or more `-` (plus whitespace) are dropped
/// 3. every `[TEXT]{ATTRS}` on a surviving line becomes `TEXT`
///
/// Span unwrapping is repeated until the line stops changing, and the drop
/// rules are checked again on the unwrapped line, so running the pass on its
/// own output is a no-op.
pub fn strip_artifacts(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for segment in input.split_inclusive('\n') {
        let (line, terminator) = match segment.strip_suffix('\n') {
            Some(line) => (line, "\n"),
            None => (segment, ""),
        };

        if is_noise_line(line) {
            continue;
        }

        let unwrapped = unwrap_attribute_spans(line);
        if is_noise_line(&unwrapped) {
            continue;
        }

        out.push_str(&unwrapped);
        out.push_str(terminator);
    }

    out
}

fn is_noise_line(line: &str) -> bool {
    RE_DIV_FENCE.is_match(line) || RE_DASH_RULE.is_match(line)
}

/// Replace `[TEXT]{ATTRS}` with `TEXT` until no wrapper is left.
fn unwrap_attribute_spans(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        let next = RE_ATTR_SPAN.replace_all(&current, "$1").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_div_fences() {
        let input = "::: {.section}\nBody\n:::\n";
        assert_eq!(strip_artifacts(input), "Body\n");
    }

    #[test]
    fn test_keeps_two_colons() {
        let input = ":: not a fence\n";
        assert_eq!(strip_artifacts(input), input);
    }

    #[test]
    fn test_drops_dash_rules() {
        let input = "above\n  ----------  \nbelow\n--\n";
        assert_eq!(strip_artifacts(input), "above\nbelow\n");
    }

    #[test]
    fn test_single_dash_line_kept() {
        let input = "-\n- item\n";
        assert_eq!(strip_artifacts(input), input);
    }

    #[test]
    fn test_dash_rule_with_crlf() {
        assert_eq!(strip_artifacts("a\r\n---\r\nb\r\n"), "a\r\nb\r\n");
    }

    #[test]
    fn test_unwraps_attribute_spans() {
        let input = "A [word]{.smallcaps} and [another one]{style=\"color: red\"} here\n";
        assert_eq!(strip_artifacts(input), "A word and another one here\n");
    }

    #[test]
    fn test_plain_links_untouched() {
        let input = "[link](https://example.org) and [ref]\n";
        assert_eq!(strip_artifacts(input), input);
    }

    #[test]
    fn test_missing_final_newline_preserved() {
        assert_eq!(strip_artifacts("one\n:::\ntwo"), "one\ntwo");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strip_artifacts(""), "");
    }

    #[test]
    fn test_nested_spans_fully_unwrapped() {
        assert_eq!(strip_artifacts("[[x]{.a}]{.b}\n"), "x\n");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "::: {.note}\n[A]{.b} text\n-----\n:::\n",
            "[:::]{.x}\n[--]{.y}\nkeep\n",
            "[[x]{.a}]{.b} tail\n\n\n",
            "no artifacts at all",
        ];
        for input in inputs {
            let once = strip_artifacts(input);
            let twice = strip_artifacts(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}
