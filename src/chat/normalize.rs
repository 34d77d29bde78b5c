//! Post-stream text repair.
//!
//! Streamed text arrives with escaped line breaks and stray emphasis
//! markers. Applied once, to the full accumulated text, when a stream
//! completes.

use once_cell::sync::Lazy;
use regex::Regex;

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("newline collapse regex must be valid"));

static BOLD_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pair regex must be valid"));

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@@B(\d+)@@").expect("placeholder regex must be valid"));

/// Normalize completed stream text. Pure, and idempotent for text whose
/// bold markers are balanced.
///
/// In order: un-escape literal `\n` sequences, collapse runs of 3+ line
/// breaks to 2, strip single asterisks while preserving `**bold**` pairs,
/// and trim. Pairs are protected with positional placeholders first;
/// stripping singles naively would corrupt intended bold emphasis.
///
/// A lone `**` with no closing pair is not protected, so the single-strip
/// pass removes its second asterisk and a repeat application would remove
/// the rest. The repair runs once per completed stream, so only the
/// single-pass result is observable.
pub fn normalize(text: &str) -> String {
    let s = text.replace("\\n", "\n");
    let s = EXCESS_NEWLINES.replace_all(&s, "\n\n");

    let mut bolds = Vec::new();
    let s = BOLD_PAIR.replace_all(&s, |caps: &regex::Captures<'_>| {
        bolds.push(caps[1].to_string());
        format!("@@B{}@@", bolds.len() - 1)
    });

    let s = strip_single_asterisks(&s);

    let s = PLACEHOLDER.replace_all(&s, |caps: &regex::Captures<'_>| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| bolds.get(i))
            .map_or_else(|| caps[0].to_string(), |txt| format!("**{txt}**"))
    });

    s.trim().to_string()
}

/// Remove every `*` not immediately followed by another `*`.
///
/// Equivalent to the lookahead `\*(?!\*)`, which the regex crate does not
/// support.
fn strip_single_asterisks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() != Some(&'*') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescapes_literal_newlines() {
        assert_eq!(normalize("line one\\nline two"), "line one\nline two");
    }

    #[test]
    fn test_collapses_newline_runs() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\\n\\n\\n\\nb"), "a\n\nb");
    }

    #[test]
    fn test_bold_preserved_singles_stripped() {
        assert_eq!(
            normalize("This is **bold** and *not*"),
            "This is **bold** and not"
        );
    }

    #[test]
    fn test_multiple_bold_pairs() {
        assert_eq!(
            normalize("**a** then *x* then **b**"),
            "**a** then x then **b**"
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("  padded  "), "padded");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "This is **bold** and *not*",
            "a\\n\\n\\n\\nb",
            "  * bullet-ish\nplain  ",
            "**nested *inner* pair**",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_unpaired_double_asterisk_loses_one_marker_per_pass() {
        // Known bound of the idempotence property: an unclosed ** is not a
        // pair, so the strip pass drops the asterisk that has no follower.
        assert_eq!(normalize("a ** b"), "a * b");
        assert_eq!(normalize("a * b"), "a  b");
    }
}
