//! Blank-line normalization shared by PDF and plain-text input

use regex::Regex;
use std::sync::LazyLock;

/// Two or more line breaks, with any horizontal whitespace between them
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t\r\f\v]*\n(?:[ \t\r\f\v]*\n)+").expect("blank line pattern is valid")
});

/// Collapse every run of blank lines into exactly one paragraph break.
///
/// Single line breaks are left alone. Idempotent.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n\n").into_owned()
}

/// Standardize pasted or extracted text: collapse blank lines and trim.
pub fn normalize_text(text: &str) -> String {
    collapse_blank_lines(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_long_blank_runs() {
        assert_eq!(normalize_text("Clause A\n\n\n\nClause B"), "Clause A\n\nClause B");
    }

    #[test]
    fn test_collapses_whitespace_only_lines() {
        assert_eq!(
            normalize_text("Clause A  \n \t\n\n   Clause B"),
            "Clause A\n\n   Clause B"
        );
    }

    #[test]
    fn test_keeps_single_line_breaks() {
        assert_eq!(normalize_text("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_windows_line_endings() {
        assert_eq!(normalize_text("A\r\n\r\n\r\nB"), "A\n\nB");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(normalize_text("\n\n  Body text \n\n\n"), "Body text");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "a\n\n\n\nb",
            "a \n \n b\n\n\nc\n",
            "\r\n\r\nx\r\ny",
            "no breaks at all",
        ];
        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once);
            let collapsed = collapse_blank_lines(input);
            assert_eq!(collapse_blank_lines(&collapsed), collapsed);
        }
    }
}
