//! Small string helpers for diagnostics formatting.

/// Prefixes every line of `s` with `n` tab characters.
pub fn indent_n(n: usize, s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let prefix = "\t".repeat(n);
    s.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncates `s` to at most `max_chars` characters, appending `...` when
/// anything was cut. Respects char boundaries.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_prefixes_every_line() {
        assert_eq!(indent_n(2, "a\nb"), "\t\ta\n\t\tb");
    }

    #[test]
    fn test_indent_empty_stays_empty() {
        assert_eq!(indent_n(3, ""), "");
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("abc", 512), "abc");
    }

    #[test]
    fn test_truncate_cuts_and_marks() {
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("äöü", 2), "äö...");
    }
}
