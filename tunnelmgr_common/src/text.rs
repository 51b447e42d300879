//! Display helpers for server-supplied strings

/// Strip control characters so backend text cannot drive the terminal
///
/// Tabs become spaces; every other control character, including ESC, is dropped.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Truncate to `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let mut out: String = s.chars().take(max_len - 3).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_escapes() {
        assert_eq!(sanitize("\x1b]8;;http://evil\x1b\\link"), "]8;;http://evil\\link");
        assert_eq!(sanitize("a\tb\r\nc"), "a bc");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(truncate("ünïcødé-host", 6), "ünï...");
    }
}
