//! Cleanup of JSON text written by other tools before parsing.

/// Strip a byte-order mark and C0/C1 control characters, then trim.
///
/// Raw control characters are never valid inside JSON strings, and outside of
/// strings they are only insignificant whitespace, so dropping them cannot
/// change the meaning of a well-formed document.
pub fn sanitize_json_text(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !is_control(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001f}' | '\u{007f}'..='\u{009f}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bom_and_whitespace() {
        assert_eq!(sanitize_json_text("\u{feff}  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(
            sanitize_json_text("{\r\n\t\"a\":\u{0}1\u{85}}\u{7f}"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_keeps_printable_unicode() {
        assert_eq!(sanitize_json_text("[\"Zoë\", \"雪\"]"), "[\"Zoë\", \"雪\"]");
    }

    #[test]
    fn test_empty_after_cleanup() {
        assert_eq!(sanitize_json_text("\u{feff}\r\n \u{1}"), "");
    }
}
