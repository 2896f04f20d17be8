//! Script string literals.
//!
//! Text sent to the editor page is spliced into a script expression, so it
//! must not be able to close its literal or start a new statement. Every
//! character that could do so is escaped; everything else is copied as is.

/// Quote `text` as a single-quoted script string literal.
///
/// Decoding the result with script string-literal rules yields `text`
/// byte-for-byte.
pub fn script_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            // Line terminators inside literals on older script engines
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_only_quoted() {
        assert_eq!(script_string_literal("# Hi"), "'# Hi'");
        assert_eq!(script_string_literal(""), "''");
    }

    #[test]
    fn test_breakout_characters_are_escaped() {
        assert_eq!(script_string_literal("it's"), r"'it\'s'");
        assert_eq!(script_string_literal(r"C:\dir"), r"'C:\\dir'");
        assert_eq!(script_string_literal("a\nb\r\n"), r"'a\nb\r\n'");
        assert_eq!(script_string_literal("\u{2028}\u{2029}"), r"'\u2028\u2029'");
    }

    #[test]
    fn test_injection_attempt_stays_inside_literal() {
        let hostile = "'); alert(1); ('";
        let literal = script_string_literal(hostile);
        assert_eq!(literal, r"'\'); alert(1); (\''");
        // Every quote inside the literal is preceded by a backslash
        let inner = &literal[1..literal.len() - 1];
        let bytes = inner.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\'' {
                assert_eq!(bytes[i - 1], b'\\');
            }
        }
    }

    #[test]
    fn test_double_quotes_and_unicode_pass_through() {
        assert_eq!(script_string_literal("\"ünï\" 🙂"), "'\"ünï\" 🙂'");
    }
}
