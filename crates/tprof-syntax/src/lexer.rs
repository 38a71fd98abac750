//! Raw token measurement for end-of-token resolution.
//!
//! Spans record the *start* of a node's last token. Turning that into an
//! insertion anchor needs the token's length, which is recovered by
//! re-lexing the raw characters at the location. Only token boundaries are
//! of interest here; token kinds are never reported.

/// Multi-character punctuators, longest first within each shared prefix.
const PUNCTUATORS: &[&str] = &[
    "<<=", ">>=", "...", "->*", "<=>", "::", "->", "++", "--", "<<", ">>", "<=", ">=", "==",
    "!=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "##", ".*",
];

/// Encoding prefixes that may precede a string or character literal.
const LITERAL_PREFIXES: &[&str] = &["L", "u", "U", "u8"];

/// Returns the length in bytes of the token starting at `offset`.
///
/// Returns zero when `offset` is at or past the end of `text` or is not on a
/// character boundary.
pub(crate) fn token_len(text: &str, offset: usize) -> usize {
    let Some(rest) = text.get(offset..) else {
        return 0;
    };
    let bytes = rest.as_bytes();
    let Some(&first) = bytes.first() else {
        return 0;
    };

    if is_ident_start(first) {
        let ident = bytes.iter().take_while(|byte| is_ident_continue(**byte)).count();
        let prefixed_literal = matches!(bytes.get(ident), Some(b'"' | b'\''))
            && rest
                .get(..ident)
                .is_some_and(|prefix| LITERAL_PREFIXES.contains(&prefix));
        if prefixed_literal {
            return ident.saturating_add(quoted_len(bytes.get(ident..).unwrap_or_default()));
        }
        return ident;
    }

    let leading_dot_number = first == b'.' && bytes.get(1).is_some_and(u8::is_ascii_digit);
    if first.is_ascii_digit() || leading_dot_number {
        return pp_number_len(bytes);
    }

    if first == b'"' || first == b'\'' {
        return quoted_len(bytes);
    }

    if let Some(punctuator) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
        return punctuator.len();
    }

    rest.chars().next().map_or(0, char::len_utf8)
}

const fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

const fn is_ident_continue(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

/// Measures a quoted literal starting with its opening quote.
///
/// An unterminated literal ends at the end of its line.
fn quoted_len(bytes: &[u8]) -> usize {
    let Some(&quote) = bytes.first() else {
        return 0;
    };
    let mut index = 1usize;
    loop {
        match bytes.get(index) {
            None | Some(b'\n') => return index.min(bytes.len()),
            Some(b'\\') => index = index.saturating_add(2),
            Some(byte) if *byte == quote => return index.saturating_add(1),
            Some(_) => index = index.saturating_add(1),
        }
    }
}

/// Measures a preprocessing number (`0x1fUL`, `1.5e-3f`, `1'000`).
fn pp_number_len(bytes: &[u8]) -> usize {
    let mut index = 1usize;
    while let Some(&byte) = bytes.get(index) {
        let signed_exponent = matches!(byte, b'e' | b'E' | b'p' | b'P')
            && matches!(bytes.get(index.saturating_add(1)), Some(b'+' | b'-'));
        if signed_exponent {
            index = index.saturating_add(2);
        } else if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'\'') {
            index = index.saturating_add(1);
        } else {
            break;
        }
    }
    index.min(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("doWork(i);", 0, 6)]
    #[case("doWork(i);", 6, 1)]
    #[case("doWork(i);", 9, 1)]
    #[case("x <<= 2", 2, 3)]
    #[case("a->b", 1, 2)]
    #[case("1.5e-3f;", 0, 7)]
    #[case("0x1fUL)", 0, 6)]
    #[case("\"a\\\"b\";", 0, 6)]
    #[case("L'x')", 0, 4)]
    #[case("u8\"s\"", 0, 5)]
    #[case("return;", 0, 6)]
    #[case("}", 0, 1)]
    fn token_len_measures_tokens(#[case] text: &str, #[case] offset: usize, #[case] len: usize) {
        assert_eq!(token_len(text, offset), len);
    }

    #[test]
    fn token_len_is_zero_at_end_of_text() {
        assert_eq!(token_len("abc", 3), 0);
        assert_eq!(token_len("abc", 42), 0);
    }

    #[test]
    fn unterminated_literal_stops_at_newline() {
        assert_eq!(token_len("\"abc\nx", 0), 4);
    }
}
