//! HTTP token grammar module
//!
//! Lexical primitives shared by the header parsers (RFC 7230 section 3.2.6):
//! - `token` characters
//! - optional whitespace, including obsolete line folding
//! - `quoted-pair` and `quoted-string`
//! - nested, comment-like expressions with a bounded depth

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const SP: u8 = b' ';
const TAB: u8 = b'\t';

/// Maximum number of nested expressions accepted inside one expression
pub const MAX_NESTED_COUNT: usize = 5;

/// Maximum number of decimal digits in a `u64`
pub const MAX_U64_DIGITS: usize = 19;

/// Result of scanning a delimited construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    /// Input does not start with the construct
    NotParsed,
    /// Construct recognized, with its total length in bytes
    Parsed(usize),
    /// Construct started but is malformed, unterminated or nested too deeply
    InvalidFormat,
}

/// Check if a byte is a `tchar`
///
/// Visible ASCII (33..=126) except the delimiters `()<>@,;:\"/[]?={}`.
#[inline]
pub const fn is_token_char(c: u8) -> bool {
    if c < 33 || c > 126 {
        return false;
    }
    !matches!(
        c,
        b'(' | b')'
            | b'<'
            | b'>'
            | b'@'
            | b','
            | b';'
            | b':'
            | b'\\'
            | b'"'
            | b'/'
            | b'['
            | b']'
            | b'?'
            | b'='
            | b'{'
            | b'}'
    )
}

/// Length of the run of token characters starting at `start` (0 if none)
pub fn token_length(input: &str, start: usize) -> usize {
    input
        .as_bytes()
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|&&c| is_token_char(c)).count())
}

/// Length of the whitespace run starting at `start`
///
/// Consumes SP and TAB, and CRLF immediately followed by SP or TAB
/// (obs-fold) as three bytes of whitespace.
pub fn whitespace_length(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut current = start;

    while current < bytes.len() {
        match bytes[current] {
            SP | TAB => current += 1,
            CR if current + 2 < bytes.len()
                && bytes[current + 1] == LF
                && matches!(bytes[current + 2], SP | TAB) =>
            {
                current += 3;
            }
            _ => break,
        }
    }

    current.saturating_sub(start)
}

/// Recognize a `quoted-pair` (`\` followed by any ASCII byte) at `start`
///
/// Always two bytes long when parsed.
pub fn quoted_pair_length(input: &str, start: usize) -> ParseResult {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'\\') {
        return ParseResult::NotParsed;
    }

    match bytes.get(start + 1) {
        Some(&c) if c <= 127 => ParseResult::Parsed(2),
        _ => ParseResult::InvalidFormat,
    }
}

/// Recognize a `quoted-string` at `start`, quotes included in the length
pub fn quoted_string_length(input: &str, start: usize) -> ParseResult {
    expression_length(input, start, b'"', b'"', false, 0)
}

/// Recognize a `comment` (parenthesized, nestable) at `start`
pub fn comment_length(input: &str, start: usize) -> ParseResult {
    expression_length(input, start, b'(', b')', true, 0)
}

/// Scan a delimited expression starting with `open` and ending with `close`
///
/// Embedded quoted-pairs are skipped over. With `supports_nesting`, an
/// inner `open` starts a nested expression; more than
/// [`MAX_NESTED_COUNT`] levels yield [`ParseResult::InvalidFormat`].
/// `depth` is the number of enclosing expressions already open.
pub fn expression_length(
    input: &str,
    start: usize,
    open: u8,
    close: u8,
    supports_nesting: bool,
    depth: usize,
) -> ParseResult {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&open) {
        return ParseResult::NotParsed;
    }

    let mut current = start + 1;
    while current < bytes.len() {
        // A quoted-pair can only be skipped when something follows it
        if current + 2 < bytes.len() {
            if let ParseResult::Parsed(pair) = quoted_pair_length(input, current) {
                current += pair;
                continue;
            }
        }

        if supports_nesting && bytes[current] == open {
            if depth + 1 > MAX_NESTED_COUNT {
                return ParseResult::InvalidFormat;
            }
            match expression_length(input, current, open, close, supports_nesting, depth + 1) {
                ParseResult::Parsed(nested) => {
                    current += nested;
                    continue;
                }
                ParseResult::NotParsed | ParseResult::InvalidFormat => {
                    return ParseResult::InvalidFormat;
                }
            }
        }

        if bytes[current] == close {
            return ParseResult::Parsed(current - start + 1);
        }
        current += 1;
    }

    ParseResult::InvalidFormat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_chars() {
        assert!(is_token_char(b'a'));
        assert!(is_token_char(b'!'));
        assert!(is_token_char(b'~'));
        assert!(is_token_char(b'+'));
        assert!(is_token_char(b'*'));
        for c in b"()<>@,;:\\\"/[]?={}" {
            assert!(!is_token_char(*c), "{} should be a delimiter", *c as char);
        }
        assert!(!is_token_char(b' '));
        assert!(!is_token_char(0x7f));
        assert!(!is_token_char(0xc3));
    }

    #[test]
    fn test_token_length() {
        assert_eq!(token_length("text/html", 0), 4);
        assert_eq!(token_length("text/html", 5), 4);
        assert_eq!(token_length("text/html", 4), 0);
        assert_eq!(token_length("text", 10), 0);
        assert_eq!(token_length("", 0), 0);
    }

    #[test]
    fn test_whitespace_length() {
        assert_eq!(whitespace_length("  \tx", 0), 3);
        assert_eq!(whitespace_length("x", 0), 0);
        // obs-fold is whitespace
        assert_eq!(whitespace_length(" \r\n x", 0), 4);
        assert_eq!(whitespace_length("\r\n\tx", 0), 3);
        // bare CRLF is not
        assert_eq!(whitespace_length("\r\nx", 0), 0);
        assert_eq!(whitespace_length(" \r\n", 0), 1);
    }

    #[test]
    fn test_quoted_pair() {
        assert_eq!(quoted_pair_length("\\\"", 0), ParseResult::Parsed(2));
        assert_eq!(quoted_pair_length("a", 0), ParseResult::NotParsed);
        assert_eq!(quoted_pair_length("\\", 0), ParseResult::InvalidFormat);
        assert_eq!(quoted_pair_length("\\é", 0), ParseResult::InvalidFormat);
    }

    #[test]
    fn test_quoted_string() {
        assert_eq!(quoted_string_length("\"abc\"; x", 0), ParseResult::Parsed(5));
        assert_eq!(quoted_string_length("\"a\\\"b\"", 0), ParseResult::Parsed(6));
        assert_eq!(quoted_string_length("abc", 0), ParseResult::NotParsed);
        assert_eq!(quoted_string_length("\"abc", 0), ParseResult::InvalidFormat);
    }

    #[test]
    fn test_nested_comment() {
        assert_eq!(comment_length("(a(b)c)", 0), ParseResult::Parsed(7));
        assert_eq!(comment_length("(((((())))))", 0), ParseResult::Parsed(12));
        assert_eq!(comment_length("((((((()))))))", 0), ParseResult::InvalidFormat);
        assert_eq!(comment_length("(a(b)", 0), ParseResult::InvalidFormat);
        // An escaped paren neither closes nor opens a level
        assert_eq!(comment_length("(a\\)b)", 0), ParseResult::Parsed(6));
        assert_eq!(comment_length("(x(a\\)b))", 0), ParseResult::Parsed(9));
        assert_eq!(comment_length("(a\\(b)", 0), ParseResult::Parsed(6));
    }
}
