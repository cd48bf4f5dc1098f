//! Content-Disposition module
//!
//! Builds `attachment` values for downloads (RFC 6266), with the RFC 5987
//! `filename*` form for names that are not plain ASCII.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::token::is_token_char;

/// Bytes left unescaped in an RFC 5987 `attr-char` value
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Build a `Content-Disposition: attachment` value for `file_name`
///
/// # Examples
/// ```
/// use http_delivery::http::disposition::attachment;
///
/// assert_eq!(attachment("report.pdf"), "attachment; filename=report.pdf");
/// assert_eq!(attachment("my report.pdf"), "attachment; filename=\"my report.pdf\"");
/// assert_eq!(
///     attachment("résumé.pdf"),
///     "attachment; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
/// );
/// ```
pub fn attachment(file_name: &str) -> String {
    if !file_name.is_empty() && file_name.bytes().all(is_token_char) {
        return format!("attachment; filename={file_name}");
    }

    let fallback = quote(file_name);
    if file_name.is_ascii() {
        return format!("attachment; filename={fallback}");
    }

    let encoded = utf8_percent_encode(file_name, ATTR_CHAR);
    format!("attachment; filename={fallback}; filename*=UTF-8''{encoded}")
}

/// Quoted-string with non-ASCII and control characters replaced by `_`
fn quote(file_name: &str) -> String {
    let mut quoted = String::with_capacity(file_name.len() + 2);
    quoted.push('"');
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => quoted.push(c),
            _ => quoted.push('_'),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_name() {
        assert_eq!(attachment("data.csv"), "attachment; filename=data.csv");
    }

    #[test]
    fn test_quoted_name() {
        assert_eq!(
            attachment("a \"quoted\" name.txt"),
            "attachment; filename=\"a \\\"quoted\\\" name.txt\""
        );
        assert_eq!(attachment("tab\there"), "attachment; filename=\"tab_here\"");
    }

    #[test]
    fn test_non_ascii_name() {
        let value = attachment("日本.txt");
        assert!(value.starts_with("attachment; filename=\"__.txt\"; "));
        assert!(value.ends_with("filename*=UTF-8''%E6%97%A5%E6%9C%AC.txt"));
    }

    #[test]
    fn test_attr_char_escaping() {
        let value = attachment("naïve file.txt");
        assert!(value.ends_with("filename*=UTF-8''na%C3%AFve%20file.txt"));
    }
}
