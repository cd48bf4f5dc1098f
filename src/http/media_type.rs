//! Media type parsing and matching module
//!
//! Parses `type "/" subtype ["+" suffix] *( OWS ";" OWS name ["=" value] )`
//! (RFC 7231 section 3.1.1.1) into borrowed views of the input, and decides
//! whether a media type satisfies a media range.
//!
//! Parameters are never collected: every lookup rescans the parameter list
//! from its head, so a descriptor is just a handful of slices and an offset.

use std::borrow::Cow;

use super::charset::Charset;
use super::token::{quoted_string_length, token_length, whitespace_length, ParseResult};

const QUALITY_PARAMETER: &str = "q";
const WILDCARD: &str = "*";

/// A parsed media type, borrowing from the header text it came from
///
/// Structural failures (no type, no `/`, no subtype) produce an empty
/// descriptor: every field is empty and there are no parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType<'a> {
    source: &'a str,
    media_type: &'a str,
    sub_type: &'a str,
    sub_type_without_suffix: &'a str,
    sub_type_suffix: Option<&'a str>,
    parameters_offset: Option<usize>,
}

/// A single `name=value` parameter
///
/// `value` is the inside of a quoted-string when the value was quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// Where `value` starts in the input; `None` when the value could not be read
    value_offset: Option<usize>,
}

impl Parameter<'_> {
    /// Case-insensitive name comparison
    #[inline]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Same name and same value, both compared case-insensitively
    pub fn matches(&self, other: &Parameter<'_>) -> bool {
        self.has_name(other.name) && self.value.eq_ignore_ascii_case(other.value)
    }
}

/// Restartable cursor over a media type's parameter list
///
/// Cloning the cursor saves its position, so a scan can be restarted
/// from any point.
#[derive(Debug, Clone)]
pub struct Parameters<'a> {
    input: &'a str,
    offset: Option<usize>,
}

impl<'a> Iterator for Parameters<'a> {
    type Item = Parameter<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset?;
        match next_parameter(self.input, offset) {
            Some((parameter, next)) => {
                self.offset = Some(next);
                Some(parameter)
            }
            None => {
                self.offset = None;
                None
            }
        }
    }
}

/// Scan one parameter starting at `offset`, which must point at its `;`
///
/// Returns the parameter and the offset just past it, or `None` once the
/// list ends or stops being well-formed.
pub fn next_parameter(input: &str, offset: usize) -> Option<(Parameter<'_>, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(offset) != Some(&b';') {
        return None;
    }

    // ';' OWS name OWS
    let mut current = offset + 1;
    current += whitespace_length(input, current);
    let name_start = current;
    let name_length = token_length(input, current);
    let name = &input[name_start..name_start + name_length];
    current += name_length;
    current += whitespace_length(input, current);

    if name_length == 0 || bytes.get(current) != Some(&b'=') {
        // A trailing bare `*` stands for `*=*`
        if current == bytes.len() && name == WILDCARD {
            let parameter = Parameter {
                name,
                value: name,
                value_offset: Some(name_start),
            };
            return Some((parameter, current));
        }
        return None;
    }

    // '=' OWS ( token / quoted-string ) OWS
    let mut value_start = current + 1;
    value_start += whitespace_length(input, value_start);
    let token = token_length(input, value_start);

    let (value, value_offset, consumed) = if token > 0 {
        (&input[value_start..value_start + token], value_start, token)
    } else if let ParseResult::Parsed(quoted) = quoted_string_length(input, value_start) {
        (
            &input[value_start + 1..value_start + quoted - 1],
            value_start + 1,
            quoted,
        )
    } else {
        // Unusable value: report the name, stop the scan at the '='
        let parameter = Parameter {
            name,
            value: "",
            value_offset: None,
        };
        return Some((parameter, current));
    };

    let mut next = value_start + consumed;
    next += whitespace_length(input, next);

    Some((
        Parameter {
            name,
            value,
            value_offset: Some(value_offset),
        },
        next,
    ))
}

impl<'a> MediaType<'a> {
    /// Parse a media type
    ///
    /// # Examples
    /// ```
    /// use http_delivery::http::media_type::MediaType;
    ///
    /// let media = MediaType::parse("application/vnd.api+json; charset=utf-8");
    /// assert_eq!(media.media_type(), "application");
    /// assert_eq!(media.sub_type_without_suffix(), "vnd.api");
    /// assert_eq!(media.sub_type_suffix(), Some("json"));
    /// assert_eq!(media.get_parameter("CHARSET"), Some("utf-8"));
    /// ```
    pub fn parse(input: &'a str) -> Self {
        let Some((media_type, type_length)) = scan_type(input) else {
            return Self::empty(input);
        };
        let Some((sub_type, sub_type_length)) = scan_sub_type(input, type_length) else {
            return Self::empty(input);
        };

        let (sub_type_without_suffix, sub_type_suffix) = match sub_type.rfind('+') {
            Some(plus) => (&sub_type[..plus], Some(&sub_type[plus + 1..])),
            None => (sub_type, None),
        };

        Self {
            source: input,
            media_type,
            sub_type,
            sub_type_without_suffix,
            sub_type_suffix,
            parameters_offset: Some(type_length + sub_type_length),
        }
    }

    const fn empty(input: &'a str) -> Self {
        Self {
            source: input,
            media_type: "",
            sub_type: "",
            sub_type_without_suffix: "",
            sub_type_suffix: None,
            parameters_offset: None,
        }
    }

    /// The text this media type was parsed from
    pub const fn source(&self) -> &'a str {
        self.source
    }

    pub const fn is_empty(&self) -> bool {
        self.media_type.is_empty()
    }

    /// Top-level type, e.g. `text`
    pub const fn media_type(&self) -> &'a str {
        self.media_type
    }

    /// Full subtype including any suffix, e.g. `vnd.api+json`
    pub const fn sub_type(&self) -> &'a str {
        self.sub_type
    }

    /// Subtype before the last `+`, or the whole subtype without one
    pub const fn sub_type_without_suffix(&self) -> &'a str {
        self.sub_type_without_suffix
    }

    /// Structured syntax suffix after the last `+`
    pub const fn sub_type_suffix(&self) -> Option<&'a str> {
        self.sub_type_suffix
    }

    pub fn matches_all_types(&self) -> bool {
        self.media_type == WILDCARD
    }

    pub fn matches_all_sub_types(&self) -> bool {
        self.sub_type == WILDCARD
    }

    pub fn matches_all_sub_types_without_suffix(&self) -> bool {
        self.sub_type_without_suffix == WILDCARD
    }

    /// True if any part of this media range is a wildcard
    pub fn has_wildcard(&self) -> bool {
        self.matches_all_types()
            || self.matches_all_sub_types()
            || self.matches_all_sub_types_without_suffix()
            || self.get_parameter(WILDCARD) == Some(WILDCARD)
    }

    /// A fresh cursor positioned at the head of the parameter list
    pub const fn parameters(&self) -> Parameters<'a> {
        Parameters {
            input: self.source,
            offset: self.parameters_offset,
        }
    }

    /// Value of the first parameter named `name` (case-insensitive)
    pub fn get_parameter(&self, name: &str) -> Option<&'a str> {
        self.find_parameter(name).map(|p| p.value)
    }

    fn find_parameter(&self, name: &str) -> Option<Parameter<'a>> {
        self.parameters().find(|p| p.has_name(name))
    }

    /// Value of the `charset` parameter
    pub fn charset(&self) -> Option<&'a str> {
        self.get_parameter("charset")
    }

    /// Encoding named by the `charset` parameter, if it is one we know
    pub fn encoding(&self) -> Option<Charset> {
        let charset = self.charset()?;
        if charset.eq_ignore_ascii_case("utf-8") {
            return Some(Charset::Utf8);
        }
        Charset::for_label(charset)
    }

    /// Whether this media type is acceptable to a request that sent `set`
    /// as a media range
    ///
    /// # Examples
    /// ```
    /// use http_delivery::http::media_type::MediaType;
    ///
    /// let html = MediaType::parse("text/html");
    /// assert!(html.is_subset_of(&MediaType::parse("text/*")));
    /// assert!(!html.is_subset_of(&MediaType::parse("application/*")));
    /// ```
    pub fn is_subset_of(&self, set: &MediaType<'_>) -> bool {
        self.matches_type(set) && self.matches_sub_type(set) && self.contains_all_parameters(set)
    }

    fn matches_type(&self, set: &MediaType<'_>) -> bool {
        set.matches_all_types() || set.media_type.eq_ignore_ascii_case(self.media_type)
    }

    fn matches_sub_type(&self, set: &MediaType<'_>) -> bool {
        if set.matches_all_sub_types() {
            return true;
        }

        match (set.sub_type_suffix, self.sub_type_suffix) {
            (Some(set_suffix), Some(suffix)) => {
                (set.matches_all_sub_types_without_suffix()
                    || set
                        .sub_type_without_suffix
                        .eq_ignore_ascii_case(self.sub_type_without_suffix))
                    && set_suffix.eq_ignore_ascii_case(suffix)
            }
            (Some(_), None) => false,
            (None, _) => set.sub_type.eq_ignore_ascii_case(self.sub_type),
        }
    }

    fn contains_all_parameters(&self, set: &MediaType<'_>) -> bool {
        for required in set.parameters() {
            // Parameters after q are accept-extensions, not part of the range
            if required.has_name(QUALITY_PARAMETER) {
                break;
            }
            if required.has_name(WILDCARD) {
                continue;
            }
            if !self.parameters().any(|p| p.matches(&required)) {
                return false;
            }
        }
        true
    }
}

/// Rewrite the `charset` parameter of `media_type` to name `charset`
///
/// Returns the input unchanged when it already names that charset, appends
/// `; charset=...` when it names none, and otherwise splices the new name
/// over the old value.
///
/// # Examples
/// ```
/// use http_delivery::http::charset::Charset;
/// use http_delivery::http::media_type::replace_encoding;
///
/// assert_eq!(replace_encoding("text/plain", Charset::Utf8), "text/plain; charset=utf-8");
/// assert_eq!(
///     replace_encoding("text/plain; charset=us-ascii; x=1", Charset::Utf8),
///     "text/plain; charset=utf-8; x=1"
/// );
/// ```
pub fn replace_encoding(media_type: &str, charset: Charset) -> Cow<'_, str> {
    let parsed = MediaType::parse(media_type);
    // A charset whose value could not be read counts as absent
    let Some((current, value_offset)) = parsed
        .find_parameter("charset")
        .and_then(|p| p.value_offset.map(|offset| (p, offset)))
    else {
        return Cow::Owned(format!("{media_type}; charset={}", charset.web_name()));
    };

    if current.value.eq_ignore_ascii_case(charset.web_name()) {
        return Cow::Borrowed(media_type);
    }

    let rest = value_offset + current.value.len();
    let mut replaced = String::with_capacity(media_type.len() + charset.web_name().len());
    replaced.push_str(&media_type[..value_offset]);
    replaced.push_str(charset.web_name());
    replaced.push_str(&media_type[rest..]);
    Cow::Owned(replaced)
}

/// Encoding named by the `charset` parameter of `media_type`
pub fn get_encoding(media_type: &str) -> Option<Charset> {
    MediaType::parse(media_type).encoding()
}

/// OWS type OWS, returning the type and the bytes consumed
fn scan_type(input: &str) -> Option<(&str, usize)> {
    let mut current = whitespace_length(input, 0);
    let length = token_length(input, current);
    if length == 0 {
        return None;
    }
    let media_type = &input[current..current + length];
    current += length;
    current += whitespace_length(input, current);
    Some((media_type, current))
}

/// "/" OWS subtype OWS, returning the subtype and the bytes consumed
fn scan_sub_type(input: &str, offset: usize) -> Option<(&str, usize)> {
    if input.as_bytes().get(offset) != Some(&b'/') {
        return None;
    }
    let mut current = offset + 1;
    current += whitespace_length(input, current);
    let length = token_length(input, current);
    if length == 0 {
        return None;
    }
    let sub_type = &input[current..current + length];
    current += length;
    current += whitespace_length(input, current);
    Some((sub_type, current - offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subset(media: &str, set: &str) -> bool {
        MediaType::parse(media).is_subset_of(&MediaType::parse(set))
    }

    #[test]
    fn test_parse_basic() {
        let media = MediaType::parse("text/html");
        assert_eq!(media.media_type(), "text");
        assert_eq!(media.sub_type(), "html");
        assert_eq!(media.sub_type_without_suffix(), "html");
        assert_eq!(media.sub_type_suffix(), None);
        assert_eq!(media.parameters().count(), 0);
    }

    #[test]
    fn test_parse_preserves_case_and_skips_whitespace() {
        let media = MediaType::parse("  Text / HTML ;Level = 1");
        assert_eq!(media.media_type(), "Text");
        assert_eq!(media.sub_type(), "HTML");
        assert_eq!(media.get_parameter("level"), Some("1"));
    }

    #[test]
    fn test_parse_suffix() {
        let media = MediaType::parse("application/vnd.api+json");
        assert_eq!(media.sub_type(), "vnd.api+json");
        assert_eq!(media.sub_type_without_suffix(), "vnd.api");
        assert_eq!(media.sub_type_suffix(), Some("json"));

        // Split happens on the last '+'
        let media = MediaType::parse("application/a+b+xml");
        assert_eq!(media.sub_type_without_suffix(), "a+b");
        assert_eq!(media.sub_type_suffix(), Some("xml"));
    }

    #[test]
    fn test_parse_failures_are_empty() {
        for input in ["", "   ", "text", "text/", "/html", "text/ ;charset=utf-8", "\"text\"/html"] {
            let media = MediaType::parse(input);
            assert!(media.is_empty(), "{input:?} should be empty");
            assert_eq!(media.sub_type(), "");
            assert_eq!(media.parameters().count(), 0);
        }
    }

    #[test]
    fn test_parameters() {
        let media = MediaType::parse("text/plain; charset=\"utf-8\" ; format=flowed;delsp=yes");
        let names: Vec<_> = media.parameters().map(|p| (p.name, p.value)).collect();
        assert_eq!(
            names,
            vec![("charset", "utf-8"), ("format", "flowed"), ("delsp", "yes")]
        );
        assert_eq!(media.charset(), Some("utf-8"));
        assert_eq!(media.get_parameter("missing"), None);
    }

    #[test]
    fn test_parameter_scan_restarts() {
        let media = MediaType::parse("text/plain; a=1; a=2");
        // First occurrence wins, however often we ask
        assert_eq!(media.get_parameter("a"), Some("1"));
        assert_eq!(media.get_parameter("A"), Some("1"));

        let mut cursor = media.parameters();
        assert_eq!(cursor.next().map(|p| p.value), Some("1"));
        let saved = cursor.clone();
        assert_eq!(cursor.next().map(|p| p.value), Some("2"));
        assert_eq!(cursor.next(), None);
        assert_eq!(saved.count(), 1);
    }

    #[test]
    fn test_parameter_scan_stops_on_garbage() {
        let media = MediaType::parse("text/plain; a=1; =x; b=2");
        let names: Vec<_> = media.parameters().map(|p| p.name).collect();
        assert_eq!(names, vec!["a"]);

        // A value that is neither token nor quoted-string ends the list
        let media = MediaType::parse("text/plain; a=\"open; b=2");
        let params: Vec<_> = media.parameters().map(|p| (p.name, p.value)).collect();
        assert_eq!(params, vec![("a", "")]);
    }

    #[test]
    fn test_trailing_wildcard_parameter() {
        let media = MediaType::parse("text/plain;*");
        assert_eq!(media.get_parameter("*"), Some("*"));
        assert!(media.has_wildcard());
    }

    #[test]
    fn test_wildcards() {
        assert!(MediaType::parse("*/*").matches_all_types());
        assert!(MediaType::parse("text/*").matches_all_sub_types());
        assert!(MediaType::parse("application/*+json").matches_all_sub_types_without_suffix());
        assert!(MediaType::parse("text/*").has_wildcard());
        assert!(!MediaType::parse("text/html").has_wildcard());
    }

    #[test]
    fn test_subset_types() {
        assert!(subset("text/html", "text/*"));
        assert!(subset("text/html", "*/*"));
        assert!(subset("TEXT/HTML", "text/html"));
        assert!(!subset("text/html", "application/*"));
        assert!(!subset("text/html", "text/plain"));
    }

    #[test]
    fn test_subset_suffix() {
        assert!(subset("application/vnd.api+json", "application/*+json"));
        assert!(subset("application/vnd.api+json", "application/vnd.api+json"));
        assert!(!subset("application/vnd.api+xml", "application/*+json"));
        assert!(!subset("application/json", "application/*+json"));
        assert!(!subset("application/vnd.api+json", "application/json"));
    }

    #[test]
    fn test_subset_parameters() {
        assert!(subset("text/plain; charset=utf-8", "text/plain"));
        assert!(subset("text/plain; charset=utf-8", "text/plain; charset=UTF-8"));
        assert!(!subset("text/plain", "text/plain; charset=utf-8"));
        assert!(!subset("text/plain; charset=latin1", "text/plain; charset=utf-8"));
        assert!(subset(
            "text/plain; format=flowed; charset=utf-8",
            "text/plain; charset=utf-8; format=flowed"
        ));
    }

    #[test]
    fn test_subset_stops_at_quality() {
        assert!(subset("text/plain", "text/plain; q=0.8; level=1"));
        assert!(!subset("text/plain", "text/plain; level=1; q=0.8"));
        assert!(subset("text/plain", "text/plain; *=*"));
    }

    #[test]
    fn test_subset_is_reflexive() {
        for input in [
            "text/html",
            "application/vnd.api+json; version=2",
            "*/*",
            "text/plain; charset=utf-8; format=flowed",
            "",
        ] {
            assert!(subset(input, input), "{input:?} should be a subset of itself");
        }
    }

    #[test]
    fn test_encoding() {
        assert_eq!(MediaType::parse("text/html; charset=utf-8").encoding(), Some(Charset::Utf8));
        assert_eq!(
            MediaType::parse("text/html; charset=\"ISO-8859-1\"").encoding(),
            Some(Charset::Iso8859_1)
        );
        assert_eq!(MediaType::parse("text/html; charset=bogus").encoding(), None);
        assert_eq!(MediaType::parse("text/html").encoding(), None);
        assert_eq!(get_encoding("text/plain; charset=utf-16"), Some(Charset::Utf16Le));
    }

    #[test]
    fn test_replace_encoding_same_charset_is_noop() {
        let input = "text/html; charset=UTF-8";
        let replaced = replace_encoding(input, Charset::Utf8);
        assert!(matches!(replaced, Cow::Borrowed(_)));
        assert_eq!(replaced, input);
    }

    #[test]
    fn test_replace_encoding_unreadable_charset_appends() {
        assert_eq!(
            replace_encoding("text/plain; charset=\"open", Charset::Utf8),
            "text/plain; charset=\"open; charset=utf-8"
        );
        assert_eq!(
            replace_encoding("text/plain; charset=", Charset::Utf8),
            "text/plain; charset=; charset=utf-8"
        );
    }

    #[test]
    fn test_replace_encoding_quoted() {
        assert_eq!(
            replace_encoding("text/html; charset=\"us-ascii\"", Charset::Iso8859_1),
            "text/html; charset=\"iso-8859-1\""
        );
    }
}
