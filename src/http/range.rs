//! HTTP Range request parsing module
//!
//! Range header parsing and normalization for partial content, compliant
//! with RFC 7233. Only a single `bytes` range is served; anything else is
//! treated as if no Range header had been sent.

use hyper::header::{HeaderMap, RANGE};

use super::token::{token_length, whitespace_length, MAX_U64_DIGITS};

const BYTES_UNIT: &str = "bytes";

/// One `byte-range-spec` as sent by the client
///
/// `from` only: open-ended range. `to` only: the last `to` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// A satisfiable byte window, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub from: u64,
    pub to: u64,
}

impl ByteRange {
    /// Number of bytes in the window
    #[inline]
    pub const fn len(&self) -> u64 {
        self.to - self.from + 1
    }

    /// A normalized window always holds at least one byte
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{total_size}", self.from, self.to)
    }
}

/// `Content-Range` value for a 416 response
pub fn unsatisfied_content_range(total_size: u64) -> String {
    format!("bytes */{total_size}")
}

/// Range header parse result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No Range header, several of them, multiple ranges or malformed
    /// (ignore, return full content)
    None,
    /// Range header understood but there is nothing to slice: the range set
    /// is empty or the resource is empty (return full content)
    Unsliced,
    /// Range not satisfiable - should return 416
    NotSatisfiable,
    /// Valid range request
    Valid(ByteRange),
}

impl RangeParseResult {
    /// Whether the client sent a Range header we understood
    pub const fn is_range_request(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Parse the Range headers of a request against a resource length
pub fn parse_range_header(headers: &HeaderMap, length: u64) -> RangeParseResult {
    let raw: Option<Vec<&str>> = headers
        .get_all(RANGE)
        .iter()
        .map(|value| value.to_str().ok())
        .collect();

    match raw {
        Some(values) => parse_range(&values, length),
        // Non-visible-ASCII header bytes: malformed
        None => RangeParseResult::None,
    }
}

/// Parse raw Range header values (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Arguments
/// * `raw_values` - Every Range header instance, in order
/// * `length` - Total resource size
///
/// # Examples
/// ```
/// use http_delivery::http::range::{parse_range, ByteRange, RangeParseResult};
///
/// // Fixed range
/// let result = parse_range(&["bytes=0-99"], 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { from: 0, to: 99 }));
///
/// // No Range header
/// let result = parse_range(&[], 1000);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range(raw_values: &[&str], length: u64) -> RangeParseResult {
    let value = match raw_values {
        [] => return RangeParseResult::None,
        [value] if value.is_empty() => return RangeParseResult::None,
        [value] => *value,
        // Several Range headers: treat as absent
        _ => return RangeParseResult::None,
    };

    // Only support single range (not multi-range)
    if value.contains(',') {
        return RangeParseResult::None;
    }

    let Some(ranges) = parse_range_set(value) else {
        return RangeParseResult::None;
    };

    let Some(spec) = ranges.first() else {
        return RangeParseResult::Unsliced;
    };

    if length == 0 {
        return RangeParseResult::Unsliced;
    }

    match normalize_range(*spec, length) {
        Some(range) => RangeParseResult::Valid(range),
        None => RangeParseResult::NotSatisfiable,
    }
}

/// Parse `bytes-unit "=" byte-range-set`
///
/// Returns `None` if the unit is not `bytes` or any spec is malformed.
/// Empty list elements are skipped, so `bytes=` yields an empty set.
pub fn parse_range_set(value: &str) -> Option<Vec<RangeSpec>> {
    let mut current = whitespace_length(value, 0);
    let unit_length = token_length(value, current);
    let unit = &value[current..current + unit_length];
    if !unit.eq_ignore_ascii_case(BYTES_UNIT) {
        return None; // Not bytes unit, ignore
    }
    current += unit_length;
    current += whitespace_length(value, current);

    let rest = value[current..].strip_prefix('=')?;
    rest.split(',')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(parse_range_spec)
        .collect()
}

/// Parse one `first-byte-pos "-" [last-byte-pos]` or `"-" suffix-length`
fn parse_range_spec(spec: &str) -> Option<RangeSpec> {
    let (from_str, to_str) = spec.split_once('-')?;
    let (from_str, to_str) = (from_str.trim(), to_str.trim());

    let from = parse_position(from_str)?;
    let to = parse_position(to_str)?;

    match (from, to) {
        (None, None) => None,
        (Some(from), Some(to)) if from > to => None,
        _ => Some(RangeSpec { from, to }),
    }
}

/// Parse an optional decimal position; `Some(None)` for an empty string
fn parse_position(digits: &str) -> Option<Option<u64>> {
    if digits.is_empty() {
        return Some(None);
    }
    if digits.len() > MAX_U64_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(Some)
}

/// Clamp a range spec to a resource of `length` bytes
///
/// Returns `None` when the spec cannot be satisfied (416).
pub const fn normalize_range(spec: RangeSpec, length: u64) -> Option<ByteRange> {
    match (spec.from, spec.to) {
        (Some(from), to) => {
            if from >= length {
                return None;
            }
            let to = match to {
                Some(to) if to < length => to,
                _ => length - 1,
            };
            Some(ByteRange { from, to })
        }
        (None, Some(suffix)) => {
            if suffix == 0 {
                return None;
            }
            // Suffix larger than the resource is valid: the whole resource
            let bytes = if suffix < length { suffix } else { length };
            let from = length - bytes;
            Some(ByteRange {
                from,
                to: from + bytes - 1,
            })
        }
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn valid(from: u64, to: u64) -> RangeParseResult {
        RangeParseResult::Valid(ByteRange { from, to })
    }

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range(&[], 100), RangeParseResult::None);
        assert_eq!(parse_range(&[""], 100), RangeParseResult::None);
        assert!(!RangeParseResult::None.is_range_request());
    }

    #[test]
    fn test_standard_range() {
        let result = parse_range(&["bytes=0-9"], 100);
        assert_eq!(result, valid(0, 9));
        if let RangeParseResult::Valid(range) = result {
            assert_eq!(range.len(), 10);
            assert_eq!(range.content_range(100), "bytes 0-9/100");
        }
    }

    #[test]
    fn test_open_range() {
        assert_eq!(parse_range(&["bytes=50-"], 100), valid(50, 99));
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(parse_range(&["bytes=-20"], 100), valid(80, 99));
        assert_eq!(parse_range(&["bytes=-500"], 1000), valid(500, 999));
        // Longer than the resource: everything
        assert_eq!(parse_range(&["bytes=-5000"], 1000), valid(0, 999));
        assert_eq!(
            parse_range(&["bytes=-0"], 1000),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_end_is_clamped() {
        let result = parse_range(&["bytes=900-2000"], 1000);
        assert_eq!(result, valid(900, 999));
        if let RangeParseResult::Valid(range) = result {
            assert_eq!(range.len(), 100);
        }
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            parse_range(&["bytes=200-"], 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range(&["bytes=1000-2000"], 1000),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(unsatisfied_content_range(1000), "bytes */1000");
    }

    #[test]
    fn test_unsliced() {
        let result = parse_range(&["bytes="], 100);
        assert_eq!(result, RangeParseResult::Unsliced);
        assert!(result.is_range_request());
        assert_eq!(parse_range(&["bytes=0-9"], 0), RangeParseResult::Unsliced);
    }

    #[test]
    fn test_invalid_format() {
        for header in [
            "bytes=a-b",
            "bytes=-",
            "bytes=5-1",
            "bytes 0-9",
            "items=0-9",
            "bytes=0-9-",
            "bytes=+1-2",
            "bytes=99999999999999999999-",
        ] {
            assert_eq!(
                parse_range(&[header], 100),
                RangeParseResult::None,
                "{header:?} should be ignored"
            );
        }
    }

    #[test]
    fn test_multiple_ranges_ignored() {
        assert_eq!(
            parse_range(&["bytes=0-9,20-29"], 100),
            RangeParseResult::None
        );
        assert_eq!(
            parse_range(&["bytes=0-9", "bytes=20-29"], 100),
            RangeParseResult::None
        );
    }

    #[test]
    fn test_unit_and_whitespace() {
        assert_eq!(parse_range(&[" Bytes = 10 - 19 "], 100), valid(10, 19));
    }

    #[test]
    fn test_range_set_lists() {
        let set = parse_range_set("bytes=0-1, -5,10-").unwrap();
        assert_eq!(
            set,
            vec![
                RangeSpec { from: Some(0), to: Some(1) },
                RangeSpec { from: None, to: Some(5) },
                RangeSpec { from: Some(10), to: None },
            ]
        );
        assert!(parse_range_set("bytes=").unwrap().is_empty());
    }

    #[test]
    fn test_from_header_map() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_range_header(&headers, 100), RangeParseResult::None);

        headers.insert(RANGE, HeaderValue::from_static("bytes=10-"));
        assert_eq!(parse_range_header(&headers, 100), valid(10, 99));

        headers.append(RANGE, HeaderValue::from_static("bytes=0-1"));
        assert_eq!(parse_range_header(&headers, 100), RangeParseResult::None);
    }
}
