//! HTTP-date module
//!
//! Parses and formats the date forms of RFC 7231 section 7.1.1.1. Validators
//! carry whole-second precision, so comparisons go through
//! [`round_down_to_seconds`].

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Preferred format: `Sun, 06 Nov 1994 08:49:37 GMT`
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 format: `Sunday, 06-Nov-94 08:49:37 GMT`
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// Obsolete ANSI C `asctime()` format: `Sun Nov  6 08:49:37 1994`
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Parse an HTTP-date in any of the three accepted forms
///
/// # Examples
/// ```
/// use http_delivery::http::date::parse_http_date;
///
/// let a = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT");
/// let b = parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT");
/// let c = parse_http_date("Sun Nov  6 08:49:37 1994");
/// assert!(a.is_some());
/// assert_eq!(a, b);
/// assert_eq!(a, c);
/// assert!(parse_http_date("yesterday").is_none());
/// ```
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Format a timestamp as an IMF-fixdate
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Drop sub-second precision
#[inline]
pub fn round_down_to_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(0)
}
