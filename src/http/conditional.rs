//! Conditional request module
//!
//! Evaluates `If-Match`, `If-None-Match`, `If-Modified-Since`,
//! `If-Unmodified-Since` and `If-Range` (RFC 7232) against a resource's
//! current validators.
//!
//! Every header is judged on its own; the outcome is the highest-ranked
//! state among them (see [`PreconditionState`]).

use chrono::{DateTime, Utc};
use hyper::header::{
    HeaderMap, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE,
};

use super::date::{parse_http_date, round_down_to_seconds};
use super::etag::{parse_etag_list, ETagCondition, EntityTag};

/// Outcome of evaluating the conditional headers
///
/// States are ranked `Unspecified < NotModified < ShouldProcess <
/// PreconditionFailed`; combining states keeps the highest rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreconditionState {
    /// No applicable precondition
    Unspecified,
    /// Respond 304
    NotModified,
    /// Preconditions passed; serve normally
    ShouldProcess,
    /// Respond 412
    PreconditionFailed,
}

impl PreconditionState {
    /// Position in the precedence order
    pub const fn rank(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::NotModified => 1,
            Self::ShouldProcess => 2,
            Self::PreconditionFailed => 3,
        }
    }

    /// The higher-ranked of two states
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::NotModified => "not_modified",
            Self::ShouldProcess => "should_process",
            Self::PreconditionFailed => "precondition_failed",
        }
    }
}

/// Validator carried by `If-Range`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfRange {
    Tag(EntityTag),
    Date(DateTime<Utc>),
}

impl IfRange {
    /// Parse an `If-Range` value: an entity tag or an HTTP-date
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.starts_with('"') || trimmed.starts_with("W/") {
            EntityTag::parse(trimmed).map(Self::Tag)
        } else {
            parse_http_date(trimmed).map(Self::Date)
        }
    }
}

/// Conditional headers of one request
///
/// Headers that are missing or cannot be parsed are empty / `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConditionals {
    pub if_match: Vec<ETagCondition>,
    pub if_none_match: Vec<ETagCondition>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
    pub if_range: Option<IfRange>,
}

impl RequestConditionals {
    /// Collect the conditional headers from a request header map
    ///
    /// List headers sent more than once are concatenated. A list with a
    /// malformed element is dropped entirely.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            if_match: etag_list_header(headers, &IF_MATCH),
            if_none_match: etag_list_header(headers, &IF_NONE_MATCH),
            if_modified_since: single_header(headers, &IF_MODIFIED_SINCE)
                .and_then(parse_http_date),
            if_unmodified_since: single_header(headers, &IF_UNMODIFIED_SINCE)
                .and_then(parse_http_date),
            if_range: single_header(headers, &IF_RANGE).and_then(IfRange::parse),
        }
    }
}

fn single_header<'h>(headers: &'h HeaderMap, name: &hyper::header::HeaderName) -> Option<&'h str> {
    let mut values = headers.get_all(name).iter();
    let value = values.next()?;
    if values.next().is_some() {
        // Singleton fields sent twice are ambiguous
        return None;
    }
    value.to_str().ok()
}

fn etag_list_header(headers: &HeaderMap, name: &hyper::header::HeaderName) -> Vec<ETagCondition> {
    let mut conditions = Vec::new();
    for value in &headers.get_all(name) {
        let Some(list) = value.to_str().ok().and_then(parse_etag_list) else {
            return Vec::new();
        };
        conditions.extend(list);
    }
    conditions
}

/// Compute the precondition state for a request
///
/// # Arguments
/// * `conditionals` - Parsed conditional headers
/// * `last_modified` - Resource modification time, if known
/// * `etag` - Resource entity tag, if known
/// * `now` - Current time; dates in the future are ignored
pub fn evaluate_preconditions(
    conditionals: &RequestConditionals,
    last_modified: Option<DateTime<Utc>>,
    etag: Option<&EntityTag>,
    now: DateTime<Utc>,
) -> PreconditionState {
    let last_modified = last_modified.map(round_down_to_seconds);
    let now = round_down_to_seconds(now);

    let if_match = etag.map_or(PreconditionState::Unspecified, |etag| {
        etag_match_state(
            &conditionals.if_match,
            etag,
            true,
            PreconditionState::ShouldProcess,
            PreconditionState::PreconditionFailed,
        )
    });

    let if_none_match = etag.map_or(PreconditionState::Unspecified, |etag| {
        etag_match_state(
            &conditionals.if_none_match,
            etag,
            false,
            PreconditionState::NotModified,
            PreconditionState::ShouldProcess,
        )
    });

    let mut if_modified_since = PreconditionState::Unspecified;
    if let (Some(last_modified), Some(since)) = (last_modified, conditionals.if_modified_since) {
        if since <= now {
            if_modified_since = if since < last_modified {
                PreconditionState::ShouldProcess
            } else {
                PreconditionState::NotModified
            };
        }
    }

    let mut if_unmodified_since = PreconditionState::Unspecified;
    if let (Some(last_modified), Some(since)) = (last_modified, conditionals.if_unmodified_since) {
        if since <= now {
            if_unmodified_since = if last_modified <= since {
                PreconditionState::ShouldProcess
            } else {
                PreconditionState::PreconditionFailed
            };
        }
    }

    if_match
        .max(if_none_match)
        .max(if_modified_since)
        .max(if_unmodified_since)
}

fn etag_match_state(
    conditions: &[ETagCondition],
    etag: &EntityTag,
    use_strong_comparison: bool,
    match_found: PreconditionState,
    match_not_found: PreconditionState,
) -> PreconditionState {
    if conditions.is_empty() {
        return PreconditionState::Unspecified;
    }

    if conditions
        .iter()
        .any(|condition| condition.matches(etag, use_strong_comparison))
    {
        match_found
    } else {
        match_not_found
    }
}

/// Check whether `If-Range` allows the `Range` header to be honored
///
/// A date validator fails when the resource changed after it; a tag
/// validator fails unless it strongly matches the current tag. No
/// `If-Range` at all always passes.
pub fn if_range_valid(
    if_range: Option<&IfRange>,
    last_modified: Option<DateTime<Utc>>,
    etag: Option<&EntityTag>,
) -> bool {
    match if_range {
        None => true,
        Some(IfRange::Date(date)) => last_modified
            .map(round_down_to_seconds)
            .map_or(true, |last_modified| last_modified <= *date),
        Some(IfRange::Tag(tag)) => etag.map_or(true, |etag| tag.strong_eq(etag)),
    }
}
