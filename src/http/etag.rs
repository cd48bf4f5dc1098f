//! Entity tag module
//!
//! Provides `ETag` generation, parsing of `ETag`/`If-Match`/`If-None-Match`
//! values and the strong/weak comparison functions of RFC 7232 section 2.3.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::token::{quoted_string_length, whitespace_length, ParseResult};

/// An entity tag: an opaque validator with a weakness flag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    /// Opaque tag without the surrounding quotes
    tag: String,
    weak: bool,
}

/// One element of an `If-Match` / `If-None-Match` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ETagCondition {
    /// `*`, matching any current representation
    Any,
    Tag(EntityTag),
}

impl EntityTag {
    pub fn strong(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            weak: false,
        }
    }

    pub fn weak(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            weak: true,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub const fn is_weak(&self) -> bool {
        self.weak
    }

    /// Parse a single entity tag such as `"abc"` or `W/"abc"`
    ///
    /// # Examples
    /// ```
    /// use http_delivery::http::etag::EntityTag;
    ///
    /// let tag = EntityTag::parse("W/\"v1\"").unwrap();
    /// assert!(tag.is_weak());
    /// assert_eq!(tag.tag(), "v1");
    /// assert!(EntityTag::parse("v1").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match scan_entity_tag(value, 0) {
            Some((tag, length)) if length == value.len() => Some(tag),
            _ => None,
        }
    }

    /// Strong comparison: both strong and identical opaque tags
    pub fn strong_eq(&self, other: &Self) -> bool {
        !self.weak && !other.weak && self.tag == other.tag
    }

    /// Weak comparison: identical opaque tags regardless of weakness
    pub fn weak_eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }

    /// Compare using strong or weak comparison
    pub fn compare(&self, other: &Self, use_strong_comparison: bool) -> bool {
        if use_strong_comparison {
            self.strong_eq(other)
        } else {
            self.weak_eq(other)
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.tag)
        } else {
            write!(f, "\"{}\"", self.tag)
        }
    }
}

impl ETagCondition {
    /// Whether this condition is satisfied by the resource's current tag
    pub fn matches(&self, etag: &EntityTag, use_strong_comparison: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Tag(tag) => tag.compare(etag, use_strong_comparison),
        }
    }
}

/// Generate a strong `ETag` using fast hashing
///
/// # Arguments
/// * `content` - File content
///
/// # Returns
/// Strong tag whose opaque part is the hex hash, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> EntityTag {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    EntityTag::strong(format!("{v:x}"))
}

/// Parse an `If-Match` / `If-None-Match` field value
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", W/"def456"`
/// - Wildcard: `*`
///
/// Returns `None` if any element is malformed; the header is then unusable
/// and callers treat it as absent.
pub fn parse_etag_list(value: &str) -> Option<Vec<ETagCondition>> {
    let mut conditions = Vec::new();
    let bytes = value.as_bytes();
    let mut current = 0;

    loop {
        // Empty list elements are allowed: `"a", , "b"`
        current += whitespace_length(value, current);
        while bytes.get(current) == Some(&b',') {
            current += 1;
            current += whitespace_length(value, current);
        }
        if current >= bytes.len() {
            break;
        }

        if bytes[current] == b'*' {
            conditions.push(ETagCondition::Any);
            current += 1;
        } else {
            let (tag, length) = scan_entity_tag(value, current)?;
            conditions.push(ETagCondition::Tag(tag));
            current += length;
        }

        current += whitespace_length(value, current);
        match bytes.get(current) {
            None => break,
            Some(b',') => current += 1,
            Some(_) => return None,
        }
    }

    Some(conditions)
}

/// Scan `[W/] quoted-string` at `start`, returning the tag and its length
fn scan_entity_tag(input: &str, start: usize) -> Option<(EntityTag, usize)> {
    let weak = input
        .get(start..start + 2)
        .is_some_and(|prefix| prefix == "W/");
    let quote_start = if weak { start + 2 } else { start };

    match quoted_string_length(input, quote_start) {
        ParseResult::Parsed(length) => {
            let tag = &input[quote_start + 1..quote_start + length - 1];
            // Entity tags are etagc characters; no escaping is permitted
            if tag.contains('\\') {
                return None;
            }
            let entity_tag = EntityTag {
                tag: tag.to_string(),
                weak,
            };
            Some((entity_tag, quote_start + length - start))
        }
        ParseResult::NotParsed | ParseResult::InvalidFormat => None,
    }
}
