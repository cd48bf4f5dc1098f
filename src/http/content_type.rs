//! Response Content-Type resolution module
//!
//! Chooses the Content-Type and text encoding of a response from, in order:
//! the type the result asked for explicitly, the type already set on the
//! response, and a default.

use super::charset::Charset;
use super::media_type::get_encoding;

/// Content-Type chosen for a response, with the encoding text is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedContentType<'a> {
    pub content_type: &'a str,
    /// `None` only when the winning type and the default both lack a usable charset
    pub encoding: Option<Charset>,
}

/// Resolve the effective Content-Type and encoding
///
/// An unresolvable charset on the chosen type falls back to the default
/// type's encoding; nothing here fails.
///
/// # Examples
/// ```
/// use http_delivery::http::charset::Charset;
/// use http_delivery::http::content_type::resolve;
///
/// let resolved = resolve(Some("application/json"), None, "text/plain; charset=utf-8");
/// assert_eq!(resolved.content_type, "application/json");
/// assert_eq!(resolved.encoding, Some(Charset::Utf8));
/// ```
pub fn resolve<'a>(
    explicit_type: Option<&'a str>,
    already_set_type: Option<&'a str>,
    default_type: &'a str,
) -> ResolvedContentType<'a> {
    let default_encoding = get_encoding(default_type);

    if let Some(explicit_type) = explicit_type {
        return ResolvedContentType {
            content_type: explicit_type,
            encoding: get_encoding(explicit_type).or(default_encoding),
        };
    }

    if let Some(already_set) = already_set_type.filter(|t| !t.is_empty()) {
        return ResolvedContentType {
            content_type: already_set,
            encoding: get_encoding(already_set).or(default_encoding),
        };
    }

    ResolvedContentType {
        content_type: default_type,
        encoding: default_encoding,
    }
}
