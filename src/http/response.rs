//! HTTP response building module
//!
//! Turns a status, header set and in-memory content into a hyper response,
//! decoupled from how the status and headers were decided.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};

use super::range::ByteRange;

/// Build a response from decided parts
pub fn build_response(status: StatusCode, headers: HeaderMap, body: Bytes) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    if let Some(map) = builder.headers_mut() {
        *map = headers;
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Select the part of `content` a response should carry
///
/// No body when `serve_body` is false; the byte window when a range was
/// chosen (clamped to what `content` actually holds); otherwise everything.
///
/// # Examples
/// ```
/// use hyper::body::Bytes;
/// use http_delivery::http::range::ByteRange;
/// use http_delivery::http::response::slice_body;
///
/// let content = Bytes::from_static(b"0123456789");
/// let window = Some(ByteRange { from: 2, to: 4 });
/// assert_eq!(slice_body(&content, window, true), Bytes::from_static(b"234"));
/// assert!(slice_body(&content, window, false).is_empty());
/// ```
pub fn slice_body(content: &Bytes, range: Option<ByteRange>, serve_body: bool) -> Bytes {
    if !serve_body {
        return Bytes::new();
    }
    let Some(range) = range else {
        return content.clone();
    };

    let len = content.len();
    let from = usize::try_from(range.from).map_or(len, |from| from.min(len));
    let end = usize::try_from(range.to).map_or(len, |to| to.saturating_add(1).min(len));
    content.slice(from..end.max(from))
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, CONTENT_LENGTH};

    #[test]
    fn test_build_response_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(3u64));
        let response = build_response(StatusCode::PARTIAL_CONTENT, headers, Bytes::from("abc"));
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_LENGTH], "3");
    }

    #[test]
    fn test_slice_full_body() {
        let content = Bytes::from_static(b"hello");
        assert_eq!(slice_body(&content, None, true), content);
    }

    #[test]
    fn test_slice_clamps_to_content() {
        let content = Bytes::from_static(b"hello");
        let window = Some(ByteRange { from: 3, to: 99 });
        assert_eq!(slice_body(&content, window, true), Bytes::from_static(b"lo"));

        let window = Some(ByteRange { from: 10, to: 20 });
        assert!(slice_body(&content, window, true).is_empty());
    }
}
