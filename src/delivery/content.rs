//! Text content delivery
//!
//! Encodes a string in the charset of its resolved Content-Type.

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::StatusCode;

use crate::http::charset::Charset;
use crate::http::content_type::resolve;

/// Text to send, with optional type and status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContent {
    pub content: Option<String>,
    pub content_type: Option<String>,
    pub status: Option<StatusCode>,
}

impl TextContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

/// Status, headers and encoded body for a text response
#[derive(Debug, Clone)]
pub struct RenderedText {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Resolve the Content-Type of `text` and encode it
///
/// Content-Length is the encoded byte count. No content means no
/// Content-Length and an empty body.
///
/// # Examples
/// ```
/// use hyper::header::CONTENT_LENGTH;
/// use http_delivery::delivery::{render_text, TextContent};
///
/// let text = TextContent::new("café").with_content_type("text/plain; charset=iso-8859-1");
/// let rendered = render_text(&text, None, "text/plain; charset=utf-8");
/// assert_eq!(rendered.headers[CONTENT_LENGTH], "4");
/// assert_eq!(&rendered.body[..], b"caf\xe9");
/// ```
pub fn render_text(text: &TextContent, already_set: Option<&str>, default_type: &str) -> RenderedText {
    let resolved = resolve(text.content_type.as_deref(), already_set, default_type);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(resolved.content_type) {
        headers.insert(CONTENT_TYPE, value);
    }

    let body = match &text.content {
        Some(content) => {
            let encoded = resolved.encoding.unwrap_or(Charset::Utf8).encode(content);
            headers.insert(CONTENT_LENGTH, HeaderValue::from(encoded.len()));
            Bytes::from(encoded)
        }
        None => Bytes::new(),
    };

    RenderedText {
        status: text.status.unwrap_or(StatusCode::OK),
        headers,
        body,
    }
}
