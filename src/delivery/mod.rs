//! Delivery decision module
//!
//! Composes content-type resolution, precondition evaluation and range
//! negotiation into one decision per request:
//! - `decide` computes status, headers and byte window, with no I/O
//! - `respond` applies a decision to in-memory content
//! - `respond_text` serves text in its resolved encoding
//! - `stream_body` / `copy_body` stream a decided window from a seekable source

mod body;
mod content;
mod file;

pub use body::{copy_body, CopyOutcome};
pub use content::{render_text, RenderedText, TextContent};
pub use file::open_file_resource;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Method, Response, StatusCode};
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite};

use crate::config::{DeliveryConfig, EngineConfig, LoggingConfig};
use crate::http::conditional::{evaluate_preconditions, if_range_valid, RequestConditionals};
use crate::http::content_type::resolve;
use crate::http::date::{format_http_date, round_down_to_seconds};
use crate::http::disposition::attachment;
use crate::http::etag::{generate_etag, EntityTag};
use crate::http::mime::{ContentTypeProvider, ExtensionContentTypeProvider};
use crate::http::range::{parse_range_header, unsatisfied_content_range, ByteRange, RangeParseResult};
use crate::http::response::{build_response, slice_body};
use crate::http::PreconditionState;
use crate::logger::{self, DecisionLogEntry};

/// What the engine knows about the resource being served
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Total length in bytes; unknown lengths are streamed whole
    pub length: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<EntityTag>,
    /// Content-Type chosen by whoever produced the resource
    pub content_type_hint: Option<String>,
    /// Name used to look up a Content-Type when there is no hint
    pub file_name: Option<String>,
    /// Sent as `Content-Disposition: attachment` when present
    pub download_name: Option<String>,
    /// Overrides `delivery.enable_range_processing` for this resource
    pub enable_range_processing: Option<bool>,
}

impl ResourceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe in-memory content: known length and a strong content hash tag
    pub fn for_bytes(content: &[u8]) -> Self {
        Self {
            length: Some(content.len() as u64),
            etag: Some(generate_etag(content)),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub const fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    #[must_use]
    pub fn with_etag(mut self, etag: EntityTag) -> Self {
        self.etag = Some(etag);
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type_hint = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn with_download_name(mut self, download_name: impl Into<String>) -> Self {
        self.download_name = Some(download_name.into());
        self
    }

    #[must_use]
    pub const fn with_range_processing(mut self, enabled: bool) -> Self {
        self.enable_range_processing = Some(enabled);
        self
    }
}

/// The parts of a request the engine looks at
#[derive(Debug, Clone, Copy)]
pub struct DeliveryRequest<'a> {
    pub method: &'a Method,
    /// Only used for logging
    pub path: &'a str,
    pub headers: &'a HeaderMap,
    /// Reference time for rejecting conditional dates in the future
    pub now: DateTime<Utc>,
    /// Content-Type already set on the outgoing response, if any
    pub response_content_type: Option<&'a str>,
}

impl<'a> DeliveryRequest<'a> {
    pub fn new(method: &'a Method, path: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            path,
            headers,
            now: Utc::now(),
            response_content_type: None,
        }
    }

    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub const fn with_response_content_type(mut self, content_type: &'a str) -> Self {
        self.response_content_type = Some(content_type);
        self
    }

    fn is_get_or_head(&self) -> bool {
        *self.method == Method::GET || *self.method == Method::HEAD
    }
}

/// How a resource should be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDecision {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Byte window to send; `None` means the whole resource
    pub range: Option<ByteRange>,
    /// Bytes in `range`, 0 when there is none
    pub range_length: u64,
    /// Whether any body bytes should be written
    pub serve_body: bool,
    pub precondition: PreconditionState,
}

impl DeliveryDecision {
    const fn full(headers: HeaderMap, precondition: PreconditionState, serve_body: bool) -> Self {
        Self {
            status: StatusCode::OK,
            headers,
            range: None,
            range_length: 0,
            serve_body,
            precondition,
        }
    }

    const fn without_body(
        status: StatusCode,
        headers: HeaderMap,
        precondition: PreconditionState,
    ) -> Self {
        Self {
            status,
            headers,
            range: None,
            range_length: 0,
            serve_body: false,
            precondition,
        }
    }
}

/// Delivery decision engine
///
/// Cheap to clone; holds only configuration and the Content-Type provider.
#[derive(Clone)]
pub struct DeliveryEngine {
    config: DeliveryConfig,
    logging: LoggingConfig,
    provider: Arc<dyn ContentTypeProvider>,
}

impl DeliveryEngine {
    pub fn new(config: &EngineConfig) -> Self {
        logger::log_engine_config(config);
        Self {
            config: config.delivery.clone(),
            logging: config.logging.clone(),
            provider: Arc::new(ExtensionContentTypeProvider::with_overrides(
                &config.content_types,
            )),
        }
    }

    /// Replace the Content-Type provider
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ContentTypeProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub const fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Decide status, headers and byte window for serving `resource`
    ///
    /// Pure: the same request and resource always give the same decision.
    ///
    /// # Examples
    /// ```
    /// use hyper::header::{HeaderMap, HeaderValue, CONTENT_RANGE, RANGE};
    /// use hyper::{Method, StatusCode};
    /// use http_delivery::{DeliveryEngine, DeliveryRequest, EngineConfig, ResourceDescriptor};
    ///
    /// let engine = DeliveryEngine::new(&EngineConfig::default());
    /// let mut headers = HeaderMap::new();
    /// headers.insert(RANGE, HeaderValue::from_static("bytes=-500"));
    ///
    /// let request = DeliveryRequest::new(&Method::GET, "/file.bin", &headers);
    /// let resource = ResourceDescriptor::new().with_length(1000);
    /// let decision = engine.decide(&request, &resource);
    ///
    /// assert_eq!(decision.status, StatusCode::PARTIAL_CONTENT);
    /// assert_eq!(decision.headers[CONTENT_RANGE], "bytes 500-999/1000");
    /// assert_eq!(decision.range_length, 500);
    /// ```
    pub fn decide(
        &self,
        request: &DeliveryRequest<'_>,
        resource: &ResourceDescriptor,
    ) -> DeliveryDecision {
        let mut headers = HeaderMap::new();

        let looked_up = resource
            .file_name
            .as_deref()
            .and_then(|name| self.provider.content_type_for(name))
            .or_else(|| {
                resource
                    .download_name
                    .as_deref()
                    .and_then(|name| self.provider.content_type_for(name))
            });
        let resolved = resolve(
            resource.content_type_hint.as_deref().or(looked_up),
            request.response_content_type,
            &self.config.default_content_type,
        );
        insert_header(&mut headers, CONTENT_TYPE, resolved.content_type);
        if let Some(name) = resource.download_name.as_deref().filter(|n| !n.is_empty()) {
            insert_header(&mut headers, CONTENT_DISPOSITION, &attachment(name));
        }

        let last_modified = resource.last_modified.map(round_down_to_seconds);
        if let Some(last_modified) = last_modified {
            insert_header(&mut headers, LAST_MODIFIED, &format_http_date(last_modified));
        }
        if let Some(etag) = &resource.etag {
            insert_header(&mut headers, ETAG, &etag.to_string());
        }

        let conditionals = RequestConditionals::from_headers(request.headers);
        let precondition = evaluate_preconditions(
            &conditionals,
            last_modified,
            resource.etag.as_ref(),
            request.now,
        );
        match precondition {
            PreconditionState::NotModified => {
                return DeliveryDecision::without_body(
                    StatusCode::NOT_MODIFIED,
                    headers,
                    precondition,
                );
            }
            PreconditionState::PreconditionFailed => {
                return DeliveryDecision::without_body(
                    StatusCode::PRECONDITION_FAILED,
                    headers,
                    precondition,
                );
            }
            PreconditionState::Unspecified | PreconditionState::ShouldProcess => {}
        }

        let serve_body = *request.method != Method::HEAD;
        let Some(length) = resource.length else {
            return DeliveryDecision::full(headers, precondition, serve_body);
        };

        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        let range_processing = resource
            .enable_range_processing
            .unwrap_or(self.config.enable_range_processing);
        if !range_processing {
            return DeliveryDecision::full(headers, precondition, serve_body);
        }
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

        if !request.is_get_or_head()
            || !if_range_valid(
                conditionals.if_range.as_ref(),
                last_modified,
                resource.etag.as_ref(),
            )
        {
            return DeliveryDecision::full(headers, precondition, serve_body);
        }

        match parse_range_header(request.headers, length) {
            RangeParseResult::Valid(range) => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
                insert_header(&mut headers, CONTENT_RANGE, &range.content_range(length));
                DeliveryDecision {
                    status: StatusCode::PARTIAL_CONTENT,
                    headers,
                    range: Some(range),
                    range_length: range.len(),
                    serve_body,
                    precondition,
                }
            }
            RangeParseResult::NotSatisfiable => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(0u64));
                insert_header(&mut headers, CONTENT_RANGE, &unsatisfied_content_range(length));
                DeliveryDecision::without_body(
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    headers,
                    precondition,
                )
            }
            RangeParseResult::None | RangeParseResult::Unsliced => {
                DeliveryDecision::full(headers, precondition, serve_body)
            }
        }
    }

    /// Decide and build a response carrying the chosen part of `content`
    pub fn respond(
        &self,
        request: &DeliveryRequest<'_>,
        resource: &ResourceDescriptor,
        content: &Bytes,
    ) -> Response<Full<Bytes>> {
        if let Some(length) = resource.length {
            if length != content.len() as u64 {
                logger::log_warning(&format!(
                    "Resource length {length} does not match content length {} for {}",
                    content.len(),
                    request.path
                ));
            }
        }

        let decision = self.decide(request, resource);
        let body = slice_body(content, decision.range, decision.serve_body);
        self.write_decision_log(
            request,
            decision.status,
            &decision.headers,
            decision.range,
            decision.precondition,
            body.len(),
        );
        build_response(decision.status, decision.headers, body)
    }

    /// Build a response for text content
    ///
    /// The text is encoded in the charset of the resolved Content-Type,
    /// falling back to `delivery.text_content_type`.
    pub fn respond_text(
        &self,
        request: &DeliveryRequest<'_>,
        text: &TextContent,
    ) -> Response<Full<Bytes>> {
        let rendered = render_text(
            text,
            request.response_content_type,
            &self.config.text_content_type,
        );
        let body = if *request.method == Method::HEAD {
            Bytes::new()
        } else {
            rendered.body
        };

        self.write_decision_log(
            request,
            rendered.status,
            &rendered.headers,
            None,
            PreconditionState::Unspecified,
            body.len(),
        );
        build_response(rendered.status, rendered.headers, body)
    }

    /// Stream the body a decision selected from `source` into `sink`
    ///
    /// Copies nothing when the decision serves no body; otherwise copies
    /// the decided window (or everything) in `delivery.buffer_size` chunks.
    pub async fn stream_body<R, W, C>(
        &self,
        decision: &DeliveryDecision,
        source: &mut R,
        sink: &mut W,
        cancel: C,
    ) -> std::io::Result<CopyOutcome>
    where
        R: AsyncRead + AsyncSeek + Unpin,
        W: AsyncWrite + Unpin,
        C: Future<Output = ()>,
    {
        if !decision.serve_body {
            return Ok(CopyOutcome::Completed(0));
        }
        copy_body(source, sink, decision.range, self.config.buffer_size, cancel).await
    }

    fn write_decision_log(
        &self,
        request: &DeliveryRequest<'_>,
        status: StatusCode,
        headers: &HeaderMap,
        range: Option<ByteRange>,
        precondition: PreconditionState,
        body_bytes: usize,
    ) {
        logger::log_debug(&format!(
            "{} {} -> {} ({}, {body_bytes} bytes)",
            request.method,
            request.path,
            status.as_u16(),
            precondition.as_str()
        ));
        if !self.logging.decision_log {
            return;
        }

        let mut entry = DecisionLogEntry::new(request.method.to_string(), request.path.to_string());
        entry.status = status.as_u16();
        entry.content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        entry.range = range.map(|range| (range.from, range.to));
        entry.body_bytes = body_bytes;
        entry.precondition = precondition.as_str();
        logger::log_decision(&entry, &self.logging.decision_log_format);
    }
}

/// Insert a header, skipping values that are not valid header text
fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}
