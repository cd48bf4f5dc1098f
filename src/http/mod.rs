//! HTTP protocol layer module
//!
//! Header grammars and per-header semantics, decoupled from any delivery
//! policy. Everything here is pure: raw header text in, values out.

pub mod charset;
pub mod conditional;
pub mod content_type;
pub mod date;
pub mod disposition;
pub mod etag;
pub mod media_type;
pub mod mime;
pub mod range;
pub mod response;
pub mod token;

// Re-export commonly used types
pub use charset::Charset;
pub use conditional::{evaluate_preconditions, PreconditionState, RequestConditionals};
pub use etag::{EntityTag, ETagCondition};
pub use media_type::MediaType;
pub use mime::{ContentTypeProvider, ExtensionContentTypeProvider};
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{build_response, slice_body};
