//! MIME type detection module
//!
//! Maps file names to a Content-Type by extension, for file resources that
//! were not given an explicit type.

use std::collections::HashMap;
use std::path::Path;

/// Source of Content-Type values for file names
pub trait ContentTypeProvider: Send + Sync {
    /// Content-Type for `file_name`, or `None` if the extension is unknown
    fn content_type_for(&self, file_name: &str) -> Option<&str>;
}

/// Extension-based provider with optional per-extension overrides
#[derive(Debug, Clone, Default)]
pub struct ExtensionContentTypeProvider {
    /// Lowercase extension (no dot) to Content-Type; consulted first
    overrides: HashMap<String, String>,
}

impl ExtensionContentTypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider whose `overrides` win over the built-in table
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(ext, content_type)| {
                (
                    ext.trim_start_matches('.').to_ascii_lowercase(),
                    content_type.clone(),
                )
            })
            .collect();
        Self { overrides }
    }
}

impl ContentTypeProvider for ExtensionContentTypeProvider {
    fn content_type_for(&self, file_name: &str) -> Option<&str> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();

        if let Some(content_type) = self.overrides.get(&extension) {
            return Some(content_type.as_str());
        }
        get_content_type(Some(extension.as_str()))
    }
}

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use http_delivery::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), Some("text/html; charset=utf-8"));
/// assert_eq!(get_content_type(Some("mp4")), Some("video/mp4"));
/// assert_eq!(get_content_type(Some("xyz")), None);
/// ```
pub fn get_content_type(extension: Option<&str>) -> Option<&'static str> {
    let content_type = match extension? {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "bin" => "application/octet-stream",

        _ => return None,
    };
    Some(content_type)
}
