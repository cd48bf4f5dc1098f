//! Character set lookup module
//!
//! Maps `charset` parameter labels to the encodings the delivery engine can
//! produce text in. Unknown labels are not an error: lookups return `None`.

use std::fmt;

/// Text encodings supported for response bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    /// Little-endian UTF-16, the meaning of a bare `utf-16` label
    Utf16Le,
    Utf16Be,
    UsAscii,
    Iso8859_1,
}

impl Charset {
    /// Look up an encoding by its charset label (case-insensitive)
    ///
    /// # Examples
    /// ```
    /// use http_delivery::http::charset::Charset;
    /// assert_eq!(Charset::for_label("UTF-8"), Some(Charset::Utf8));
    /// assert_eq!(Charset::for_label("latin1"), Some(Charset::Iso8859_1));
    /// assert_eq!(Charset::for_label("klingon"), None);
    /// ```
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("utf-8") {
            return Some(Self::Utf8);
        }

        match label.to_ascii_lowercase().as_str() {
            "utf8" | "unicode-1-1-utf-8" | "unicode11utf8" | "x-unicode20utf8" => Some(Self::Utf8),
            "utf-16" | "utf-16le" | "unicode" | "ucs-2" | "csunicode" | "iso-10646-ucs-2" => {
                Some(Self::Utf16Le)
            }
            "utf-16be" | "unicodefffe" => Some(Self::Utf16Be),
            "us-ascii" | "ascii" | "us" | "iso646-us" | "iso-ir-6" | "ansi_x3.4-1968"
            | "ansi_x3.4-1986" | "cp367" | "ibm367" | "csascii" => Some(Self::UsAscii),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "iso_8859-1:1987" | "latin1" | "l1"
            | "cp819" | "ibm819" | "iso-ir-100" | "csisolatin1" => Some(Self::Iso8859_1),
            _ => None,
        }
    }

    /// Canonical name used in `charset=` parameters
    pub const fn web_name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16",
            Self::Utf16Be => "utf-16be",
            Self::UsAscii => "us-ascii",
            Self::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Encode text, replacing characters outside the charset with `?`
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::UsAscii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Number of bytes `text` occupies once encoded
    pub fn byte_count(self, text: &str) -> usize {
        match self {
            Self::Utf8 => text.len(),
            Self::Utf16Le | Self::Utf16Be => text.encode_utf16().count() * 2,
            Self::UsAscii | Self::Iso8859_1 => text.chars().count(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.web_name())
    }
}
