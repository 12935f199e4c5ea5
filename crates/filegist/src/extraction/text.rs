//! Plain text extraction.
//!
//! Text-like files are returned verbatim. Decoding never fails: invalid UTF-8
//! sequences become U+FFFD. With the `simd-utf8` feature, valid input is
//! validated with SIMD and borrowed without a copy.
//!
//! # Example
//!
//! ```rust
//! use filegist::extraction::text::extract_text;
//! use filegist::FileType;
//!
//! let result = extract_text("hello.txt", b"hello world", FileType::Text);
//! assert_eq!(result.content, "hello world");
//! assert_eq!(result.extracted_size, 11);
//! ```
use std::borrow::Cow;

use crate::types::{ExtractedFileContent, FileType};

/// Decode bytes as UTF-8, replacing invalid sequences.
pub fn decode_utf8_lossy(bytes: &[u8]) -> Cow<'_, str> {
    #[cfg(feature = "simd-utf8")]
    if let Ok(text) = simdutf8::basic::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    String::from_utf8_lossy(bytes)
}

/// Build the extraction result for an already decoded text.
pub fn text_content(file_name: &str, file_type: FileType, original_size: u64, text: String) -> ExtractedFileContent {
    let extracted_size = text.chars().count();
    ExtractedFileContent {
        file_name: file_name.to_string(),
        file_type,
        content: text,
        original_size,
        extracted_size,
    }
}

/// Extract text content from raw bytes.
pub fn extract_text(file_name: &str, bytes: &[u8], file_type: FileType) -> ExtractedFileContent {
    let text = decode_utf8_lossy(bytes).into_owned();
    text_content(file_name, file_type, bytes.len() as u64, text)
}
