//! Format-specific extraction logic.
//!
//! Pure functions over byte buffers. The plugin wrappers in [`crate::extractors`]
//! decide where they run; nothing here touches the registry or the runtime.

pub mod pdf;
pub mod text;
pub mod zip;

pub use pdf::{PdfText, extract_pdf, extract_pdf_text, has_pdf_header};
pub use text::{decode_utf8_lossy, extract_text};
pub use zip::{ZipEntry, extract_zip, read_entries};
