//! Upload validation.
//!
//! Decides whether a file may be accepted at all, before any extraction runs.
//! Text-based extensions pass on name alone; everything else is sniffed with
//! `infer` and checked against [`ALLOWED_MIME_TYPES`].

use crate::core::classify::extension_of;
use crate::core::config::ExtractionConfig;
use crate::extraction::text::decode_utf8_lossy;
use crate::{FilegistError, Result};

/// Extensions accepted without looking at the content.
pub const TEXT_BASED_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "xml", "csv", "html", "htm", "css", "scss", "sass", "less", "js", "jsx", "ts",
    "tsx", "py", "java", "c", "cpp", "h", "hpp", "cs", "php", "rb", "go", "rs", "swift", "kt", "scala", "r", "sql",
    "sh", "bash", "zsh", "ps1", "yml", "yaml", "toml", "ini", "conf", "config", "env", "log",
];

/// MIME types accepted when sniffed from the content or guessed from the name.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/heic",
    "image/heif",
    "application/pdf",
    "text/plain",
    "text/markdown",
    "text/html",
    "text/css",
    "text/javascript",
    "text/xml",
    "text/csv",
    "application/json",
    "application/xml",
    "text/yaml",
    "application/yaml",
    "application/zip",
    "application/x-zip-compressed",
    "application/x-tar",
    "application/x-gzip",
    "application/gzip",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/x-7z-compressed",
    "application/javascript",
    "application/typescript",
    "text/x-python",
    "text/x-java-source",
    "text/x-c",
    "text/x-c++src",
    "text/x-csharp",
    "text/x-php",
    "text/x-ruby",
    "text/x-go",
    "text/x-rust",
    "text/x-swift",
    "text/x-kotlin",
    "text/x-scala",
    "text/x-r",
    "text/x-sql",
    "text/x-shellscript",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-word",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

fn is_allowed_by_name(guessed: &str) -> bool {
    is_allowed_mime(guessed)
        || guessed.starts_with("text/")
        || guessed.starts_with("application/json")
        || guessed.starts_with("application/xml")
}

fn looks_printable(sample: &[u8]) -> bool {
    let text = decode_utf8_lossy(sample);
    !text.is_empty()
        && text
            .chars()
            .all(|c| matches!(c, '\x20'..='\x7E') || c.is_whitespace())
}

/// Check whether `bytes`, uploaded under `name`, is an acceptable file.
///
/// # Errors
///
/// [`FilegistError::Validation`] with one of:
/// - "File size exceeds 10MB limit" (the figure follows `upload.max_file_size`)
/// - "File type could not be determined"
/// - "File type '<mime>' is not supported"
pub fn validate_upload(name: &str, bytes: &[u8], config: &ExtractionConfig) -> Result<()> {
    let limits = &config.upload;

    if bytes.len() as u64 > limits.max_file_size {
        return Err(FilegistError::validation(format!(
            "File size exceeds {}MB limit",
            limits.max_file_size / (1024 * 1024)
        )));
    }

    let extension = extension_of(name);
    if TEXT_BASED_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(());
    }

    let sniff = &bytes[..bytes.len().min(limits.sniff_bytes)];
    let Some(detected) = infer::get(sniff) else {
        let sample = &bytes[..bytes.len().min(limits.printable_sample_bytes)];
        if looks_printable(sample) {
            return Ok(());
        }
        tracing::debug!(file = name, "upload rejected, content type unknown");
        return Err(FilegistError::validation("File type could not be determined"));
    };

    let detected_mime = detected.mime_type();
    let guessed_mime = mime_guess::from_path(name).first_raw();

    if is_allowed_mime(detected_mime) || guessed_mime.is_some_and(is_allowed_by_name) {
        return Ok(());
    }

    tracing::debug!(file = name, mime = detected_mime, "upload rejected, type not allowed");
    Err(FilegistError::validation(format!(
        "File type '{}' is not supported",
        detected_mime
    )))
}
