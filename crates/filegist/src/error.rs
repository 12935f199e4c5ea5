//! Error types for filegist.
//!
//! Every fallible operation in the crate returns [`FilegistError`]. The variants
//! mirror the per-file failure taxonomy of the extractor:
//!
//! - `UnsupportedType` - extension/size outside the extraction allow-list
//! - `Read` - the underlying file handle could not be read
//! - `InvalidPdf` - buffer does not carry a `%PDF-` header
//! - `UnreadablePdf` - not enough text could be recovered from a PDF
//! - `CorruptArchive` - missing or invalid ZIP structure
//!
//! plus the infrastructure errors (`Io`, `Validation`, `Serialization`, `Plugin`,
//! `LockPoisoned`) used by configuration loading, upload validation and the
//! extractor registry.
//!
//! Per-file errors never escape the batch orchestrator: they are converted into a
//! [`crate::types::FailedFile`] carrying the `Display` text of the error.
//!
//! # Example
//!
//! ```rust
//! use filegist::{FilegistError, Result};
//!
//! fn require_text(content: &str) -> Result<&str> {
//!     if content.is_empty() {
//!         return Err(FilegistError::validation("content is empty"));
//!     }
//!     Ok(content)
//! }
//!
//! assert!(require_text("").is_err());
//! ```
use thiserror::Error;

/// Result type alias using `FilegistError`.
pub type Result<T> = std::result::Result<T, FilegistError>;

/// Main error type for all filegist operations.
#[derive(Debug, Error)]
pub enum FilegistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File type '{0}' is not supported for content extraction")]
    UnsupportedType(String),

    #[error("Failed to read text content: {message}")]
    Read {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("{0}")]
    UnreadablePdf(String),

    #[error("Corrupt ZIP archive: {0}")]
    CorruptArchive(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for FilegistError {
    fn from(err: serde_json::Error) -> Self {
        FilegistError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl FilegistError {
    error_constructor!(read, Read);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    /// Short machine-readable name of the error class.
    ///
    /// Used in JSON output so callers can branch on the failure kind without
    /// parsing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FilegistError::Io(_) => "io",
            FilegistError::UnsupportedType(_) => "unsupported_type",
            FilegistError::Read { .. } => "read",
            FilegistError::InvalidPdf(_) => "invalid_pdf",
            FilegistError::UnreadablePdf(_) => "unreadable_pdf",
            FilegistError::CorruptArchive(_) => "corrupt_archive",
            FilegistError::Validation { .. } => "validation",
            FilegistError::Serialization { .. } => "serialization",
            FilegistError::Plugin { .. } => "plugin",
            FilegistError::LockPoisoned(_) => "lock_poisoned",
            FilegistError::Other(_) => "other",
        }
    }
}
