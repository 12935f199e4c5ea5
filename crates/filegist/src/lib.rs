//! filegist - text extraction for chat attachments
//!
//! filegist turns user-supplied files into plain text that can be placed into a
//! language-model prompt. Text and source files are returned verbatim, PDFs are
//! scanned heuristically for text operators, and ZIP archives are summarized with
//! previews of their small text members.
//!
//! # Quick Start
//!
//! ```rust
//! use filegist::{ExtractionConfig, InMemoryFile, extract_file_content_sync, format_content_for_prompt};
//!
//! let config = ExtractionConfig::default();
//! let file = InMemoryFile::new("todo.md", b"- write the release notes".to_vec());
//!
//! let result = extract_file_content_sync(&file, &config);
//! assert!(result.success());
//! println!("{}", format_content_for_prompt(result.content().unwrap()));
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): classification, orchestration, configuration, validation
//! - **Extraction** (`extraction`): pure text, PDF and ZIP scanners
//! - **Plugin System** (`plugins`): priority-ordered extractor registry
//! - **Extractors** (`extractors`): built-in plugins wrapping the scanners

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod extractors;
pub mod plugins;
pub mod types;

pub use error::{FilegistError, Result};
pub use types::*;

pub use core::classify::{classify, is_supported};
pub use core::config::{ExtractionConfig, PdfConfig, UploadConfig, ZipConfig};
pub use core::extractor::{
    extract, extract_file_content, extract_file_content_sync, extract_multiple_files, extract_multiple_files_sync,
    extract_paths, extract_sync,
};
pub use core::format::{format_batch_for_prompt, format_content_for_prompt};
pub use core::io::{DiskFile, FileSource, InMemoryFile};
pub use core::progress::{FileProcessingState, FileProcessingTracker, ProgressCallback};
pub use core::validation::validate_upload;

pub use plugins::registry::get_document_extractor_registry;
