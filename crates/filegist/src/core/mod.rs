//! Core extraction orchestration module.
//!
//! This module contains the extraction entry points and the pieces around them:
//! file classification, configuration, file handles, upload validation, progress
//! tracking and prompt formatting.
//!
//! # Example
//!
//! ```rust,no_run
//! use filegist::core::config::ExtractionConfig;
//! use filegist::core::extractor::extract;
//! use filegist::core::io::DiskFile;
//!
//! # async fn example() -> filegist::Result<()> {
//! let config = ExtractionConfig::default();
//! let file = DiskFile::open("report.pdf").await?;
//! let result = extract(&file, &config).await?;
//! println!("Extracted content: {}", result.content);
//! # Ok(())
//! # }
//! ```

pub mod batch_mode;
pub mod classify;
pub mod config;
pub mod extractor;
pub mod format;
pub mod io;
pub mod progress;
pub mod validation;

pub use classify::{classify, is_supported};
pub use config::{ExtractionConfig, PdfConfig, UploadConfig, ZipConfig};
pub use extractor::{
    extract, extract_file_content, extract_file_content_sync, extract_multiple_files, extract_multiple_files_sync,
    extract_paths, extract_sync,
};
pub use format::{format_batch_for_prompt, format_content_for_prompt};
pub use io::{DiskFile, FileSource, InMemoryFile};
pub use progress::{FileProcessingState, FileProcessingTracker, ProgressCallback};
pub use validation::validate_upload;
