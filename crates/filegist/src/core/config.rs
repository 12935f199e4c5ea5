//! Configuration loading and management.
//!
//! Every limit used by the classifier, the extractors and upload validation lives
//! here. All fields are defaulted, so a config file only needs to name what it
//! overrides. Configuration can be loaded from TOML, YAML or JSON, or discovered by
//! walking parent directories for `filegist.toml`.

use crate::{FilegistError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the file looked up by [`ExtractionConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "filegist.toml";

/// Top-level extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    /// Files below this size are eligible for extraction whatever their type.
    #[serde(default = "default_supported_fallback_size")]
    pub supported_fallback_size: u64,

    /// Upper bound on simultaneously running extractions in a batch.
    ///
    /// `None` runs every file concurrently.
    #[serde(default)]
    pub max_concurrent_extractions: Option<usize>,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub zip: ZipConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

/// Limits for the heuristic PDF scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PdfConfig {
    /// Below this many characters of stream text, the raw-buffer fallback scan is used.
    #[serde(default = "default_min_stream_text_chars")]
    pub min_stream_text_chars: usize,

    /// Below this many characters the PDF is reported as unreadable.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Recovered text is truncated to this many characters.
    #[serde(default = "default_pdf_max_chars")]
    pub max_chars: usize,
}

/// Limits for the ZIP central-directory reader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZipConfig {
    /// Entries at or above this uncompressed size are listed but never read.
    #[serde(default = "default_max_entry_size")]
    pub max_entry_size: u64,

    /// Maximum number of bytes read back from a stored entry.
    #[serde(default = "default_read_back_limit")]
    pub read_back_limit: usize,

    /// Per-entry block size in the report, in characters.
    #[serde(default = "default_max_entry_chars")]
    pub max_entry_chars: usize,
}

/// Limits for pre-upload validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    #[serde(default = "default_max_upload_size")]
    pub max_file_size: u64,

    /// Number of leading bytes handed to the magic-number sniffer.
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,

    /// Number of leading bytes checked by the printable-text fallback.
    #[serde(default = "default_printable_sample_bytes")]
    pub printable_sample_bytes: usize,
}

fn default_supported_fallback_size() -> u64 {
    5 * 1024 * 1024
}

fn default_min_stream_text_chars() -> usize {
    50
}

fn default_min_text_chars() -> usize {
    20
}

fn default_pdf_max_chars() -> usize {
    10_000
}

fn default_max_entry_size() -> u64 {
    50 * 1024
}

fn default_read_back_limit() -> usize {
    1000
}

fn default_max_entry_chars() -> usize {
    2000
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}

fn default_sniff_bytes() -> usize {
    4100
}

fn default_printable_sample_bytes() -> usize {
    1000
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            supported_fallback_size: default_supported_fallback_size(),
            max_concurrent_extractions: None,
            pdf: PdfConfig::default(),
            zip: ZipConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_stream_text_chars: default_min_stream_text_chars(),
            min_text_chars: default_min_text_chars(),
            max_chars: default_pdf_max_chars(),
        }
    }
}

impl Default for ZipConfig {
    fn default() -> Self {
        Self {
            max_entry_size: default_max_entry_size(),
            read_back_limit: default_read_back_limit(),
            max_entry_chars: default_max_entry_chars(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_upload_size(),
            sniff_bytes: default_sniff_bytes(),
            printable_sample_bytes: default_printable_sample_bytes(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| FilegistError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| FilegistError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| FilegistError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            other => Err(FilegistError::validation(format!(
                "Unsupported config format '{}' for {} (expected .toml, .yaml, .yml or .json)",
                other,
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `filegist.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(FilegistError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`discover`](Self::discover), starting at `start` instead of the
    /// working directory.
    pub fn discover_from(start: impl AsRef<Path>) -> Result<Option<Self>> {
        let mut current = Some(start.as_ref());

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "discovered configuration file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
            current = dir.parent();
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| FilegistError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
