use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of an uploaded file.
///
/// Derived purely from the file-name extension by [`crate::core::classify::classify`].
/// Serialized as the lowercase tag (`"text"`, `"typescript"`, `"pdf"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Text,
    Markdown,
    Json,
    Xml,
    Csv,
    Tsv,
    Log,
    Config,
    Env,
    Yaml,
    Toml,

    Javascript,
    Typescript,
    Python,
    Java,
    C,
    Cpp,
    Csharp,
    Php,
    Ruby,
    Go,
    Rust,
    Swift,
    Kotlin,
    Scala,
    R,
    Sql,
    Shell,
    Powershell,

    Html,
    Css,
    Scss,
    Sass,
    Less,

    Pdf,
    Zip,
    Archive,
    Document,
    Unknown,
}

impl FileType {
    /// Every tag, in declaration order.
    pub const ALL: [FileType; 39] = [
        FileType::Text,
        FileType::Markdown,
        FileType::Json,
        FileType::Xml,
        FileType::Csv,
        FileType::Tsv,
        FileType::Log,
        FileType::Config,
        FileType::Env,
        FileType::Yaml,
        FileType::Toml,
        FileType::Javascript,
        FileType::Typescript,
        FileType::Python,
        FileType::Java,
        FileType::C,
        FileType::Cpp,
        FileType::Csharp,
        FileType::Php,
        FileType::Ruby,
        FileType::Go,
        FileType::Rust,
        FileType::Swift,
        FileType::Kotlin,
        FileType::Scala,
        FileType::R,
        FileType::Sql,
        FileType::Shell,
        FileType::Powershell,
        FileType::Html,
        FileType::Css,
        FileType::Scss,
        FileType::Sass,
        FileType::Less,
        FileType::Pdf,
        FileType::Zip,
        FileType::Archive,
        FileType::Document,
        FileType::Unknown,
    ];

    /// Lowercase tag, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Text => "text",
            FileType::Markdown => "markdown",
            FileType::Json => "json",
            FileType::Xml => "xml",
            FileType::Csv => "csv",
            FileType::Tsv => "tsv",
            FileType::Log => "log",
            FileType::Config => "config",
            FileType::Env => "env",
            FileType::Yaml => "yaml",
            FileType::Toml => "toml",
            FileType::Javascript => "javascript",
            FileType::Typescript => "typescript",
            FileType::Python => "python",
            FileType::Java => "java",
            FileType::C => "c",
            FileType::Cpp => "cpp",
            FileType::Csharp => "csharp",
            FileType::Php => "php",
            FileType::Ruby => "ruby",
            FileType::Go => "go",
            FileType::Rust => "rust",
            FileType::Swift => "swift",
            FileType::Kotlin => "kotlin",
            FileType::Scala => "scala",
            FileType::R => "r",
            FileType::Sql => "sql",
            FileType::Shell => "shell",
            FileType::Powershell => "powershell",
            FileType::Html => "html",
            FileType::Css => "css",
            FileType::Scss => "scss",
            FileType::Sass => "sass",
            FileType::Less => "less",
            FileType::Pdf => "pdf",
            FileType::Zip => "zip",
            FileType::Archive => "archive",
            FileType::Document => "document",
            FileType::Unknown => "unknown",
        }
    }

    /// True for every tag served by the plain-text extractor.
    pub fn is_text_like(self) -> bool {
        !matches!(
            self,
            FileType::Pdf | FileType::Zip | FileType::Archive | FileType::Document | FileType::Unknown
        )
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text recovered from one file, ready for prompt injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFileContent {
    pub file_name: String,
    pub file_type: FileType,
    pub content: String,

    /// Size of the input in bytes.
    pub original_size: u64,

    /// Character count of the recovered text.
    ///
    /// For PDFs this is the length before truncation, so it can exceed
    /// `content.chars().count()`.
    pub extracted_size: usize,
}

/// A file whose extraction failed, with the human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFile {
    pub file_name: String,
    pub error: String,
}

/// Outcome of extracting one file. Exactly one is produced per input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success(ExtractedFileContent),
    Failure(FailedFile),
}

impl ExtractionOutcome {
    pub fn failure(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        ExtractionOutcome::Failure(FailedFile {
            file_name: file_name.into(),
            error: error.into(),
        })
    }

    pub fn file_name(&self) -> &str {
        match self {
            ExtractionOutcome::Success(content) => &content.file_name,
            ExtractionOutcome::Failure(failed) => &failed.file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }
}

/// Flat result shape for a single file: `{success, content?, error?}`.
///
/// Only constructible from an [`ExtractionOutcome`], so `success` is always true
/// exactly when `content` is present and `error` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileExtractionResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<ExtractedFileContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileExtractionResult {
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn content(&self) -> Option<&ExtractedFileContent> {
        self.content.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl From<ExtractionOutcome> for FileExtractionResult {
    fn from(outcome: ExtractionOutcome) -> Self {
        match outcome {
            ExtractionOutcome::Success(content) => Self {
                success: true,
                content: Some(content),
                error: None,
            },
            ExtractionOutcome::Failure(failed) => Self {
                success: false,
                content: None,
                error: Some(failed.error),
            },
        }
    }
}

/// Aggregate result of a batch. Both lists keep the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub successful: Vec<ExtractedFileContent>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successful.is_empty() && self.failed.is_empty()
    }
}

impl FromIterator<ExtractionOutcome> for BatchReport {
    fn from_iter<I: IntoIterator<Item = ExtractionOutcome>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for outcome in iter {
            match outcome {
                ExtractionOutcome::Success(content) => report.successful.push(content),
                ExtractionOutcome::Failure(failed) => report.failed.push(failed),
            }
        }
        report
    }
}

/// Per-file processing state.
///
/// The batch orchestrator reports `Processing`, `Completed` and `Failed`;
/// `Pending` is the implicit state of a file nobody has reported on yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}
