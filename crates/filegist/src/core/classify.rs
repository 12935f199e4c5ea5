//! File type classification and extraction eligibility.
//!
//! Classification is purely name-based: the lowercased substring after the last
//! `.` is looked up in a fixed extension table. File content is never inspected
//! here; magic-byte sniffing only happens during upload validation.

use crate::core::config::ExtractionConfig;
use crate::types::FileType;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const XML_MIME_TYPE: &str = "application/xml";
pub const YAML_MIME_TYPE: &str = "application/x-yaml";
pub const TOML_MIME_TYPE: &str = "application/toml";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const ZIP_MIME_TYPE: &str = "application/zip";
pub const OCTET_STREAM_MIME_TYPE: &str = "application/octet-stream";

/// Extension to file type mapping.
static EXT_TO_FILE_TYPE: Lazy<HashMap<&'static str, FileType>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("txt", FileType::Text);
    m.insert("md", FileType::Markdown);
    m.insert("markdown", FileType::Markdown);
    m.insert("json", FileType::Json);
    m.insert("xml", FileType::Xml);
    m.insert("csv", FileType::Csv);
    m.insert("tsv", FileType::Tsv);
    m.insert("log", FileType::Log);
    m.insert("ini", FileType::Config);
    m.insert("conf", FileType::Config);
    m.insert("config", FileType::Config);
    m.insert("env", FileType::Env);
    m.insert("yml", FileType::Yaml);
    m.insert("yaml", FileType::Yaml);
    m.insert("toml", FileType::Toml);

    m.insert("js", FileType::Javascript);
    m.insert("jsx", FileType::Javascript);
    m.insert("ts", FileType::Typescript);
    m.insert("tsx", FileType::Typescript);
    m.insert("py", FileType::Python);
    m.insert("java", FileType::Java);
    m.insert("c", FileType::C);
    m.insert("h", FileType::C);
    m.insert("cpp", FileType::Cpp);
    m.insert("hpp", FileType::Cpp);
    m.insert("cs", FileType::Csharp);
    m.insert("php", FileType::Php);
    m.insert("rb", FileType::Ruby);
    m.insert("go", FileType::Go);
    m.insert("rs", FileType::Rust);
    m.insert("swift", FileType::Swift);
    m.insert("kt", FileType::Kotlin);
    m.insert("scala", FileType::Scala);
    m.insert("r", FileType::R);
    m.insert("sql", FileType::Sql);
    m.insert("sh", FileType::Shell);
    m.insert("bash", FileType::Shell);
    m.insert("zsh", FileType::Shell);
    m.insert("ps1", FileType::Powershell);

    m.insert("html", FileType::Html);
    m.insert("htm", FileType::Html);
    m.insert("css", FileType::Css);
    m.insert("scss", FileType::Scss);
    m.insert("sass", FileType::Sass);
    m.insert("less", FileType::Less);

    m.insert("pdf", FileType::Pdf);
    m.insert("zip", FileType::Zip);
    m.insert("tar", FileType::Archive);
    m.insert("gz", FileType::Archive);
    m.insert("rar", FileType::Archive);
    m.insert("7z", FileType::Archive);
    m.insert("doc", FileType::Document);
    m.insert("docx", FileType::Document);
    m.insert("rtf", FileType::Document);
    m.insert("odt", FileType::Document);

    m
});

/// Tags that are always eligible for extraction, whatever the file size.
static SUPPORTED_FILE_TYPES: Lazy<HashSet<FileType>> = Lazy::new(|| {
    FileType::ALL
        .into_iter()
        .filter(|file_type| file_type.is_text_like() || matches!(file_type, FileType::Pdf | FileType::Zip))
        .collect()
});

/// Lowercased extension of `name`: everything after the last `.`, or the whole
/// name when it has no dot.
pub fn extension_of(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.rfind('.') {
        Some(idx) => lower[idx + 1..].to_string(),
        None => lower,
    }
}

/// Classify a file by name.
///
/// # Example
///
/// ```rust
/// use filegist::core::classify::classify;
/// use filegist::FileType;
///
/// assert_eq!(classify("README.MD"), FileType::Markdown);
/// assert_eq!(classify("main.rs"), FileType::Rust);
/// assert_eq!(classify("Makefile"), FileType::Unknown);
/// ```
pub fn classify(name: &str) -> FileType {
    let ext = extension_of(name);
    EXT_TO_FILE_TYPE.get(ext.as_str()).copied().unwrap_or(FileType::Unknown)
}

/// Whether a file may enter extraction.
///
/// True when the tag is on the allow-list, OR when the file is smaller than
/// `config.supported_fallback_size`. The size branch admits any small file,
/// including tags the extractor cannot handle; those fail later with
/// an unsupported-type error.
pub fn is_supported(file_type: FileType, size: u64, config: &ExtractionConfig) -> bool {
    SUPPORTED_FILE_TYPES.contains(&file_type) || size < config.supported_fallback_size
}

/// Extensions recognised by [`classify`], sorted.
pub fn known_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<_> = EXT_TO_FILE_TYPE.keys().copied().collect();
    extensions.sort_unstable();
    extensions
}

impl FileType {
    /// Canonical MIME type for the tag.
    pub fn mime_type(self) -> &'static str {
        match self {
            FileType::Text | FileType::Log | FileType::Config | FileType::Env => PLAIN_TEXT_MIME_TYPE,
            FileType::Markdown => MARKDOWN_MIME_TYPE,
            FileType::Json => JSON_MIME_TYPE,
            FileType::Xml => XML_MIME_TYPE,
            FileType::Csv => "text/csv",
            FileType::Tsv => "text/tab-separated-values",
            FileType::Yaml => YAML_MIME_TYPE,
            FileType::Toml => TOML_MIME_TYPE,
            FileType::Javascript => "text/javascript",
            FileType::Typescript => "application/typescript",
            FileType::Python => "text/x-python",
            FileType::Java => "text/x-java-source",
            FileType::C => "text/x-c",
            FileType::Cpp => "text/x-c++src",
            FileType::Csharp => "text/x-csharp",
            FileType::Php => "application/x-php",
            FileType::Ruby => "text/x-ruby",
            FileType::Go => "text/x-go",
            FileType::Rust => "text/x-rust",
            FileType::Swift => "text/x-swift",
            FileType::Kotlin => "text/x-kotlin",
            FileType::Scala => "text/x-scala",
            FileType::R => "text/x-r",
            FileType::Sql => "application/sql",
            FileType::Shell => "application/x-sh",
            FileType::Powershell => "text/x-powershell",
            FileType::Html => HTML_MIME_TYPE,
            FileType::Css => "text/css",
            FileType::Scss => "text/x-scss",
            FileType::Sass => "text/x-sass",
            FileType::Less => "text/x-less",
            FileType::Pdf => PDF_MIME_TYPE,
            FileType::Zip => ZIP_MIME_TYPE,
            FileType::Archive | FileType::Document | FileType::Unknown => OCTET_STREAM_MIME_TYPE,
        }
    }
}
