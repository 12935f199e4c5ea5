//! Plain text extractor.

use crate::core::config::ExtractionConfig;
use crate::core::io::FileSource;
use crate::extraction::text::{extract_text, text_content};
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedFileContent, FileType};
use crate::{FilegistError, Result};
use async_trait::async_trait;

/// Every text-like tag. Files classified `unknown` have no extractor, even
/// when the size fallback makes them eligible.
const TEXT_FILE_TYPES: &[FileType] = &[
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
];

/// Plain text extractor.
///
/// Returns the decoded content verbatim, without truncation.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain-text-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Returns text, code, config and markup files verbatim"
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_bytes(
        &self,
        file_name: &str,
        content: &[u8],
        file_type: FileType,
        _config: &ExtractionConfig,
    ) -> Result<ExtractedFileContent> {
        Ok(extract_text(file_name, content, file_type))
    }

    async fn extract_source(
        &self,
        source: &dyn FileSource,
        file_type: FileType,
        _config: &ExtractionConfig,
    ) -> Result<ExtractedFileContent> {
        let text = source
            .text()
            .await
            .map_err(|e| FilegistError::read_with_source(e.to_string(), e))?;

        Ok(text_content(source.name(), file_type, source.size(), text))
    }

    fn supported_types(&self) -> &[FileType] {
        TEXT_FILE_TYPES
    }
}
