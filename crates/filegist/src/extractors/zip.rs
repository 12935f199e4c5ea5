//! ZIP archive extractor plugin.

use crate::Result;
use crate::core::batch_mode::run_scan;
use crate::core::config::ExtractionConfig;
use crate::extraction::zip::extract_zip;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedFileContent, FileType};
use async_trait::async_trait;

/// ZIP archive extractor.
///
/// Produces a listing of the archive with previews of small stored text entries.
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ZipExtractor {
    fn name(&self) -> &str {
        "zip-extractor"
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
        "Lists ZIP archive members and previews stored text files"
    }
}

#[async_trait]
impl DocumentExtractor for ZipExtractor {
    #[tracing::instrument(skip(self, content, config), fields(extractor.name = self.name(), content.size_bytes = content.len()))]
    async fn extract_bytes(
        &self,
        file_name: &str,
        content: &[u8],
        _file_type: FileType,
        config: &ExtractionConfig,
    ) -> Result<ExtractedFileContent> {
        let zip_config = config.zip.clone();
        let file_name = file_name.to_string();

        run_scan("zip", content, move |bytes| extract_zip(&file_name, bytes, &zip_config)).await
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Zip]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilegistError;
    use std::io::{Cursor, Write};

    fn create_test_zip() -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        zip.start_file("todo.md", options).unwrap();
        zip.write_all(b"- ship the release").unwrap();

        zip.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_zip_extractor() {
        let bytes = create_test_zip();
        let result = ZipExtractor::new()
            .extract_bytes("tasks.zip", &bytes, FileType::Zip, &ExtractionConfig::default())
            .await
            .unwrap();

        assert_eq!(result.file_type, FileType::Zip);
        assert!(result.content.contains("ZIP Archive: tasks.zip"));
        assert!(result.content.contains("- ship the release"));
    }

    #[tokio::test]
    async fn test_zip_extractor_corrupt() {
        let err = ZipExtractor::new()
            .extract_bytes("broken.zip", b"not a zip", FileType::Zip, &ExtractionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FilegistError::CorruptArchive(_)));
    }

    #[test]
    fn test_plugin_interface() {
        let extractor = ZipExtractor::new();
        assert_eq!(extractor.name(), "zip-extractor");
        assert_eq!(extractor.supported_types(), &[FileType::Zip]);
    }
}
