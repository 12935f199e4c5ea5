//! PDF extractor plugin.

use crate::Result;
use crate::core::batch_mode::run_scan;
use crate::core::config::ExtractionConfig;
use crate::extraction::pdf::extract_pdf;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedFileContent, FileType};
use async_trait::async_trait;

/// Heuristic PDF text extractor.
///
/// See [`crate::extraction::pdf`] for what it can and cannot recover.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PdfExtractor {
    fn name(&self) -> &str {
        "pdf-extractor"
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
        "Scrapes text operators from uncompressed PDF content streams"
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    #[tracing::instrument(skip(self, content, config), fields(extractor.name = self.name(), content.size_bytes = content.len()))]
    async fn extract_bytes(
        &self,
        file_name: &str,
        content: &[u8],
        _file_type: FileType,
        config: &ExtractionConfig,
    ) -> Result<ExtractedFileContent> {
        let pdf_config = config.pdf.clone();
        let file_name = file_name.to_string();

        run_scan("pdf", content, move |bytes| extract_pdf(&file_name, bytes, &pdf_config)).await
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Pdf]
    }
}
