//! Document extractor plugin trait.
//!
//! Extractors turn the bytes of one file into an [`ExtractedFileContent`]. They
//! are registered per [`FileType`]; when several extractors claim the same type,
//! the one with the highest priority wins.

use crate::core::config::ExtractionConfig;
use crate::core::io::FileSource;
use crate::plugins::Plugin;
use crate::plugins::registry::get_document_extractor_registry;
use crate::types::{ExtractedFileContent, FileType};
use crate::{FilegistError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for format-specific extractors.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use filegist::plugins::{DocumentExtractor, Plugin};
/// use filegist::{ExtractedFileContent, ExtractionConfig, FileType, Result};
///
/// struct ShoutingCsv;
///
/// impl Plugin for ShoutingCsv {
///     fn name(&self) -> &str { "shouting-csv" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// #[async_trait]
/// impl DocumentExtractor for ShoutingCsv {
///     async fn extract_bytes(
///         &self,
///         file_name: &str,
///         content: &[u8],
///         file_type: FileType,
///         _config: &ExtractionConfig,
///     ) -> Result<ExtractedFileContent> {
///         let text = String::from_utf8_lossy(content).to_uppercase();
///         Ok(ExtractedFileContent {
///             file_name: file_name.to_string(),
///             file_type,
///             extracted_size: text.chars().count(),
///             content: text,
///             original_size: content.len() as u64,
///         })
///     }
///
///     fn supported_types(&self) -> &[FileType] {
///         &[FileType::Csv]
///     }
///
///     fn priority(&self) -> i32 {
///         100
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentExtractor: Plugin {
    /// Extract content from an in-memory buffer.
    async fn extract_bytes(
        &self,
        file_name: &str,
        content: &[u8],
        file_type: FileType,
        config: &ExtractionConfig,
    ) -> Result<ExtractedFileContent>;

    /// Extract content from a file handle.
    ///
    /// The default reads the full content and delegates to
    /// [`extract_bytes`](Self::extract_bytes).
    async fn extract_source(
        &self,
        source: &dyn FileSource,
        file_type: FileType,
        config: &ExtractionConfig,
    ) -> Result<ExtractedFileContent> {
        let bytes = source.bytes().await?;
        self.extract_bytes(source.name(), &bytes, file_type, config).await
    }

    /// File types this extractor handles.
    fn supported_types(&self) -> &[FileType];

    /// Selection priority, higher wins. Built-in extractors use 50.
    fn priority(&self) -> i32 {
        50
    }
}

fn lock_poisoned(e: impl std::fmt::Display) -> FilegistError {
    FilegistError::LockPoisoned(format!("Document extractor registry lock poisoned: {}", e))
}

/// Register an extractor with the global registry.
pub fn register_extractor(extractor: Arc<dyn DocumentExtractor>) -> Result<()> {
    let registry = get_document_extractor_registry();
    let mut registry = registry.write().map_err(lock_poisoned)?;

    registry.register(extractor)
}

/// Remove an extractor from the global registry by name. Unknown names are ignored.
///
/// Built-in extractors are registered again on the next extraction, so removing
/// one only has a lasting effect while a custom extractor covers its types.
pub fn unregister_extractor(name: &str) -> Result<()> {
    let registry = get_document_extractor_registry();
    let mut registry = registry.write().map_err(lock_poisoned)?;

    registry.remove(name)
}

/// Names of all registered extractors.
pub fn list_extractors() -> Result<Vec<String>> {
    let registry = get_document_extractor_registry();
    let registry = registry.read().map_err(lock_poisoned)?;

    Ok(registry.list())
}

/// Shut down and remove every registered extractor.
///
/// The built-in extractors come back on the next extraction, see
/// [`crate::extractors::ensure_initialized`].
pub fn clear_extractors() -> Result<()> {
    let registry = get_document_extractor_registry();
    let mut registry = registry.write().map_err(lock_poisoned)?;

    registry.shutdown_all()
}

/// Highest-priority extractor for `file_type`.
pub fn get_extractor(file_type: FileType) -> Result<Arc<dyn DocumentExtractor>> {
    let registry = get_document_extractor_registry();
    let registry = registry.read().map_err(lock_poisoned)?;

    registry.get(file_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::InMemoryFile;
    use serial_test::serial;

    struct MockExtractor {
        types: Vec<FileType>,
        priority: i32,
    }

    impl Plugin for MockExtractor {
        fn name(&self) -> &str {
            "mock-extractor"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentExtractor for MockExtractor {
        async fn extract_bytes(
            &self,
            file_name: &str,
            content: &[u8],
            file_type: FileType,
            _config: &ExtractionConfig,
        ) -> Result<ExtractedFileContent> {
            let text = format!("mock:{}", String::from_utf8_lossy(content));
            Ok(ExtractedFileContent {
                file_name: file_name.to_string(),
                file_type,
                extracted_size: text.chars().count(),
                content: text,
                original_size: content.len() as u64,
            })
        }

        fn supported_types(&self) -> &[FileType] {
            &self.types
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    #[tokio::test]
    async fn test_extract_source_default_reads_bytes() {
        let extractor = MockExtractor {
            types: vec![FileType::Sql],
            priority: 50,
        };
        let file = InMemoryFile::new("schema.sql", b"select 1".to_vec());

        let result = extractor
            .extract_source(&file, FileType::Sql, &ExtractionConfig::default())
            .await
            .unwrap();

        assert_eq!(result.file_name, "schema.sql");
        assert_eq!(result.content, "mock:select 1");
        assert_eq!(result.original_size, 8);
    }

    #[test]
    fn test_default_priority() {
        struct Plain;

        impl Plugin for Plain {
            fn name(&self) -> &str {
                "plain"
            }
            fn version(&self) -> String {
                "1.0.0".to_string()
            }
            fn initialize(&self) -> Result<()> {
                Ok(())
            }
            fn shutdown(&self) -> Result<()> {
                Ok(())
            }
        }

        #[async_trait]
        impl DocumentExtractor for Plain {
            async fn extract_bytes(
                &self,
                _file_name: &str,
                _content: &[u8],
                _file_type: FileType,
                _config: &ExtractionConfig,
            ) -> Result<ExtractedFileContent> {
                Err(FilegistError::Other("unused".to_string()))
            }

            fn supported_types(&self) -> &[FileType] {
                &[FileType::Text]
            }
        }

        assert_eq!(Plain.priority(), 50);
    }

    #[test]
    #[serial]
    fn test_register_and_unregister_extractor() {
        let extractor = Arc::new(MockExtractor {
            types: vec![FileType::Scala],
            priority: 90,
        });
        register_extractor(extractor).unwrap();

        assert!(list_extractors().unwrap().contains(&"mock-extractor".to_string()));
        assert_eq!(get_extractor(FileType::Scala).unwrap().name(), "mock-extractor");

        unregister_extractor("mock-extractor").unwrap();
        assert!(!list_extractors().unwrap().contains(&"mock-extractor".to_string()));
    }

    #[test]
    #[serial]
    fn test_unregister_unknown_is_ok() {
        assert!(unregister_extractor("never-registered").is_ok());
    }
}
