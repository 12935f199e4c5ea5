//! Plugin registration and discovery.
//!
//! The document extractor registry maps each [`FileType`] to the extractors that
//! claim it, ordered by priority. A process-wide instance lives behind
//! [`get_document_extractor_registry`]; the built-in extractors are put there by
//! [`crate::extractors::ensure_initialized`].

use crate::plugins::DocumentExtractor;
use crate::types::FileType;
use crate::{FilegistError, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FilegistError::Validation {
            message: "Plugin name cannot be empty".to_string(),
            source: None,
        });
    }

    if name.contains(char::is_whitespace) {
        return Err(FilegistError::Validation {
            message: format!("Plugin name '{}' cannot contain whitespace", name),
            source: None,
        });
    }

    Ok(())
}

/// Priority-ordered extractors per file type.
pub struct DocumentExtractorRegistry {
    extractors: HashMap<FileType, BTreeMap<i32, Arc<dyn DocumentExtractor>>>,
    name_index: HashMap<String, Vec<(FileType, i32)>>,
}

impl DocumentExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            name_index: HashMap::new(),
        }
    }

    /// Register an extractor for every type it supports.
    ///
    /// An extractor already registered under the same name is removed first. Two
    /// extractors with equal priority for the same type cannot coexist; the newer
    /// one takes the slot.
    pub fn register(&mut self, extractor: Arc<dyn DocumentExtractor>) -> Result<()> {
        let name = extractor.name().to_string();
        let priority = extractor.priority();

        validate_plugin_name(&name)?;

        if self.name_index.contains_key(&name) {
            self.remove(&name)?;
        }

        extractor.initialize()?;

        let mut index_entries = Vec::new();

        for &file_type in extractor.supported_types() {
            self.extractors
                .entry(file_type)
                .or_default()
                .insert(priority, Arc::clone(&extractor));
            index_entries.push((file_type, priority));
        }

        tracing::debug!(extractor = %name, priority, types = index_entries.len(), "registered extractor");
        self.name_index.insert(name, index_entries);

        Ok(())
    }

    /// Highest-priority extractor registered for `file_type`.
    ///
    /// # Errors
    ///
    /// [`FilegistError::UnsupportedType`] when nothing handles the type.
    pub fn get(&self, file_type: FileType) -> Result<Arc<dyn DocumentExtractor>> {
        self.extractors
            .get(&file_type)
            .and_then(|priority_map| priority_map.values().next_back())
            .cloned()
            .ok_or_else(|| FilegistError::UnsupportedType(file_type.to_string()))
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_index.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        let index_entries = match self.name_index.remove(name) {
            Some(entries) => entries,
            None => return Ok(()),
        };

        let mut extractor_to_shutdown: Option<Arc<dyn DocumentExtractor>> = None;

        for (file_type, priority) in index_entries {
            if let Some(priority_map) = self.extractors.get_mut(&file_type) {
                // The slot may have been taken over by another extractor since.
                if priority_map.get(&priority).is_some_and(|current| current.name() == name)
                    && let Some(extractor) = priority_map.remove(&priority)
                    && extractor_to_shutdown.is_none()
                {
                    extractor_to_shutdown = Some(extractor);
                }

                if priority_map.is_empty() {
                    self.extractors.remove(&file_type);
                }
            }
        }

        if let Some(extractor) = extractor_to_shutdown {
            extractor.shutdown()?;
        }

        Ok(())
    }

    pub fn shutdown_all(&mut self) -> Result<()> {
        let names = self.list();
        for name in names {
            self.remove(&name)?;
        }
        Ok(())
    }
}

impl Default for DocumentExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global document extractor registry singleton.
pub static DOCUMENT_EXTRACTOR_REGISTRY: Lazy<Arc<RwLock<DocumentExtractorRegistry>>> =
    Lazy::new(|| Arc::new(RwLock::new(DocumentExtractorRegistry::new())));

/// Get the global document extractor registry.
pub fn get_document_extractor_registry() -> Arc<RwLock<DocumentExtractorRegistry>> {
    DOCUMENT_EXTRACTOR_REGISTRY.clone()
}
