//! Built-in document extractors.
//!
//! This module contains the default extractors that ship with filegist.
//! All extractors implement the `DocumentExtractor` plugin trait.

use crate::plugins::{DocumentExtractor, Plugin};
use crate::plugins::registry::get_document_extractor_registry;
use crate::{FilegistError, Result};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub mod pdf;
pub mod text;
pub mod zip;

pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;
pub use zip::ZipExtractor;

/// Lazy-initialized flag that ensures extractors are registered exactly once.
static EXTRACTORS_INITIALIZED: Lazy<Result<()>> = Lazy::new(register_default_extractors);

/// Ensure built-in extractors are registered.
///
/// Called on every extraction. Any built-in missing from the registry, because
/// it was unregistered or the registry was cleared, is registered again.
/// Custom extractors are left in place.
pub fn ensure_initialized() -> Result<()> {
    EXTRACTORS_INITIALIZED
        .as_ref()
        .map(|_| ())
        .map_err(|e| FilegistError::Plugin {
            message: format!("Failed to register default extractors: {}", e),
            plugin_name: "built-in-extractors".to_string(),
        })?;

    let registry = get_document_extractor_registry();
    let registered = registry
        .read()
        .map_err(|e| FilegistError::LockPoisoned(format!("Document extractor registry lock poisoned: {}", e)))?
        .list();

    let missing: Vec<Arc<dyn DocumentExtractor>> = default_extractors()
        .into_iter()
        .filter(|extractor| !registered.iter().any(|name| name == extractor.name()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut registry = registry
        .write()
        .map_err(|e| FilegistError::LockPoisoned(format!("Document extractor registry lock poisoned: {}", e)))?;
    for extractor in missing {
        // Another caller may have restored it between the two locks.
        if registry.list().iter().any(|name| name == extractor.name()) {
            continue;
        }
        tracing::debug!(extractor = extractor.name(), "re-registering built-in extractor");
        registry.register(extractor)?;
    }

    Ok(())
}

fn default_extractors() -> Vec<Arc<dyn DocumentExtractor>> {
    vec![
        Arc::new(PlainTextExtractor::new()),
        Arc::new(PdfExtractor::new()),
        Arc::new(ZipExtractor::new()),
    ]
}

/// Register the text, PDF and ZIP extractors with the global registry.
///
/// Called automatically on first extraction; explicit calling is optional.
///
/// # Example
///
/// ```rust
/// use filegist::extractors::register_default_extractors;
///
/// # fn main() -> filegist::Result<()> {
/// register_default_extractors()?;
/// # Ok(())
/// # }
/// ```
pub fn register_default_extractors() -> Result<()> {
    let registry = get_document_extractor_registry();
    let mut registry = registry
        .write()
        .map_err(|e| FilegistError::LockPoisoned(format!("Document extractor registry lock poisoned: {}", e)))?;

    for extractor in default_extractors() {
        registry.register(extractor)?;
    }

    Ok(())
}
