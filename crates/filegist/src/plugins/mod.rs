//! Plugin system for extending filegist.
//!
//! Extraction is dispatched through a registry of [`DocumentExtractor`] plugins
//! keyed by [`crate::FileType`]. The built-in text, PDF and ZIP extractors are
//! ordinary plugins; registering an extractor with a higher priority for the same
//! type replaces the built-in for every subsequent extraction.
//!
//! # Plugin Types
//!
//! - [`Plugin`] - Base trait that all plugins must implement
//! - [`DocumentExtractor`] - Format extraction plugins
//!
//! # Lifecycle Pattern
//!
//! Plugins are stored as `Arc<dyn DocumentExtractor>` and shared across batch
//! tasks. `initialize` runs on registration, `shutdown` on removal.
//!
//! ```rust
//! use filegist::plugins::{list_extractors, register_extractor, unregister_extractor};
//! use filegist::extractors::PlainTextExtractor;
//! use std::sync::Arc;
//!
//! # fn main() -> filegist::Result<()> {
//! register_extractor(Arc::new(PlainTextExtractor::new()))?;
//! assert!(list_extractors()?.contains(&"plain-text-extractor".to_string()));
//! # Ok(())
//! # }
//! ```

mod extractor;
pub mod registry;
mod traits;

pub use extractor::{
    DocumentExtractor, clear_extractors, get_extractor, list_extractors, register_extractor, unregister_extractor,
};
pub use traits::Plugin;
