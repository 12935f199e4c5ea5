//! Base plugin trait definition.
//!
//! Every extractor registered with filegist implements [`Plugin`], which carries
//! identification and lifecycle hooks.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// Plugins are shared as `Arc<dyn ...>` across batch tasks, so they must be
/// `Send + Sync`. Lifecycle hooks take `&self`; plugins with mutable state use
/// interior mutability.
///
/// # Example
///
/// ```rust
/// use filegist::plugins::Plugin;
/// use filegist::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct CsvSniffer {
///     ready: AtomicBool,
/// }
///
/// impl Plugin for CsvSniffer {
///     fn name(&self) -> &str {
///         "csv-sniffer"
///     }
///
///     fn version(&self) -> String {
///         "0.1.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.ready.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         self.ready.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique, lowercase, hyphenated identifier (e.g. `"pdf-extractor"`).
    ///
    /// Registering a second plugin with the same name replaces the first.
    fn name(&self) -> &str;

    /// Semantic version of the plugin.
    fn version(&self) -> String;

    /// Called once when the plugin is registered.
    ///
    /// # Errors
    ///
    /// A failing plugin is not registered.
    fn initialize(&self) -> Result<()>;

    /// Called when the plugin is unregistered or the registry is cleared.
    fn shutdown(&self) -> Result<()>;

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }
}
