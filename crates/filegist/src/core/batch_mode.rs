//! Batch mode tracking using tokio task-local storage.
//!
//! The batch orchestrator runs each file inside [`with_batch_mode`]. CPU-bound
//! scanners (PDF, ZIP) check the flag through [`run_scan`]: inside a batch they
//! move to the blocking pool so files are scanned in parallel, outside a batch
//! they run inline and skip the copy and spawn.

use crate::{FilegistError, Result};
use std::cell::Cell;
use tokio::task_local;

task_local! {
    static BATCH_MODE: Cell<bool>;
}

/// Whether the current task runs inside [`with_batch_mode`].
pub fn is_batch_mode() -> bool {
    BATCH_MODE.try_with(|cell| cell.get()).unwrap_or(false)
}

/// Run a future with batch mode enabled.
pub async fn with_batch_mode<F, T>(future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    BATCH_MODE.scope(Cell::new(true), future).await
}

/// Run a synchronous scan over `content`.
///
/// In batch mode the content is copied and the scan runs on
/// `tokio::task::spawn_blocking`, carrying the current tracing span along.
/// Otherwise it runs on the calling task.
pub async fn run_scan<T, F>(label: &'static str, content: &[u8], scan: F) -> Result<T>
where
    F: FnOnce(&[u8]) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    if !is_batch_mode() {
        return scan(content);
    }

    let content_owned = content.to_vec();
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _guard = span.entered();
        scan(&content_owned)
    })
    .await
    .map_err(|e| FilegistError::Other(format!("{} scan task failed: {}", label, e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_mode_not_set_by_default() {
        assert!(!is_batch_mode());
    }

    #[tokio::test]
    async fn test_batch_mode_scoped_to_future() {
        let inside = with_batch_mode(async { is_batch_mode() }).await;
        assert!(inside);
        assert!(!is_batch_mode(), "flag must not leak out of the scope");
    }

    #[tokio::test]
    async fn test_nested_batch_mode_calls() {
        let (outer, inner) = with_batch_mode(async {
            let outer = is_batch_mode();
            let inner = with_batch_mode(async { is_batch_mode() }).await;
            (outer, inner)
        })
        .await;

        assert!(outer);
        assert!(inner);
    }

    #[tokio::test]
    async fn test_run_scan_inline() {
        let len = run_scan("test", b"abc", |bytes| Ok(bytes.len())).await.unwrap();
        assert_eq!(len, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_scan_in_batch_mode_uses_blocking_pool() {
        let caller = std::thread::current().id();
        let (len, scan_thread) = with_batch_mode(run_scan("test", b"abcd", |bytes| {
            Ok((bytes.len(), std::thread::current().id()))
        }))
        .await
        .unwrap();

        assert_eq!(len, 4);
        assert_ne!(scan_thread, caller);
    }

    #[tokio::test]
    async fn test_run_scan_propagates_errors() {
        let err = with_batch_mode(run_scan("test", b"", |_| -> Result<()> {
            Err(FilegistError::CorruptArchive("broken".to_string()))
        }))
        .await
        .unwrap_err();

        assert!(matches!(err, FilegistError::CorruptArchive(_)));
    }

    #[tokio::test]
    async fn test_run_scan_reports_panics() {
        let err = with_batch_mode(run_scan("pdf", b"", |_| -> Result<()> { panic!("scanner bug") }))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("pdf scan task failed"));
    }
}
