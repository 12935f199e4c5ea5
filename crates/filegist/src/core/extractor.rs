//! Main extraction entry points.
//!
//! # Functions
//!
//! - [`extract`] - Extract one file, returning a typed error on failure
//! - [`extract_file_content`] - Extract one file into the flat `{success, content?, error?}` shape
//! - [`extract_multiple_files`] - Extract many files concurrently with progress reporting
//! - [`extract_paths`] - Open and extract files from disk, one result per path
//!
//! Each has a `*_sync` counterpart that runs on a shared global runtime.

use crate::core::batch_mode::with_batch_mode;
use crate::core::classify::{classify, is_supported};
use crate::core::config::ExtractionConfig;
use crate::core::io::{FileSource, display_name, open_all};
use crate::core::progress::ProgressCallback;
use crate::plugins::DocumentExtractor;
use crate::types::{BatchReport, ExtractedFileContent, ExtractionOutcome, FileExtractionResult, ProcessingStatus};
use crate::{FilegistError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Message recorded for files outside the extraction allow-list.
pub const INELIGIBLE_FILE_MESSAGE: &str = "File type not supported for content extraction";

/// Global Tokio runtime for the synchronous wrappers.
///
/// Runtime creation only fails when the process is out of threads or memory, in
/// which case nothing else would work either.
static GLOBAL_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create global Tokio runtime - system may be out of resources")
});

fn get_extractor(file_type: crate::types::FileType) -> Result<Arc<dyn DocumentExtractor>> {
    crate::extractors::ensure_initialized()?;
    crate::plugins::get_extractor(file_type)
}

/// Io errors from a file handle are reported as read failures of that file.
fn into_read_failure(error: FilegistError) -> FilegistError {
    match error {
        FilegistError::Io(io) => FilegistError::read_with_source(io.to_string(), io),
        other => other,
    }
}

/// Extract the content of a single file.
///
/// The file is classified by name and handed to the highest-priority extractor
/// registered for its type. Unlike [`extract_multiple_files`] this does not apply
/// the eligibility check.
///
/// # Errors
///
/// - [`FilegistError::UnsupportedType`] for `unknown`, `archive` and `document` files
/// - [`FilegistError::Read`] when the handle cannot be read
/// - the extractor's own error otherwise (`InvalidPdf`, `CorruptArchive`, ...)
///
/// # Example
///
/// ```rust
/// use filegist::core::extractor::extract;
/// use filegist::{ExtractionConfig, InMemoryFile};
///
/// # async fn example() -> filegist::Result<()> {
/// let file = InMemoryFile::new("notes.md", b"# Shopping list".to_vec());
/// let content = extract(&file, &ExtractionConfig::default()).await?;
/// assert_eq!(content.content, "# Shopping list");
/// # Ok(())
/// # }
/// ```
pub async fn extract(file: &dyn FileSource, config: &ExtractionConfig) -> Result<ExtractedFileContent> {
    let file_type = classify(file.name());
    let extractor = get_extractor(file_type)?;

    tracing::debug!(
        file = file.name(),
        file_type = %file_type,
        extractor = extractor.name(),
        size = file.size(),
        "extracting file"
    );

    extractor
        .extract_source(file, file_type, config)
        .await
        .map_err(into_read_failure)
}

/// Extract a single file. Never fails: errors are folded into the result.
pub async fn extract_file_content(file: &dyn FileSource, config: &ExtractionConfig) -> FileExtractionResult {
    outcome_of(file, extract(file, config).await).into()
}

fn outcome_of(file: &dyn FileSource, result: Result<ExtractedFileContent>) -> ExtractionOutcome {
    match result {
        Ok(content) => ExtractionOutcome::Success(content),
        Err(e) => {
            tracing::warn!(file = file.name(), error = %e, kind = e.kind(), "extraction failed");
            ExtractionOutcome::failure(file.name(), e.to_string())
        }
    }
}

fn notify(progress: Option<&ProgressCallback>, file_name: &str, status: ProcessingStatus, error: Option<&str>) {
    if let Some(callback) = progress {
        callback(file_name, status, error);
    }
}

async fn process_file(
    file: Arc<dyn FileSource>,
    config: Arc<ExtractionConfig>,
    semaphore: Option<Arc<Semaphore>>,
    progress: Option<ProgressCallback>,
) -> ExtractionOutcome {
    let _permit = match semaphore {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(e) => return ExtractionOutcome::failure(file.name(), format!("Extraction queue closed: {}", e)),
        },
        None => None,
    };

    let name = file.name();
    notify(progress.as_ref(), name, ProcessingStatus::Processing, None);

    let outcome = if is_supported(classify(name), file.size(), &config) {
        let result = with_batch_mode(extract(file.as_ref(), &config)).await;
        outcome_of(file.as_ref(), result)
    } else {
        tracing::debug!(file = name, size = file.size(), "skipping ineligible file");
        ExtractionOutcome::failure(name, INELIGIBLE_FILE_MESSAGE)
    };

    match &outcome {
        ExtractionOutcome::Success(_) => notify(progress.as_ref(), name, ProcessingStatus::Completed, None),
        ExtractionOutcome::Failure(failed) => {
            notify(progress.as_ref(), name, ProcessingStatus::Failed, Some(&failed.error))
        }
    }

    outcome
}

/// Extract many files concurrently.
///
/// Every file gets its own task, spawned up front. When
/// `config.max_concurrent_extractions` is set, a semaphore caps how many run at
/// once; otherwise all run together. Files outside the eligibility rule fail with
/// [`INELIGIBLE_FILE_MESSAGE`] without being read.
///
/// `progress` is called with `processing` when a file starts and with
/// `completed` or `failed` when it settles. Calls for different files interleave.
///
/// One file's failure, or a panic inside its extractor, only affects that file.
/// Both report lists keep the input order.
#[tracing::instrument(skip(files, config, progress), fields(batch.size = files.len()))]
pub async fn extract_multiple_files(
    files: Vec<Arc<dyn FileSource>>,
    config: &ExtractionConfig,
    progress: Option<ProgressCallback>,
) -> BatchReport {
    let outcomes = run_batch(files, config, progress).await;
    finish_report(outcomes)
}

/// Open and extract files from disk.
///
/// Behaves like [`extract_multiple_files`] over [`DiskFile`] handles, except that
/// a path which cannot be opened (missing, a directory, unreadable metadata) is
/// reported as a failure for that path, with its own `processing` and `failed`
/// progress events, while the remaining paths are still extracted.
#[tracing::instrument(skip(paths, config, progress), fields(batch.size = paths.len()))]
pub async fn extract_paths(
    paths: &[PathBuf],
    config: &ExtractionConfig,
    progress: Option<ProgressCallback>,
) -> BatchReport {
    let mut files: Vec<Arc<dyn FileSource>> = Vec::with_capacity(paths.len());
    let mut unopened: Vec<Option<ExtractionOutcome>> = Vec::with_capacity(paths.len());

    for (path, opened) in paths.iter().zip(open_all(paths).await) {
        match opened {
            Ok(file) => {
                files.push(Arc::new(file));
                unopened.push(None);
            }
            Err(e) => {
                let name = display_name(path);
                let message = into_read_failure(e).to_string();
                tracing::warn!(path = %path.display(), error = %message, "could not open file");
                notify(progress.as_ref(), &name, ProcessingStatus::Processing, None);
                notify(progress.as_ref(), &name, ProcessingStatus::Failed, Some(&message));
                unopened.push(Some(ExtractionOutcome::failure(name, message)));
            }
        }
    }

    let mut extracted = run_batch(files, config, progress).await.into_iter();
    let outcomes = unopened
        .into_iter()
        .filter_map(|slot| slot.or_else(|| extracted.next()))
        .collect();

    finish_report(outcomes)
}

fn finish_report(outcomes: Vec<ExtractionOutcome>) -> BatchReport {
    let succeeded = outcomes.iter().filter(|outcome| outcome.is_success()).count();
    tracing::debug!(
        successful = succeeded,
        failed = outcomes.len() - succeeded,
        "batch extraction finished"
    );

    outcomes.into_iter().collect()
}

/// One outcome per file, in input order.
async fn run_batch(
    files: Vec<Arc<dyn FileSource>>,
    config: &ExtractionConfig,
    progress: Option<ProgressCallback>,
) -> Vec<ExtractionOutcome> {
    if files.is_empty() {
        return Vec::new();
    }

    let config = Arc::new(config.clone());
    let semaphore = config
        .max_concurrent_extractions
        .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

    let names: Vec<String> = files.iter().map(|file| file.name().to_string()).collect();
    let mut slots: Vec<Option<ExtractionOutcome>> = vec![None; files.len()];
    let mut task_index = HashMap::with_capacity(files.len());
    let mut tasks = JoinSet::new();

    for (index, file) in files.into_iter().enumerate() {
        let task = process_file(file, Arc::clone(&config), semaphore.clone(), progress.clone());
        let handle = tasks.spawn(async move { (index, task.await) });
        task_index.insert(handle.id(), index);
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                slots[index] = Some(outcome);
            }
            Err(join_err) => {
                let Some(&index) = task_index.get(&join_err.id()) else {
                    continue;
                };
                let name = &names[index];
                let message = format!("Extraction task failed: {}", join_err);
                tracing::warn!(file = %name, error = %message, "extraction task panicked");
                notify(progress.as_ref(), name, ProcessingStatus::Failed, Some(&message));
                slots[index] = Some(ExtractionOutcome::failure(name.clone(), message));
            }
        }
    }

    slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| slot.unwrap_or_else(|| ExtractionOutcome::failure(name, "Extraction task did not complete")))
        .collect()
}

/// Synchronous wrapper for [`extract`].
pub fn extract_sync(file: &dyn FileSource, config: &ExtractionConfig) -> Result<ExtractedFileContent> {
    GLOBAL_RUNTIME.block_on(extract(file, config))
}

/// Synchronous wrapper for [`extract_file_content`].
pub fn extract_file_content_sync(file: &dyn FileSource, config: &ExtractionConfig) -> FileExtractionResult {
    GLOBAL_RUNTIME.block_on(extract_file_content(file, config))
}

/// Synchronous wrapper for [`extract_multiple_files`].
pub fn extract_multiple_files_sync(
    files: Vec<Arc<dyn FileSource>>,
    config: &ExtractionConfig,
    progress: Option<ProgressCallback>,
) -> BatchReport {
    GLOBAL_RUNTIME.block_on(extract_multiple_files(files, config, progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::{DiskFile, InMemoryFile};
    use crate::types::FileType;
    use parking_lot::Mutex;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn memory(name: &str, data: &[u8]) -> Arc<dyn FileSource> {
        Arc::new(InMemoryFile::new(name, data.to_vec()))
    }

    #[tokio::test]
    async fn test_extract_text_file() {
        let file = InMemoryFile::new("hello.txt", b"hello world".to_vec());
        let content = extract(&file, &ExtractionConfig::default()).await.unwrap();

        assert_eq!(content.file_type, FileType::Text);
        assert_eq!(content.content, "hello world");
        assert_eq!(content.extracted_size, 11);
    }

    #[tokio::test]
    async fn test_extract_disk_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("main.rs");
        File::create(&file_path).unwrap().write_all(b"fn main() {}").unwrap();

        let file = DiskFile::open(&file_path).await.unwrap();
        let content = extract(&file, &ExtractionConfig::default()).await.unwrap();

        assert_eq!(content.file_name, "main.rs");
        assert_eq!(content.file_type, FileType::Rust);
        assert_eq!(content.content, "fn main() {}");
    }

    #[tokio::test]
    async fn test_extract_archive_is_unsupported() {
        let file = InMemoryFile::new("backup.tar", b"ustar".to_vec());
        let err = extract(&file, &ExtractionConfig::default()).await.unwrap_err();

        assert!(matches!(err, FilegistError::UnsupportedType(_)));
        assert_eq!(err.to_string(), "File type 'archive' is not supported for content extraction");
    }

    #[tokio::test]
    async fn test_extract_file_content_failure_shape() {
        let file = InMemoryFile::new("scan.pdf", b"not a pdf".to_vec());
        let result = extract_file_content(&file, &ExtractionConfig::default()).await;

        assert!(!result.success());
        assert!(result.content().is_none());
        assert!(result.error().unwrap().starts_with("Invalid PDF"));
    }

    #[tokio::test]
    async fn test_extract_file_content_success_shape() {
        let file = InMemoryFile::new("data.json", br#"{"a": 1}"#.to_vec());
        let result = extract_file_content(&file, &ExtractionConfig::default()).await;

        assert!(result.success());
        assert!(result.error().is_none());
        assert_eq!(result.content().unwrap().file_type, FileType::Json);
    }

    #[tokio::test]
    async fn test_io_error_becomes_read_failure() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("gone.md");
        File::create(&file_path).unwrap().write_all(b"soon deleted").unwrap();

        let file = DiskFile::open(&file_path).await.unwrap();
        std::fs::remove_file(&file_path).unwrap();

        let err = extract(&file, &ExtractionConfig::default()).await.unwrap_err();
        assert!(matches!(err, FilegistError::Read { .. }));
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let report = extract_multiple_files(vec![], &ExtractionConfig::default(), None).await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let files = vec![
            memory("c.txt", b"third"),
            memory("a.pdf", b"broken"),
            memory("b.md", b"second"),
            memory("d.zip", b"also broken"),
            memory("a.txt", b"first"),
        ];

        let report = extract_multiple_files(files, &ExtractionConfig::default(), None).await;

        let ok: Vec<&str> = report.successful.iter().map(|c| c.file_name.as_str()).collect();
        let failed: Vec<&str> = report.failed.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(ok, vec!["c.txt", "b.md", "a.txt"]);
        assert_eq!(failed, vec!["a.pdf", "d.zip"]);
    }

    #[tokio::test]
    async fn test_batch_ineligible_file() {
        let config = ExtractionConfig {
            supported_fallback_size: 4,
            ..Default::default()
        };
        let files = vec![memory("movie.mp4", b"0123456789")];

        let report = extract_multiple_files(files, &config, None).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].error, INELIGIBLE_FILE_MESSAGE);
    }

    #[tokio::test]
    async fn test_batch_progress_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |name, status, error| {
            sink.lock().push((name.to_string(), status, error.map(str::to_string)));
        });

        let files = vec![memory("ok.txt", b"fine"), memory("bad.pdf", b"nope")];
        extract_multiple_files(files, &ExtractionConfig::default(), Some(callback)).await;

        let events = events.lock();
        assert_eq!(events.len(), 4);
        for name in ["ok.txt", "bad.pdf"] {
            let per_file: Vec<_> = events.iter().filter(|(n, _, _)| n == name).collect();
            assert_eq!(per_file.len(), 2);
            assert_eq!(per_file[0].1, ProcessingStatus::Processing);
        }

        let ok_final = events.iter().rfind(|(n, _, _)| n == "ok.txt").unwrap();
        assert_eq!(ok_final.1, ProcessingStatus::Completed);
        let bad_final = events.iter().rfind(|(n, _, _)| n == "bad.pdf").unwrap();
        assert_eq!(bad_final.1, ProcessingStatus::Failed);
        assert!(bad_final.2.as_deref().unwrap().starts_with("Invalid PDF"));
    }

    #[tokio::test]
    async fn test_batch_with_concurrency_limit() {
        let config = ExtractionConfig {
            max_concurrent_extractions: Some(1),
            ..Default::default()
        };
        let files: Vec<Arc<dyn FileSource>> = (0..10)
            .map(|i| memory(&format!("file{}.txt", i), format!("content {}", i).as_bytes()))
            .collect();

        let report = extract_multiple_files(files, &config, None).await;

        assert_eq!(report.successful.len(), 10);
        for (i, content) in report.successful.iter().enumerate() {
            assert_eq!(content.content, format!("content {}", i));
        }
    }

    #[tokio::test]
    async fn test_extract_paths_isolates_open_failures() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let last = dir.path().join("c.pdf");
        std::fs::write(&first, b"alpha").unwrap();
        std::fs::write(&last, b"not a pdf").unwrap();
        let subdir = dir.path().join("nested");
        std::fs::create_dir(&subdir).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |name, status, _error| {
            sink.lock().push((name.to_string(), status));
        });

        let paths = vec![first, dir.path().join("missing.txt"), subdir, last];
        let report = extract_paths(&paths, &ExtractionConfig::default(), Some(callback)).await;

        assert_eq!(report.len(), 4);
        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.successful[0].content, "alpha");

        let failed: Vec<&str> = report.failed.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(failed, vec!["missing.txt", "nested", "c.pdf"]);
        assert!(report.failed[0].error.starts_with("Failed to read text content"));
        assert!(report.failed[1].error.contains("not a regular file"));
        assert!(report.failed[2].error.starts_with("Invalid PDF"));

        let events = events.lock();
        let missing: Vec<ProcessingStatus> = events
            .iter()
            .filter(|(name, _)| name == "missing.txt")
            .map(|(_, status)| *status)
            .collect();
        assert_eq!(missing, vec![ProcessingStatus::Processing, ProcessingStatus::Failed]);
        assert_eq!(events.len(), 8);
    }

    #[tokio::test]
    async fn test_extract_paths_empty() {
        let report = extract_paths(&[], &ExtractionConfig::default(), None).await;
        assert!(report.is_empty());
    }

    #[test]
    fn test_sync_wrappers() {
        let config = ExtractionConfig::default();
        let file = InMemoryFile::new("sync.txt", b"sync test".to_vec());

        assert_eq!(extract_sync(&file, &config).unwrap().content, "sync test");
        assert!(extract_file_content_sync(&file, &config).success());

        let report = extract_multiple_files_sync(vec![memory("x.log", b"line")], &config, None);
        assert_eq!(report.successful.len(), 1);
    }
}
