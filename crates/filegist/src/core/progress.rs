//! Per-file progress reporting.
//!
//! The batch orchestrator reports every state change through a [`ProgressCallback`].
//! [`FileProcessingTracker`] is a ready-made sink that records those events in an
//! insertion-ordered table, so a UI can poll it instead of wiring its own callback.

use crate::types::ProcessingStatus;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Called with the file name, its new status and, for failures, the error message.
pub type ProgressCallback = Arc<dyn Fn(&str, ProcessingStatus, Option<&str>) + Send + Sync>;

/// Recorded state of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileProcessingState {
    pub status: ProcessingStatus,
    /// Percentage, when the producer knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Thread-safe table of file name to processing state.
///
/// Cloning is cheap and clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct FileProcessingTracker {
    states: Arc<RwLock<IndexMap<String, FileProcessingState>>>,
}

impl FileProcessingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new status for `file_name`.
    ///
    /// The error is kept only for [`ProcessingStatus::Failed`]; progress resets to
    /// 100 on completion and is otherwise left untouched.
    pub fn set_status(&self, file_name: &str, status: ProcessingStatus, error: Option<&str>) {
        let mut states = self.states.write();
        let state = states.entry(file_name.to_string()).or_default();

        state.status = status;
        state.error = match status {
            ProcessingStatus::Failed => error.map(str::to_string),
            _ => None,
        };
        if status == ProcessingStatus::Completed {
            state.progress = Some(100);
        }
    }

    /// Record a progress percentage, clamped to 100.
    pub fn set_progress(&self, file_name: &str, progress: u8) {
        let mut states = self.states.write();
        states.entry(file_name.to_string()).or_default().progress = Some(progress.min(100));
    }

    /// Current status, [`ProcessingStatus::Pending`] for files never seen.
    pub fn get_status(&self, file_name: &str) -> ProcessingStatus {
        self.states
            .read()
            .get(file_name)
            .map(|state| state.status)
            .unwrap_or_default()
    }

    pub fn get(&self, file_name: &str) -> Option<FileProcessingState> {
        self.states.read().get(file_name).cloned()
    }

    pub fn remove(&self, file_name: &str) -> Option<FileProcessingState> {
        self.states.write().shift_remove(file_name)
    }

    pub fn clear(&self) {
        self.states.write().clear();
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }

    /// Copy of the table in first-seen order.
    pub fn snapshot(&self) -> Vec<(String, FileProcessingState)> {
        self.states
            .read()
            .iter()
            .map(|(name, state)| (name.clone(), state.clone()))
            .collect()
    }

    /// A callback that feeds orchestrator events into this tracker.
    pub fn progress_callback(&self) -> ProgressCallback {
        let tracker = self.clone();
        Arc::new(move |file_name, status, error| tracker.set_status(file_name, status, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_file_is_pending() {
        let tracker = FileProcessingTracker::new();
        assert_eq!(tracker.get_status("nothing.txt"), ProcessingStatus::Pending);
        assert!(tracker.get("nothing.txt").is_none());
    }

    #[test]
    fn test_status_transitions() {
        let tracker = FileProcessingTracker::new();

        tracker.set_status("a.txt", ProcessingStatus::Processing, None);
        assert_eq!(tracker.get_status("a.txt"), ProcessingStatus::Processing);

        tracker.set_status("a.txt", ProcessingStatus::Completed, None);
        let state = tracker.get("a.txt").unwrap();
        assert_eq!(state.status, ProcessingStatus::Completed);
        assert_eq!(state.progress, Some(100));
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_error_only_kept_for_failures() {
        let tracker = FileProcessingTracker::new();

        tracker.set_status("b.pdf", ProcessingStatus::Processing, Some("ignored"));
        assert_eq!(tracker.get("b.pdf").unwrap().error, None);

        tracker.set_status("b.pdf", ProcessingStatus::Failed, Some("Invalid PDF: no header"));
        assert_eq!(tracker.get("b.pdf").unwrap().error.as_deref(), Some("Invalid PDF: no header"));
    }

    #[test]
    fn test_snapshot_keeps_insertion_order() {
        let tracker = FileProcessingTracker::new();
        for name in ["z.txt", "a.txt", "m.txt"] {
            tracker.set_status(name, ProcessingStatus::Processing, None);
        }
        tracker.set_status("z.txt", ProcessingStatus::Completed, None);

        let names: Vec<String> = tracker.snapshot().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z.txt", "a.txt", "m.txt"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let tracker = FileProcessingTracker::new();
        tracker.set_status("a", ProcessingStatus::Completed, None);
        tracker.set_status("b", ProcessingStatus::Completed, None);

        assert!(tracker.remove("a").is_some());
        assert!(tracker.remove("a").is_none());
        assert_eq!(tracker.len(), 1);

        tracker.clear();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_progress_is_clamped() {
        let tracker = FileProcessingTracker::new();
        tracker.set_progress("big.zip", 250);
        assert_eq!(tracker.get("big.zip").unwrap().progress, Some(100));
    }

    #[test]
    fn test_progress_callback_feeds_tracker() {
        let tracker = FileProcessingTracker::new();
        let callback = tracker.progress_callback();

        callback("c.md", ProcessingStatus::Processing, None);
        callback("c.md", ProcessingStatus::Failed, Some("boom"));

        let state = tracker.get("c.md").unwrap();
        assert_eq!(state.status, ProcessingStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }
}
