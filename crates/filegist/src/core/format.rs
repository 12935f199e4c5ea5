//! Rendering extracted content for inclusion in a model prompt.

use crate::types::{BatchReport, ExtractedFileContent};
use std::fmt::Write;

/// Render one file as a prompt block.
///
/// ```text
/// File: notes.md (markdown)
/// Size: 1234 bytes
/// ---
/// <content>
/// ```
pub fn format_content_for_prompt(content: &ExtractedFileContent) -> String {
    format!(
        "File: {} ({})\nSize: {} bytes\n---\n{}",
        content.file_name, content.file_type, content.original_size, content.content
    )
}

/// Render every successful file, separated by blank lines, followed by a list of
/// the files that could not be read.
pub fn format_batch_for_prompt(report: &BatchReport) -> String {
    let mut out = report
        .successful
        .iter()
        .map(format_content_for_prompt)
        .collect::<Vec<_>>()
        .join("\n\n");

    if !report.failed.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str("Files that could not be read:");
        for failed in &report.failed {
            let _ = write!(out, "\n- {}: {}", failed.file_name, failed.error);
        }
    }

    out
}
