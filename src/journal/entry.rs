//! Journal entry types
//!
//! A JournalEntry is an immutable snapshot of one or more files' prior
//! state, captured before a mutating tool call. `FileState.content` is
//! `None` exactly when the file did not exist — absence is a state of its
//! own, distinct from an empty file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::now_ms;

/// Captured prior state of a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileState {
    /// Path relative to the entry's working directory
    pub path: String,
    /// Prior content; `None` iff the file did not exist
    pub content: Option<String>,
    /// Whether the file existed at capture time
    pub existed: bool,
}

impl FileState {
    pub fn present(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
            existed: true,
        }
    }

    pub fn absent(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
            existed: false,
        }
    }
}

/// One captured mutating operation; never modified after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// UUIDv7 - lexicographic order is chronological order
    pub id: String,

    /// Capture timestamp (Unix milliseconds)
    pub timestamp: i64,

    /// Free-form operation tag ("write", "edit", "bash", ...)
    pub operation: String,

    /// Human-readable description of the mutation
    pub description: String,

    /// Absolute working directory the capture was scoped to
    pub working_dir: PathBuf,

    /// Prior state of every file the operation was about to touch
    pub files: Vec<FileState>,
}

impl JournalEntry {
    pub fn new(
        operation: impl Into<String>,
        description: impl Into<String>,
        working_dir: PathBuf,
        files: Vec<FileState>,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            timestamp: now_ms(),
            operation: operation.into(),
            description: description.into(),
            working_dir,
            files,
        }
    }

    /// Read-only summary for history listings
    pub fn summary(&self) -> HistoryItem {
        HistoryItem {
            id: self.id.clone(),
            timestamp: self.timestamp,
            operation: self.operation.clone(),
            description: self.description.clone(),
            file_count: self.files.len(),
        }
    }
}

/// Display summary of one journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: i64,
    pub operation: String,
    pub description: String,
    pub file_count: usize,
}

/// Outcome of an undo request
#[derive(Debug, Clone)]
pub struct UndoReport {
    /// False only when the request could not start (no history, count too large)
    pub success: bool,
    /// Human-readable outcome, including any skipped-entry accounting
    pub message: String,
    /// Relative paths actually restored or deleted
    pub files_restored: Vec<String>,
    /// Entries skipped by the directory-scope check
    pub entries_skipped: usize,
}

impl UndoReport {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            files_restored: Vec::new(),
            entries_skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_invariant() {
        let absent = FileState::absent("a.txt");
        assert!(!absent.existed);
        assert!(absent.content.is_none());

        let present = FileState::present("a.txt", "");
        assert!(present.existed);
        assert_eq!(present.content.as_deref(), Some(""));
    }

    #[test]
    fn test_entry_ids_sort_chronologically() {
        let first = JournalEntry::new("write", "one", PathBuf::from("/p"), vec![]);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = JournalEntry::new("write", "two", PathBuf::from("/p"), vec![]);
        assert!(first.id < second.id);
    }

    #[test]
    fn test_summary_fields() {
        let entry = JournalEntry::new(
            "edit",
            "tweak config",
            PathBuf::from("/p"),
            vec![FileState::absent("a.txt"), FileState::present("b.txt", "x")],
        );
        let summary = entry.summary();
        assert_eq!(summary.id, entry.id);
        assert_eq!(summary.operation, "edit");
        assert_eq!(summary.file_count, 2);
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let entry = JournalEntry::new("bash", "ran a script", PathBuf::from("/p"), vec![FileState::absent("out.log")]);
        let json = serde_json::to_string(&entry).unwrap();
        let back: JournalEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, entry.id);
        assert_eq!(back.working_dir, PathBuf::from("/p"));
        assert!(!back.files[0].existed);
    }
}
