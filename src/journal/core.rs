//! MutationJournal - capture-before-mutate and undo-last-N
//!
//! The orchestrator calls `capture` before any tool mutates files, and
//! `undo` on an explicit rollback request. Undo restores byte-for-byte
//! prior content (or deletes files that did not previously exist), applies
//! the undone window oldest-first so repeated mutations of one file land on
//! the earliest captured state, and never restores an entry outside the
//! exact working directory it was captured under.

use eyre::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::entry::{FileState, HistoryItem, JournalEntry, UndoReport};
use super::store::EntryStore;

/// Structured journal failures. These stay internal to the undo path:
/// scope violations are aggregated into the report, never raised.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Path {path} escapes working directory {working_dir}")]
    ScopeViolation { path: PathBuf, working_dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Public journal surface, built on [`EntryStore`]
#[derive(Debug)]
pub struct MutationJournal {
    store: EntryStore,
}

impl MutationJournal {
    /// Open a journal rooted at `dir` with a fixed history capacity
    pub fn open(dir: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        Ok(Self {
            store: EntryStore::open(dir, capacity)?,
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Snapshot the current state of `file_paths` before a mutating
    /// operation. A missing or unreadable file is recorded as absence, not
    /// an error. Returns the new entry's id.
    ///
    /// Snapshots hold text content: a file that cannot be read as UTF-8
    /// (e.g. a binary artifact) is also recorded as absence, so undoing
    /// past its capture deletes it rather than restoring its bytes. Callers
    /// mutating binary files should not rely on the journal to restore
    /// them.
    pub fn capture(
        &mut self,
        operation: &str,
        description: &str,
        file_paths: &[String],
        working_dir: &Path,
    ) -> Result<String> {
        let mut files = Vec::with_capacity(file_paths.len());
        for raw in file_paths {
            let path = Path::new(raw);
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                working_dir.join(path)
            };
            // Stored relative to the working directory where possible
            let rel = match path.strip_prefix(working_dir) {
                Ok(stripped) => stripped.to_string_lossy().into_owned(),
                Err(_) => raw.clone(),
            };
            match fs::read_to_string(&absolute) {
                Ok(content) => files.push(FileState::present(rel, content)),
                Err(e) => {
                    debug!(path = %absolute.display(), error = %e, "capture: recording absence");
                    files.push(FileState::absent(rel));
                }
            }
        }

        let entry = JournalEntry::new(operation, description, working_dir.to_path_buf(), files);
        let id = entry.id.clone();
        info!(%id, %operation, files = file_paths.len(), "capture: snapshot taken");
        self.store.push(entry)?;
        Ok(id)
    }

    /// Undo the `count` most recent captured operations for `working_dir`.
    ///
    /// Entries captured under a different working directory are skipped and
    /// reported in aggregate. Per-file failures are logged and skipped
    /// without aborting the batch, so a partial restore still reports
    /// success; callers needing all-or-nothing check `files_restored`.
    pub fn undo(&mut self, count: usize, working_dir: &Path) -> UndoReport {
        if self.store.is_empty() {
            return UndoReport::failure("No journal history to undo");
        }
        if count == 0 {
            return UndoReport::failure("Nothing to undo (count was 0)");
        }
        if count > self.store.len() {
            return UndoReport::failure(format!(
                "Cannot undo {} operations; only {} in history",
                count,
                self.store.len()
            ));
        }

        let selected: Vec<JournalEntry> = self.store.recent(count).to_vec();
        let mut entries_skipped = 0;
        let mut in_scope = Vec::new();
        for entry in selected {
            if entry.working_dir == working_dir {
                in_scope.push(entry);
            } else {
                warn!(
                    id = %entry.id,
                    entry_dir = %entry.working_dir.display(),
                    caller_dir = %working_dir.display(),
                    "undo: skipping entry from different working directory"
                );
                entries_skipped += 1;
            }
        }

        // Newest entry first, so the oldest entry's capture is written last
        // and a file mutated twice within the window ends at the state
        // before the earliest mutation, not an intermediate one
        let mut files_restored = Vec::new();
        let mut restored_ids = Vec::new();
        for entry in &in_scope {
            for file in &entry.files {
                if restore_file(entry, file) && !files_restored.contains(&file.path) {
                    files_restored.push(file.path.clone());
                }
            }
            restored_ids.push(entry.id.clone());
        }

        self.store.remove(&restored_ids);

        let mut message = format!(
            "Restored {} file(s) from {} operation(s)",
            files_restored.len(),
            restored_ids.len()
        );
        if entries_skipped > 0 {
            message.push_str(&format!(
                " ({} entries skipped: captured under a different directory)",
                entries_skipped
            ));
        }
        info!(%message, "undo: finished");

        UndoReport {
            success: true,
            message,
            files_restored,
            entries_skipped,
        }
    }

    /// Read-only history, most-recent-first
    pub fn history(&self) -> Vec<HistoryItem> {
        self.store.entries().iter().map(JournalEntry::summary).collect()
    }

    /// Delete the entire history; returns how many entries were removed
    pub fn clear_all(&mut self) -> usize {
        self.store.clear()
    }
}

/// Restore one captured file state. Returns true when the file was written
/// or deleted (or was already absent); failures are logged and skipped.
fn restore_file(entry: &JournalEntry, file: &FileState) -> bool {
    // Resolve against the entry's own working directory, then re-validate
    let target = match resolve_in_scope(&entry.working_dir, &file.path) {
        Ok(path) => path,
        Err(e) => {
            warn!(entry_id = %entry.id, error = %e, "restore_file: rejected");
            return false;
        }
    };

    if file.existed {
        let Some(content) = file.content.as_deref() else {
            // Violates the capture invariant; treat as unrestorable
            warn!(entry_id = %entry.id, path = %file.path, "restore_file: existed without content");
            return false;
        };
        if let Some(parent) = target.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(path = %target.display(), error = %e, "restore_file: mkdir failed");
            return false;
        }
        match fs::write(&target, content) {
            Ok(()) => {
                debug!(path = %target.display(), "restore_file: content restored");
                true
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "restore_file: write failed");
                false
            }
        }
    } else {
        // The file did not exist before the mutation; already-absent is success
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "restore_file: file deleted");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!(path = %target.display(), error = %e, "restore_file: delete failed");
                false
            }
        }
    }
}

/// Resolve `rel` against `working_dir` and verify the result stays inside
/// it. `..` segments are folded lexically before the prefix check so stored
/// traversal paths cannot escape, and existing paths are canonicalized to
/// defeat symlink tricks.
fn resolve_in_scope(working_dir: &Path, rel: &str) -> Result<PathBuf, JournalError> {
    let raw = Path::new(rel);
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        working_dir.join(raw)
    };
    let normalized = normalize_lexically(&joined);

    let canonical_base = working_dir.canonicalize().unwrap_or_else(|_| working_dir.to_path_buf());
    let canonical = if normalized.exists() {
        normalized.canonicalize().unwrap_or_else(|_| normalized.clone())
    } else {
        normalized.clone()
    };

    if canonical.starts_with(working_dir) || canonical.starts_with(&canonical_base) {
        Ok(normalized)
    } else {
        Err(JournalError::ScopeViolation {
            path: raw.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
        })
    }
}

/// Fold `.` and `..` components without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
