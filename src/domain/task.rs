//! Task domain type
//!
//! A Task is the smallest unit of planned work, identified as
//! `<sprintId>.<index>` (e.g. "1.2"). Status moves forward only; Failed and
//! Skipped are terminal but can be retracted by an explicit re-start.

use serde::{Deserialize, Serialize};

use super::now_ms;

/// Task status in the roadmap workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,
    /// Currently being worked on
    InProgress,
    /// Finished successfully
    Completed,
    /// Deliberately skipped (counts toward sprint completion)
    Skipped,
    /// Errored out
    Failed,
}

impl TaskStatus {
    /// Glyph used in checklists and narration (☐ pending, 🔄 in progress,
    /// ✅ completed, ⏭️ skipped, ❌ failed)
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Pending => "☐",
            Self::InProgress => "🔄",
            Self::Completed => "✅",
            Self::Skipped => "⏭️",
            Self::Failed => "❌",
        }
    }

    /// Whether this status ends the task's life (absent explicit re-start)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One unit of planned work within a sprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Identifier in the format `<sprintId>.<index>` (e.g. "2.3")
    pub id: String,

    /// Owning sprint's 1-based id
    pub sprint_id: u32,

    /// Free-form description from the planning text
    pub description: String,

    /// Current status
    pub status: TaskStatus,

    /// When the task first entered InProgress (Unix milliseconds)
    pub started_at: Option<i64>,

    /// When the task first entered Completed (Unix milliseconds)
    pub completed_at: Option<i64>,

    /// Files recorded as created while completing this task
    #[serde(default)]
    pub files_created: Vec<String>,

    /// Files recorded as modified while completing this task
    #[serde(default)]
    pub files_modified: Vec<String>,

    /// Errors accumulated across failures
    #[serde(default)]
    pub errors: Vec<String>,

    /// Optional free-form note (e.g. skip reason)
    pub notes: Option<String>,
}

impl Task {
    /// Create a new task with the given id, owning sprint, and description
    pub fn new(id: impl Into<String>, sprint_id: u32, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sprint_id,
            description: description.into(),
            status: TaskStatus::Pending,
            started_at: None,
            completed_at: None,
            files_created: Vec::new(),
            files_modified: Vec::new(),
            errors: Vec::new(),
            notes: None,
        }
    }

    /// Apply a status observed in narration text.
    ///
    /// Timestamps are stamped the first time a task enters InProgress or
    /// Completed, which makes re-applying the same narration a no-op.
    pub fn set_status(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::InProgress => {
                if self.started_at.is_none() {
                    self.started_at = Some(now_ms());
                }
            }
            TaskStatus::Completed => {
                if self.completed_at.is_none() {
                    self.completed_at = Some(now_ms());
                }
            }
            _ => {}
        }
        self.status = status;
    }

    /// Explicit re-start: allowed from any status, including Failed/Skipped
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(now_ms());
        }
        self.status = TaskStatus::InProgress;
    }

    /// Mark completed and attach any recorded file paths
    pub fn complete(&mut self, files_created: Vec<String>, files_modified: Vec<String>) {
        self.set_status(TaskStatus::Completed);
        for file in files_created {
            if !self.files_created.contains(&file) {
                self.files_created.push(file);
            }
        }
        for file in files_modified {
            if !self.files_modified.contains(&file) {
                self.files_modified.push(file);
            }
        }
    }

    /// Mark failed, recording the error
    pub fn fail(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.status = TaskStatus::Failed;
    }

    /// Mark skipped, with an optional reason
    pub fn skip(&mut self, reason: Option<String>) {
        if reason.is_some() {
            self.notes = reason;
        }
        self.status = TaskStatus::Skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_is_pending() {
        let task = Task::new("1.1", 1, "Create index.html");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.started_at.is_none());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_set_status_stamps_once() {
        let mut task = Task::new("1.1", 1, "Create index.html");
        task.set_status(TaskStatus::InProgress);
        let first = task.started_at;
        assert!(first.is_some());

        std::thread::sleep(std::time::Duration::from_millis(2));
        task.set_status(TaskStatus::InProgress);
        assert_eq!(task.started_at, first);
    }

    #[test]
    fn test_complete_attaches_files_without_duplicates() {
        let mut task = Task::new("1.1", 1, "Create index.html");
        task.complete(vec!["index.html".to_string()], vec![]);
        task.complete(vec!["index.html".to_string()], vec!["style.css".to_string()]);

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.files_created, vec!["index.html"]);
        assert_eq!(task.files_modified, vec!["style.css"]);
    }

    #[test]
    fn test_fail_records_error_and_allows_restart() {
        let mut task = Task::new("1.1", 1, "Create index.html");
        task.fail("disk full");
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.errors, vec!["disk full"]);

        task.start();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Skipped.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_task_serde_roundtrip() {
        let mut task = Task::new("2.3", 2, "Add login endpoint");
        task.set_status(TaskStatus::InProgress);
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "2.3");
        assert_eq!(back.status, TaskStatus::InProgress);
        assert_eq!(back.started_at, task.started_at);
    }
}
