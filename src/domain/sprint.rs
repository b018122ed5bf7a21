//! Sprint domain type
//!
//! A Sprint is an ordered group of tasks with a time estimate. Its status is
//! derived from its tasks on every read rather than stored, so it can never
//! drift out of sync with them.

use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus};

/// Derived sprint status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Pending,
    InProgress,
    Completed,
}

impl SprintStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Pending => "☐",
            Self::InProgress => "🔄",
            Self::Completed => "✅",
        }
    }
}

/// An ordered group of tasks (1-based id, id order = execution order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    /// 1-based sprint number
    pub id: u32,

    /// Sprint name from the header line (e.g. "FOUNDATION")
    pub name: String,

    /// Marker glyph from the header line
    pub emoji: String,

    /// Estimated duration in minutes
    pub estimated_minutes: u32,

    /// Tasks in execution order
    pub tasks: Vec<Task>,
}

impl Sprint {
    pub fn new(id: u32, name: impl Into<String>, emoji: impl Into<String>, estimated_minutes: u32) -> Self {
        Self {
            id,
            name: name.into(),
            emoji: emoji.into(),
            estimated_minutes,
            tasks: Vec::new(),
        }
    }

    /// Derived status: Completed iff every task is Completed or Skipped,
    /// InProgress once any task has left Pending, otherwise Pending.
    pub fn status(&self) -> SprintStatus {
        if !self.tasks.is_empty()
            && self
                .tasks
                .iter()
                .all(|t| matches!(t.status, TaskStatus::Completed | TaskStatus::Skipped))
        {
            return SprintStatus::Completed;
        }
        if self.tasks.iter().any(|t| t.status != TaskStatus::Pending) {
            return SprintStatus::InProgress;
        }
        SprintStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status() == SprintStatus::Completed
    }
}
