//! PlanJournal - plan tracking and mutation journaling for autonomous
//! coding loops
//!
//! An orchestrator driving a language model needs two guarantees this crate
//! provides: a structured view of the model's own free-form plan narration,
//! and the ability to undo destructive file mutations.
//!
//! # Core Concepts
//!
//! - **Plans from narration**: the sprint/task graph is extracted from the
//!   model's planning text and kept in sync as further narration streams in
//! - **Derived completion**: sprint and plan status are computed from task
//!   statuses, never stored independently
//! - **Capture before mutate**: every mutating tool call snapshots prior
//!   file state first; undo restores byte-for-byte (or deletes files that
//!   did not exist)
//! - **Directory scoping**: an undo issued for one project root can never
//!   touch files captured under another
//!
//! # Modules
//!
//! - [`domain`] - Task, Sprint, Roadmap data model
//! - [`plan`] - extraction, narration sync, tracker, checklist projection
//! - [`journal`] - mutation capture and undo
//! - [`config`] - configuration types and loading

pub mod config;
pub mod domain;
pub mod journal;
pub mod plan;

// Re-export commonly used types
pub use config::{Config, JournalConfig};
pub use domain::{
    ProgressReport, ProjectType, Roadmap, RoadmapStatus, Sprint, SprintStatus, Task, TaskStatus, now_ms,
};
pub use journal::{FileState, HistoryItem, JournalEntry, JournalError, MutationJournal, UndoReport};
pub use plan::{PlanTracker, apply_narration, detect, extract, requires_plan, to_markdown, write_checklist};
