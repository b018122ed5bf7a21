//! Domain types shared by the plan tracker and the mutation journal
//!
//! Core types: Task, Sprint, Roadmap. Sprint and roadmap completion are
//! derived from task statuses, never stored independently.

mod roadmap;
mod sprint;
mod task;

pub use roadmap::{ProgressReport, ProjectType, Roadmap, RoadmapStatus, generate_id};
pub use sprint::{Sprint, SprintStatus};
pub use task::{Task, TaskStatus};

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
