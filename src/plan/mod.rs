//! Plan tracking: extraction, narration sync, progress, projection
//!
//! - [`extract`] - free-form planning text → structured roadmap
//! - [`update`] - narration text → task status refresh
//! - [`tracker`] - the owning surface the orchestrator talks to
//! - [`render`] - the ROADMAP.md checklist projection

pub mod extract;
pub mod render;
pub mod tracker;
pub mod update;

pub use extract::{detect, extract};
pub use render::{ROADMAP_FILENAME, to_markdown, write_checklist};
pub use tracker::{PlanTracker, requires_plan};
pub use update::apply_narration;
