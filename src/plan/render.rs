//! ROADMAP.md projection
//!
//! Serializes a roadmap to a human-readable checklist inside the working
//! directory. The file is a projection for the user's benefit, not a source
//! of truth; the tracker's session file is authoritative.

use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::Roadmap;

/// Fixed filename of the checklist projection
pub const ROADMAP_FILENAME: &str = "ROADMAP.md";

/// Render the roadmap as a markdown checklist
pub fn to_markdown(plan: &Roadmap) -> String {
    let mut out = String::new();

    out.push_str(&format!("# 📋 PROJECT ROADMAP: {}\n\n", plan.project_name));
    out.push_str(&format!("**Type:** {}\n", plan.project_type));
    out.push_str(&format!("**Status:** {}\n", plan.status));
    if !plan.original_request.is_empty() {
        out.push_str(&format!("**Request:** {}\n", plan.original_request));
    }
    out.push('\n');

    for sprint in &plan.sprints {
        out.push_str(&format!(
            "## {} {} SPRINT {}: {} (Estimated: ~{} min)\n\n",
            sprint.status().glyph(),
            sprint.emoji,
            sprint.id,
            sprint.name,
            sprint.estimated_minutes,
        ));
        for task in &sprint.tasks {
            out.push_str(&format!("- {} {} {}\n", task.status.glyph(), task.id, task.description));
            if !task.files_created.is_empty() {
                out.push_str(&format!("  - created: {}\n", task.files_created.join(", ")));
            }
            if !task.files_modified.is_empty() {
                out.push_str(&format!("  - modified: {}\n", task.files_modified.join(", ")));
            }
        }
        out.push('\n');
    }

    let progress = plan.calculate_progress();
    out.push_str(&format!(
        "---\n**Progress:** {}/{} tasks ({}%), {}/{} sprints — ~{} min remaining\n",
        progress.completed_tasks,
        progress.total_tasks,
        progress.percent_complete,
        progress.completed_sprints,
        progress.total_sprints,
        progress.estimated_remaining_minutes,
    ));

    out
}

/// Write the checklist projection into `working_dir`, returning its path
pub fn write_checklist(plan: &Roadmap, working_dir: &Path) -> Result<PathBuf> {
    let path = working_dir.join(ROADMAP_FILENAME);
    fs::write(&path, to_markdown(plan)).context(format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "write_checklist: written");
    Ok(path)
}
