//! Plan synchronization from ongoing narration
//!
//! As the model narrates execution, four independent pattern families report
//! task progress. They are applied in a fixed order and each is idempotent:
//! re-applying the same narration to an already-consistent plan changes
//! nothing (timestamps are stamped only on the first transition).
//!
//! Families:
//! 1. `✅ [SPRINT 1] [1.2] ...` — glyph + sprint bracket + task bracket
//! 2. `✅ [SPRINT 1] [2/5] [1.2] ...` — same, with a progress counter between
//! 3. `1.2 (completed)` / `(done)` / `(finished)` / `(✓)` in free text
//! 4. `Writing to index.html` — filename mentions complete matching tasks

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::domain::{Roadmap, TaskStatus};

use super::extract::status_from_glyph;

static STATUS_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(☐|⬜|🔄|✅)[ \t]*\[SPRINT[ \t]+(\d+)\][ \t]*\[(\d+\.\d+)\]").unwrap());

static STATUS_COUNTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(☐|⬜|🔄|✅)[ \t]*\[SPRINT[ \t]+(\d+)\][ \t]*\[\d+/\d+\][ \t]*\[(\d+\.\d+)\]").unwrap()
});

static COMPLETION_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.\d+)[ \t]*\((?:completed|done|finished|✓)\)").unwrap());

static WRITING_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)writing to[ \t]+[`'"]?([\w][\w.\-/]*)"#).unwrap());

/// Apply every status signal found in `text` to the plan, then refresh the
/// derived fields. Signals that reference unknown task ids are silently
/// ignored.
pub fn apply_narration(plan: &mut Roadmap, text: &str) {
    for caps in STATUS_LINE_RE.captures_iter(text) {
        apply_status(plan, &caps[3], status_from_glyph(&caps[1]));
    }

    for caps in STATUS_COUNTER_RE.captures_iter(text) {
        apply_status(plan, &caps[3], status_from_glyph(&caps[1]));
    }

    for caps in COMPLETION_PHRASE_RE.captures_iter(text) {
        apply_status(plan, &caps[1], TaskStatus::Completed);
    }

    let written: Vec<String> = WRITING_TO_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();
    if !written.is_empty() {
        complete_by_filenames(plan, &written);
    }

    plan.sync_derived();
}

fn apply_status(plan: &mut Roadmap, task_id: &str, status: TaskStatus) {
    match plan.find_task_mut(task_id) {
        Some(task) => {
            if task.status != status {
                debug!(%task_id, from = %task.status, to = %status, "apply_narration: status change");
            }
            task.set_status(status);
        }
        None => debug!(%task_id, "apply_narration: unknown task id, ignored"),
    }
}

/// Complete every Pending/InProgress task whose description mentions one of
/// the written filenames (with or without its extension, case-insensitive).
/// Known source of false positives, kept deliberately: a plan that says
/// "Create index.html" is considered done once `index.html` is written.
fn complete_by_filenames(plan: &mut Roadmap, filenames: &[String]) {
    for task in plan.tasks_mut() {
        if !matches!(task.status, TaskStatus::Pending | TaskStatus::InProgress) {
            continue;
        }
        let description = task.description.to_lowercase();
        for filename in filenames {
            if description_mentions(&description, filename) {
                debug!(task_id = %task.id, %filename, "apply_narration: completed by file mention");
                task.set_status(TaskStatus::Completed);
                if !task.files_created.contains(filename) {
                    task.files_created.push(filename.clone());
                }
                break;
            }
        }
    }
}

/// Case-insensitive match of a filename (or its stem) inside a lowercased
/// description.
pub(crate) fn description_mentions(description_lower: &str, filename: &str) -> bool {
    let name = filename.rsplit('/').next().unwrap_or(filename).to_lowercase();
    if description_lower.contains(&name) {
        return true;
    }
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => description_lower.contains(stem),
        _ => false,
    }
}
