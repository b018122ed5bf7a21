//! PlanTracker - owns the live roadmap and its lifecycle
//!
//! The orchestrator feeds every model turn through `observe`, drives explicit
//! transitions via the task methods, and checks `should_continue` to decide
//! whether autonomous execution keeps going. The tracker can persist its
//! roadmap across process restarts via `save_session`/`load_session`.

use eyre::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::{ProgressReport, Roadmap, Task, TaskStatus};

use super::extract;
use super::update;

/// Files never considered by auto-complete-by-filename: projections and
/// test-runner artifacts whose names would otherwise match task text.
const AUTO_COMPLETE_DENYLIST: &[&str] = &[
    "ROADMAP.md",
    "TEST_REPORT.md",
    "test_report.md",
    "test_results.html",
    "test_runner.html",
    "run_tests.sh",
];

/// Multi-step work markers for the `requires_plan` gate
const PLAN_KEYWORDS: &[&str] = &[
    "create app",
    "create an app",
    "build app",
    "build an app",
    "full-stack",
    "full stack",
    "entire project",
    "whole project",
    "complete project",
    "from scratch",
    "refactor entire",
    "multi-step",
    "build a website",
    "create a website",
];

/// Owns the live plan; composes the extractor and updater
#[derive(Debug, Default)]
pub struct PlanTracker {
    plan: Option<Roadmap>,
}

impl PlanTracker {
    pub fn new() -> Self {
        Self { plan: None }
    }

    /// True iff the text contains a plan declaration marker
    pub fn detect(text: &str) -> bool {
        extract::detect(text)
    }

    /// Feed one turn of narration through the tracker.
    ///
    /// A declaration for a *different* project name replaces the current
    /// plan; a re-declaration of the same project, or plain narration, is
    /// routed through the updater. Returns true when a new plan was adopted.
    pub fn observe(&mut self, text: &str, original_request: &str) -> bool {
        if let Some(new_plan) = extract::extract(text, original_request) {
            let replaces = match &self.plan {
                Some(current) => current.project_name != new_plan.project_name,
                None => true,
            };
            if replaces {
                info!(
                    project = %new_plan.project_name,
                    tasks = new_plan.total_tasks,
                    "observe: adopting new plan"
                );
                self.plan = Some(new_plan);
                return true;
            }
        }

        if let Some(plan) = self.plan.as_mut() {
            update::apply_narration(plan, text);
        }
        false
    }

    pub fn plan(&self) -> Option<&Roadmap> {
        self.plan.as_ref()
    }

    pub fn plan_mut(&mut self) -> Option<&mut Roadmap> {
        self.plan.as_mut()
    }

    /// Drop the current plan (explicit consumer reset)
    pub fn clear(&mut self) {
        if self.plan.take().is_some() {
            info!("clear: plan dropped");
        }
    }

    /// Progress summary, if a plan is loaded
    pub fn progress(&self) -> Option<ProgressReport> {
        self.plan.as_ref().map(Roadmap::calculate_progress)
    }

    /// First InProgress task, else first Pending task, in sprint order
    pub fn current_task(&self) -> Option<&Task> {
        self.plan.as_ref().and_then(Roadmap::current_task)
    }

    /// Whether the orchestrator should keep driving execution autonomously:
    /// a plan is loaded and it has not reached 100%.
    pub fn should_continue(&self) -> bool {
        self.progress().is_some_and(|p| !p.is_complete())
    }

    /// Start a task (also retracts Failed/Skipped). Returns false when the
    /// id matches no task.
    pub fn start_task(&mut self, task_id: &str) -> bool {
        self.with_task(task_id, |task| task.start())
    }

    /// Complete a task, attaching any recorded file paths
    pub fn complete_task(&mut self, task_id: &str, files_created: Vec<String>, files_modified: Vec<String>) -> bool {
        self.with_task(task_id, |task| task.complete(files_created, files_modified))
    }

    /// Fail a task, recording the error
    pub fn fail_task(&mut self, task_id: &str, error: impl Into<String>) -> bool {
        self.with_task(task_id, |task| task.fail(error))
    }

    /// Skip a task, with an optional reason
    pub fn skip_task(&mut self, task_id: &str, reason: Option<String>) -> bool {
        self.with_task(task_id, |task| task.skip(reason))
    }

    fn with_task(&mut self, task_id: &str, apply: impl FnOnce(&mut Task)) -> bool {
        let Some(plan) = self.plan.as_mut() else {
            debug!(%task_id, "with_task: no plan loaded");
            return false;
        };
        let found = match plan.find_task_mut(task_id) {
            Some(task) => {
                apply(task);
                true
            }
            None => {
                debug!(%task_id, "with_task: task not found");
                false
            }
        };
        plan.sync_derived();
        found
    }

    /// Best-effort sweep: complete tasks whose descriptions mention a
    /// non-empty file present in `working_dir`. I/O failures are logged and
    /// swallowed; this must never abort the caller's control flow. Returns
    /// the number of tasks completed.
    pub fn auto_complete_by_files<F>(&mut self, working_dir: &Path, list_dir: F) -> usize
    where
        F: Fn(&Path) -> io::Result<Vec<PathBuf>>,
    {
        let Some(plan) = self.plan.as_mut() else {
            return 0;
        };

        let entries = match list_dir(working_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %working_dir.display(), error = %e, "auto_complete: listing failed");
                return 0;
            }
        };

        // Non-empty files only, denylist excluded
        let mut filenames = Vec::new();
        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if AUTO_COMPLETE_DENYLIST.iter().any(|d| d.eq_ignore_ascii_case(name)) {
                continue;
            }
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() && meta.len() > 0 => filenames.push(name.to_string()),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "auto_complete: stat failed"),
            }
        }

        let mut completed = 0;
        for task in plan.tasks_mut() {
            if matches!(task.status, TaskStatus::Completed | TaskStatus::Skipped) {
                continue;
            }
            let description = task.description.to_lowercase();
            if let Some(filename) = filenames.iter().find(|f| update::description_mentions(&description, f)) {
                debug!(task_id = %task.id, %filename, "auto_complete: completed by file match");
                task.set_status(TaskStatus::Completed);
                if !task.files_created.contains(filename) {
                    task.files_created.push(filename.clone());
                }
                completed += 1;
            }
        }

        plan.sync_derived();
        completed
    }

    /// Convenience wrapper over `auto_complete_by_files` using the real
    /// filesystem listing.
    pub fn auto_complete(&mut self, working_dir: &Path) -> usize {
        self.auto_complete_by_files(working_dir, fs_list_dir)
    }

    /// Persist the current plan (or its absence) as JSON
    pub fn save_session(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.plan).context("Failed to serialize plan session")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json).context(format!("Failed to write session to {}", path.display()))?;
        debug!(path = %path.display(), "save_session: written");
        Ok(())
    }

    /// Restore a tracker from a saved session file
    pub fn load_session(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).context(format!("Failed to read session from {}", path.display()))?;
        let plan: Option<Roadmap> = serde_json::from_str(&content).context("Failed to parse plan session")?;
        if let Some(plan) = &plan {
            info!(project = %plan.project_name, "load_session: plan restored");
        }
        Ok(Self { plan })
    }
}

/// Shallow directory listing used by `auto_complete`
fn fs_list_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        paths.push(entry?.path());
    }
    Ok(paths)
}

/// Heuristic gate: does this request describe multi-step work that deserves
/// a plan? True on any known keyword, or on two or more conjunction/comma
/// separators suggesting multiple requirements.
pub fn requires_plan(request: &str) -> bool {
    let lower = request.to_lowercase();
    if PLAN_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    let separators = lower.matches(" and ").count() + lower.matches(',').count() + lower.matches(" then ").count();
    separators >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEMO: &str = "\
📋 PROJECT ROADMAP: Demo
🏗️ SPRINT 1: FOUNDATION (Estimated: ~10 min)
☐ 1.1 Create index.html
☐ 1.2 Create style.css
";

    fn tracker_with_plan() -> PlanTracker {
        let mut tracker = PlanTracker::new();
        assert!(tracker.observe(DEMO, "make a demo"));
        tracker
    }

    #[test]
    fn test_observe_adopts_and_updates() {
        let mut tracker = tracker_with_plan();
        assert_eq!(tracker.current_task().unwrap().id, "1.1");

        // Narration without a marker routes through the updater
        assert!(!tracker.observe("✅ [SPRINT 1] [1.1] done", "make a demo"));
        assert_eq!(tracker.current_task().unwrap().id, "1.2");
    }

    #[test]
    fn test_observe_replaces_on_different_project_name() {
        let mut tracker = tracker_with_plan();
        tracker.start_task("1.1");

        let other = DEMO.replace("Demo", "Other");
        assert!(tracker.observe(&other, "something else"));
        assert_eq!(tracker.plan().unwrap().project_name, "Other");
        assert_eq!(tracker.current_task().unwrap().id, "1.1");
    }

    #[test]
    fn test_observe_same_project_does_not_replace() {
        let mut tracker = tracker_with_plan();
        tracker.complete_task("1.1", vec![], vec![]);

        // The model repeats the roadmap verbatim; progress must survive
        assert!(!tracker.observe(DEMO, "make a demo"));
        assert_eq!(tracker.progress().unwrap().completed_tasks, 1);
    }

    #[test]
    fn test_transitions_and_progress_monotonicity() {
        let mut tracker = tracker_with_plan();
        let mut last_percent = tracker.progress().unwrap().percent_complete;

        for id in ["1.1", "1.2"] {
            assert!(tracker.start_task(id));
            assert!(tracker.complete_task(id, vec![], vec![]));
            let percent = tracker.progress().unwrap().percent_complete;
            assert!(percent >= last_percent);
            last_percent = percent;
        }

        assert_eq!(last_percent, 100);
        assert!(!tracker.should_continue());
    }

    #[test]
    fn test_fail_then_restart() {
        let mut tracker = tracker_with_plan();
        assert!(tracker.fail_task("1.1", "npm exploded"));
        assert_eq!(tracker.current_task().unwrap().id, "1.2");

        assert!(tracker.start_task("1.1"));
        assert_eq!(tracker.current_task().unwrap().id, "1.1");
    }

    #[test]
    fn test_unknown_task_returns_false() {
        let mut tracker = tracker_with_plan();
        assert!(!tracker.start_task("9.9"));
        assert!(!PlanTracker::new().start_task("1.1"));
    }

    #[test]
    fn test_auto_complete_by_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<html></html>").unwrap();
        fs::write(temp.path().join("empty.css"), "").unwrap();
        fs::write(temp.path().join("ROADMAP.md"), "# plan with index.html and style.css").unwrap();

        let mut tracker = tracker_with_plan();
        let completed = tracker.auto_complete(temp.path());

        assert_eq!(completed, 1);
        let plan = tracker.plan().unwrap();
        let task = plan.tasks().find(|t| t.id == "1.1").unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.files_created, vec!["index.html"]);
        // style.css exists only as the empty file; not completed
        assert_eq!(plan.tasks().find(|t| t.id == "1.2").unwrap().status, TaskStatus::Pending);
        assert_eq!(plan.current_task_id.as_deref(), Some("1.2"));
    }

    #[test]
    fn test_auto_complete_swallows_io_failures() {
        let mut tracker = tracker_with_plan();
        let completed = tracker.auto_complete(Path::new("/definitely/not/a/dir"));
        assert_eq!(completed, 0);
        assert_eq!(tracker.current_task().unwrap().id, "1.1");
    }

    #[test]
    fn test_session_roundtrip() {
        let temp = TempDir::new().unwrap();
        let session = temp.path().join("session.json");

        let mut tracker = tracker_with_plan();
        tracker.complete_task("1.1", vec!["index.html".to_string()], vec![]);
        tracker.save_session(&session).unwrap();

        let restored = PlanTracker::load_session(&session).unwrap();
        assert_eq!(restored.plan().unwrap().project_name, "Demo");
        assert_eq!(restored.progress().unwrap().completed_tasks, 1);
        assert_eq!(restored.current_task().unwrap().id, "1.2");
    }

    #[test]
    fn test_requires_plan_keywords_and_separators() {
        assert!(requires_plan("Build an app for tracking plants"));
        assert!(requires_plan("refactor entire auth module"));
        assert!(requires_plan("add login, add logout, and add signup"));
        assert!(!requires_plan("rename this variable"));
    }
}
