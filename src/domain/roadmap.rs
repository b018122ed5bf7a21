//! Roadmap domain type
//!
//! A Roadmap is the structured sprint/task graph extracted from planning
//! narration. Its id follows the `{6-char-hex}-roadmap-{slug}` format.
//! `current_task_id` and overall status are derived quantities; every
//! mutating caller runs `sync_derived` before handing the roadmap back.

use serde::{Deserialize, Serialize};

use super::now_ms;
use super::sprint::Sprint;
use super::task::{Task, TaskStatus};

/// Project category inferred from the planning text and original request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    #[default]
    WebApp,
    Api,
    Cli,
    Library,
    Refactor,
    Analysis,
    BugFix,
    Feature,
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WebApp => write!(f, "web-app"),
            Self::Api => write!(f, "api"),
            Self::Cli => write!(f, "cli"),
            Self::Library => write!(f, "library"),
            Self::Refactor => write!(f, "refactor"),
            Self::Analysis => write!(f, "analysis"),
            Self::BugFix => write!(f, "bug-fix"),
            Self::Feature => write!(f, "feature"),
        }
    }
}

/// Roadmap status in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapStatus {
    /// Extracted but no task started yet
    #[default]
    Planning,
    /// At least one task has been started
    InProgress,
    /// Every sprint is complete
    Completed,
    /// Explicitly paused by the consumer
    Paused,
    /// Explicitly cancelled by the consumer
    Cancelled,
}

impl std::fmt::Display for RoadmapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Paused => write!(f, "paused"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Progress summary computed over a roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Tasks that are Completed or Skipped
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub completed_sprints: usize,
    pub total_sprints: usize,
    /// Rounded integer percentage (0 for an empty plan)
    pub percent_complete: u32,
    /// Minutes spent across tasks with both timestamps, rounded
    pub elapsed_minutes: u32,
    /// max(0, estimate - elapsed)
    pub estimated_remaining_minutes: u32,
}

impl ProgressReport {
    /// The autonomous-continuation gate: the orchestrator must stop driving
    /// execution once this returns true, unless the user asked to continue.
    pub fn is_complete(&self) -> bool {
        self.percent_complete == 100
    }
}

/// The structured sprint/task graph for one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    /// Unique identifier (e.g. "019430-roadmap-demo")
    pub id: String,

    /// Project name captured from the roadmap heading
    pub project_name: String,

    /// Inferred project category
    pub project_type: ProjectType,

    /// The user request that produced this plan
    pub original_request: String,

    /// Sprints in execution order
    pub sprints: Vec<Sprint>,

    /// Sum of task counts across sprints
    pub total_tasks: usize,

    /// Sum of sprint estimates in minutes
    pub total_estimated_minutes: u32,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Current workflow status
    pub status: RoadmapStatus,

    /// Sprint owning the current task, if any
    pub current_sprint_id: Option<u32>,

    /// First Pending/InProgress task in sprint order, if any
    pub current_task_id: Option<String>,
}

impl Roadmap {
    /// Create a roadmap shell with a generated id; the extractor fills in
    /// sprints and then calls `recompute_totals` + `sync_derived`.
    pub fn new(
        project_name: impl Into<String>,
        project_type: ProjectType,
        original_request: impl Into<String>,
    ) -> Self {
        let project_name = project_name.into();
        Self {
            id: generate_id("roadmap", &project_name),
            project_name,
            project_type,
            original_request: original_request.into(),
            sprints: Vec::new(),
            total_tasks: 0,
            total_estimated_minutes: 0,
            created_at: now_ms(),
            status: RoadmapStatus::Planning,
            current_sprint_id: None,
            current_task_id: None,
        }
    }

    /// Iterate all tasks in sprint-then-task order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.sprints.iter().flat_map(|s| s.tasks.iter())
    }

    /// Mutable iteration in sprint-then-task order
    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.sprints.iter_mut().flat_map(|s| s.tasks.iter_mut())
    }

    /// Locate a task by id across sprints
    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks_mut().find(|t| t.id == task_id)
    }

    /// First InProgress task, else first Pending task, in sprint order
    pub fn current_task(&self) -> Option<&Task> {
        self.tasks()
            .find(|t| t.status == TaskStatus::InProgress)
            .or_else(|| self.tasks().find(|t| t.status == TaskStatus::Pending))
    }

    /// Recompute the stored sums after sprints/tasks change shape
    pub fn recompute_totals(&mut self) {
        self.total_tasks = self.sprints.iter().map(|s| s.tasks.len()).sum();
        self.total_estimated_minutes = self.sprints.iter().map(|s| s.estimated_minutes).sum();
    }

    /// Recompute the derived fields: current sprint/task pointers and the
    /// Planning → InProgress → Completed progression. Paused and Cancelled
    /// are explicit consumer states and are only ever left via completion.
    pub fn sync_derived(&mut self) {
        let current = self
            .tasks()
            .find(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress))
            .map(|t| (t.sprint_id, t.id.clone()));
        self.current_sprint_id = current.as_ref().map(|(sprint_id, _)| *sprint_id);
        self.current_task_id = current.map(|(_, task_id)| task_id);

        if !self.sprints.is_empty() && self.sprints.iter().all(Sprint::is_completed) {
            self.status = RoadmapStatus::Completed;
        } else if matches!(self.status, RoadmapStatus::Planning | RoadmapStatus::Completed)
            && self.tasks().any(|t| t.status != TaskStatus::Pending)
        {
            self.status = RoadmapStatus::InProgress;
        }
    }

    /// Compute the progress summary. Skipped tasks count as completed so the
    /// 100% gate coincides with every sprint being complete.
    pub fn calculate_progress(&self) -> ProgressReport {
        let completed_tasks = self
            .tasks()
            .filter(|t| matches!(t.status, TaskStatus::Completed | TaskStatus::Skipped))
            .count();
        let completed_sprints = self.sprints.iter().filter(|s| s.is_completed()).count();

        let percent_complete = if self.total_tasks == 0 {
            0
        } else {
            ((completed_tasks as f64 / self.total_tasks as f64) * 100.0).round() as u32
        };

        let elapsed_secs: i64 = self
            .tasks()
            .filter_map(|t| match (t.started_at, t.completed_at) {
                (Some(start), Some(end)) => Some(((end - start).max(0)) / 1000),
                _ => None,
            })
            .sum();
        let elapsed_minutes = (elapsed_secs as f64 / 60.0).round() as u32;

        ProgressReport {
            completed_tasks,
            total_tasks: self.total_tasks,
            completed_sprints,
            total_sprints: self.sprints.len(),
            percent_complete,
            elapsed_minutes,
            estimated_remaining_minutes: self.total_estimated_minutes.saturating_sub(elapsed_minutes),
        }
    }
}

/// Generate a roadmap id from type and name
pub fn generate_id(domain_type: &str, title: &str) -> String {
    let uuid = uuid::Uuid::now_v7();
    let hex_prefix = &uuid.to_string()[..6];
    format!("{}-{}-{}", hex_prefix, domain_type, slugify(title))
}

/// Slugify a name for use in ids
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_roadmap() -> Roadmap {
        let mut roadmap = Roadmap::new("Demo", ProjectType::WebApp, "build a demo site");
        let mut sprint = Sprint::new(1, "FOUNDATION", "🏗️", 10);
        sprint.tasks.push(Task::new("1.1", 1, "Create index.html"));
        sprint.tasks.push(Task::new("1.2", 1, "Create style.css"));
        roadmap.sprints.push(sprint);
        roadmap.recompute_totals();
        roadmap.sync_derived();
        roadmap
    }

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("roadmap", "My Demo App!");
        assert!(id.contains("-roadmap-"));
        assert!(id.ends_with("my-demo-app"));
    }

    #[test]
    fn test_current_task_prefers_in_progress() {
        let mut roadmap = demo_roadmap();
        assert_eq!(roadmap.current_task().unwrap().id, "1.1");

        roadmap.find_task_mut("1.2").unwrap().set_status(TaskStatus::InProgress);
        assert_eq!(roadmap.current_task().unwrap().id, "1.2");
    }

    #[test]
    fn test_sync_derived_tracks_first_open_task() {
        let mut roadmap = demo_roadmap();
        assert_eq!(roadmap.current_task_id.as_deref(), Some("1.1"));

        roadmap.find_task_mut("1.1").unwrap().set_status(TaskStatus::Completed);
        roadmap.sync_derived();
        assert_eq!(roadmap.current_task_id.as_deref(), Some("1.2"));
        assert_eq!(roadmap.status, RoadmapStatus::InProgress);

        roadmap.find_task_mut("1.2").unwrap().skip(None);
        roadmap.sync_derived();
        assert_eq!(roadmap.current_task_id, None);
        assert_eq!(roadmap.status, RoadmapStatus::Completed);
    }

    #[test]
    fn test_progress_counts_skipped_as_complete() {
        let mut roadmap = demo_roadmap();
        roadmap.find_task_mut("1.1").unwrap().set_status(TaskStatus::Completed);
        roadmap.find_task_mut("1.2").unwrap().skip(None);
        roadmap.sync_derived();

        let progress = roadmap.calculate_progress();
        assert_eq!(progress.completed_tasks, 2);
        assert_eq!(progress.percent_complete, 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_percent_rounds() {
        let mut roadmap = demo_roadmap();
        roadmap.sprints[0].tasks.push(Task::new("1.3", 1, "Create app.js"));
        roadmap.recompute_totals();
        roadmap.find_task_mut("1.1").unwrap().set_status(TaskStatus::Completed);

        let progress = roadmap.calculate_progress();
        assert_eq!(progress.total_tasks, 3);
        assert_eq!(progress.percent_complete, 33);
    }

    #[test]
    fn test_elapsed_and_remaining_minutes() {
        let mut roadmap = demo_roadmap();
        {
            let task = roadmap.find_task_mut("1.1").unwrap();
            task.started_at = Some(0);
            task.completed_at = Some(4 * 60 * 1000);
            task.status = TaskStatus::Completed;
        }

        let progress = roadmap.calculate_progress();
        assert_eq!(progress.elapsed_minutes, 4);
        assert_eq!(progress.estimated_remaining_minutes, 6);
    }

    #[test]
    fn test_empty_plan_progress_is_zero() {
        let roadmap = Roadmap::new("Empty", ProjectType::WebApp, "");
        let progress = roadmap.calculate_progress();
        assert_eq!(progress.percent_complete, 0);
        assert!(!progress.is_complete());
    }
}
