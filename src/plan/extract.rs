//! Plan extraction from free-form narration text
//!
//! The model announces plans in a fixed (but loosely formatted) grammar:
//!
//! ```text
//! 📋 PROJECT ROADMAP: Demo
//! 🏗️ SPRINT 1: FOUNDATION (Estimated: ~10 min)
//! ☐ 1.1 Create index.html
//! ☐ 1.2 Create style.css
//! ```
//!
//! Sprint headers are located by their byte offsets; each header's span runs
//! until the next header (or end of document), and task lines are scanned
//! within that span. Malformed input is never an error: no marker or zero
//! sprint headers simply means "no plan detected".

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::domain::{ProjectType, Roadmap, Sprint, Task, TaskStatus};

/// The plan-declaration heading, case-insensitive, project name to end of line
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PROJECT\s+ROADMAP:?[ \t]*(.*)").unwrap());

/// Sprint header: marker glyph, SPRINT <n>: <UPPERCASE NAME> (Estimated: ~<m> min)
///
/// The glyph class is ASCII-negated rather than `[^\w\s]` because emoji
/// presentation sequences end in U+FE0F, a Unicode mark that `\w` matches;
/// `🏗️` must be consumable as a whole before the SPRINT keyword.
static SPRINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*([^A-Za-z0-9\s]+)?[ \t]*SPRINT[ \t]+(\d+):[ \t]*([A-Z][A-Z0-9 &/-]*?)[ \t]*\([ \t]*(?:Estimated:?[ \t]*)?~?(\d+)[ \t]*min(?:ute)?s?[ \t]*\)",
    )
    .unwrap()
});

/// Task line: checkbox glyph, <sprint>.<index> id, description to end of line
static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(☐|⬜|🔄|✅)[ \t]*(\d+\.\d+)[ \t]+(.+)").unwrap());

/// Map a checkbox glyph to the status it declares
pub(crate) fn status_from_glyph(glyph: &str) -> TaskStatus {
    match glyph {
        "🔄" => TaskStatus::InProgress,
        "✅" => TaskStatus::Completed,
        _ => TaskStatus::Pending,
    }
}

/// True iff the text contains a recognizable plan declaration
pub fn detect(text: &str) -> bool {
    MARKER_RE.is_match(text)
}

/// Extract a structured roadmap from narration text.
///
/// Returns `None` when no marker is present or no sprint headers follow it —
/// a plan with zero sprints is treated as "no plan detected".
pub fn extract(text: &str, original_request: &str) -> Option<Roadmap> {
    let marker = MARKER_RE.captures(text)?;
    let project_name = marker
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .unwrap_or("Untitled Project")
        .to_string();

    // Header offsets delimit each sprint's text span
    let headers: Vec<_> = SPRINT_RE.captures_iter(text).collect();
    if headers.is_empty() {
        debug!(%project_name, "extract: marker found but no sprint headers");
        return None;
    }

    let project_type = infer_project_type(text, original_request);
    let mut roadmap = Roadmap::new(project_name, project_type, original_request);

    for (i, caps) in headers.iter().enumerate() {
        let emoji = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
        let sprint_id: u32 = caps[2].parse().unwrap_or(i as u32 + 1);
        let name = caps[3].trim().to_string();
        let estimated_minutes: u32 = caps[4].parse().unwrap_or(0);

        let span_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let span_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let mut sprint = Sprint::new(sprint_id, name, emoji, estimated_minutes);
        for task_caps in TASK_RE.captures_iter(&text[span_start..span_end]) {
            let mut task = Task::new(&task_caps[2], sprint_id, task_caps[3].trim());
            task.set_status(status_from_glyph(&task_caps[1]));
            sprint.tasks.push(task);
        }
        roadmap.sprints.push(sprint);
    }

    roadmap.recompute_totals();
    roadmap.sync_derived();
    debug!(
        roadmap_id = %roadmap.id,
        sprints = roadmap.sprints.len(),
        tasks = roadmap.total_tasks,
        "extract: plan detected"
    );
    Some(roadmap)
}

/// Keyword-scored project type; first matching category wins, in fixed
/// priority order, defaulting to web-app.
fn infer_project_type(text: &str, original_request: &str) -> ProjectType {
    let haystack = format!("{} {}", text, original_request).to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| haystack.contains(k));

    if contains_any(&["web app", "webapp", "website", "frontend", "html", "landing page"]) {
        ProjectType::WebApp
    } else if contains_any(&["api", "endpoint", "rest", "graphql", "backend"]) {
        ProjectType::Api
    } else if contains_any(&["cli", "command line", "command-line", "terminal"]) {
        ProjectType::Cli
    } else if contains_any(&["library", "crate", "package", "sdk"]) {
        ProjectType::Library
    } else if contains_any(&["refactor", "restructure", "clean up", "cleanup"]) {
        ProjectType::Refactor
    } else if contains_any(&["bug", "fix", "crash", "broken"]) {
        ProjectType::BugFix
    } else if contains_any(&["feature", "implement", "enhance"]) {
        ProjectType::Feature
    } else {
        ProjectType::WebApp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = "\
📋 PROJECT ROADMAP: Demo
🏗️ SPRINT 1: FOUNDATION (Estimated: ~10 min)
☐ 1.1 Create index.html
☐ 1.2 Create style.css
";

    #[test]
    fn test_detect_is_case_insensitive() {
        assert!(detect("project roadmap: Thing"));
        assert!(detect(DEMO));
        assert!(!detect("no plan in here"));
    }

    #[test]
    fn test_extract_demo_scenario() {
        let plan = extract(DEMO, "make a demo").unwrap();
        assert_eq!(plan.project_name, "Demo");
        assert_eq!(plan.total_tasks, 2);
        assert_eq!(plan.total_estimated_minutes, 10);
        assert_eq!(plan.current_task_id.as_deref(), Some("1.1"));
        assert_eq!(plan.sprints[0].name, "FOUNDATION");
        assert_eq!(plan.sprints[0].emoji, "🏗️");
        assert_eq!(plan.sprints[0].tasks[1].description, "Create style.css");
    }

    #[test]
    fn test_extract_without_sprints_is_not_found() {
        assert!(extract("📋 PROJECT ROADMAP: Demo\nand nothing else", "").is_none());
        assert!(extract("plain narration", "").is_none());
    }

    #[test]
    fn test_extract_multiple_sprints_spans() {
        let text = "\
📋 PROJECT ROADMAP: Shop
🏗️ SPRINT 1: FOUNDATION (Estimated: ~10 min)
☐ 1.1 Create index.html
🚀 SPRINT 2: CHECKOUT FLOW (Estimated: ~25 min)
🔄 2.1 Build cart api endpoint
✅ 2.2 Wire payment form
";
        let plan = extract(text, "").unwrap();
        assert_eq!(plan.sprints.len(), 2);
        assert_eq!(plan.sprints[0].tasks.len(), 1);
        assert_eq!(plan.sprints[1].tasks.len(), 2);
        assert_eq!(plan.sprints[1].name, "CHECKOUT FLOW");
        assert_eq!(plan.total_estimated_minutes, 35);
        assert_eq!(plan.sprints[1].tasks[0].status, TaskStatus::InProgress);
        assert_eq!(plan.sprints[1].tasks[1].status, TaskStatus::Completed);
        // First open task in sprint order
        assert_eq!(plan.current_task_id.as_deref(), Some("1.1"));
    }

    #[test]
    fn test_extract_tolerates_estimate_variants() {
        let text = "\
PROJECT ROADMAP: Tool
🔧 SPRINT 1: SETUP (Estimated: 5 minutes)
☐ 1.1 Scaffold the cli crate
";
        let plan = extract(text, "a cli tool").unwrap();
        assert_eq!(plan.total_estimated_minutes, 5);
        assert_eq!(plan.project_type, ProjectType::Cli);
    }

    #[test]
    fn test_project_type_priority_order() {
        // "html" (web-app) outranks "api" mentions
        assert_eq!(infer_project_type("build html pages for the api", ""), ProjectType::WebApp);
        assert_eq!(infer_project_type("expose a rest api", ""), ProjectType::Api);
        assert_eq!(infer_project_type("fix the login crash", ""), ProjectType::BugFix);
        assert_eq!(infer_project_type("nothing recognizable", ""), ProjectType::WebApp);
    }

    #[test]
    fn test_sprint_header_glyphs_with_variation_selector() {
        // 🏗️ and ⚙️ are emoji presentation sequences ending in U+FE0F; the
        // header must still parse with the full glyph captured
        let text = "\
📋 PROJECT ROADMAP: Rig
🏗️ SPRINT 1: FOUNDATION (Estimated: ~10 min)
☐ 1.1 Create index.html
⚙️ SPRINT 2: WIRING (Estimated: ~5 min)
☐ 2.1 Create app.js
";
        let plan = extract(text, "").unwrap();
        assert_eq!(plan.sprints.len(), 2);
        assert_eq!(plan.sprints[0].emoji, "🏗️");
        assert_eq!(plan.sprints[1].emoji, "⚙️");
        assert_eq!(plan.total_tasks, 2);
    }

    #[test]
    fn test_unnamed_plan_gets_placeholder() {
        let text = "\
PROJECT ROADMAP:
🏗️ SPRINT 1: WORK (Estimated: ~5 min)
☐ 1.1 Do the thing
";
        let plan = extract(text, "").unwrap();
        assert_eq!(plan.project_name, "Untitled Project");
    }
}
