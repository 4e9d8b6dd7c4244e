use crate::attribution::Attributor;
use crate::gitlab::{ActivitySource, Project};
use crate::model::Activity;
use crate::normalize;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use tracing::{info, warn};

/// Who the activity belongs to and how far back to look.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub user_id: u64,
    pub email: String,
    pub since: Option<DateTime<Utc>>,
    pub progress: bool,
}

/// Collects the user's activity across `projects`, in listing order.
///
/// `seen` holds every commit sha already emitted this run and is extended as
/// projects are walked.
pub fn collect_activities<S: ActivitySource>(
    source: &S,
    projects: &[Project],
    options: &CollectOptions,
    seen: &mut HashSet<String>,
) -> Vec<Activity> {
    let pb = if options.progress {
        let pb = ProgressBar::new(projects.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut activities = Vec::new();
    for project in projects {
        pb.set_message(project.name.clone());
        let found = collect_project(source, project, options, seen);
        info!(project = %project.name, count = found.len(), "collected project");
        activities.extend(found);
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} activities collected", activities.len()));
    activities
}

/// One project's merge requests and commits. A failed listing skips only the
/// affected kind of activity for this project.
pub fn collect_project<S: ActivitySource>(
    source: &S,
    project: &Project,
    options: &CollectOptions,
    seen: &mut HashSet<String>,
) -> Vec<Activity> {
    let name = project.name.as_str();
    let mut out = Vec::new();
    let mut attributor = Attributor::new(&options.email, seen);

    match source.merge_requests(project.id, options.user_id) {
        Ok(merge_requests) => {
            for mr in &merge_requests {
                out.push(normalize::merge_request(name, mr));

                let Some(iid) = mr.iid else { continue };
                match source.merge_request_commits(project.id, iid) {
                    Ok(commits) => out.extend(attributor.merge_request_commits(name, mr, &commits)),
                    Err(e) => warn!(project = name, mr = iid, error = %e, "skipping merge request commits"),
                }
            }
        }
        Err(e) => warn!(project = name, error = %e, "skipping merge requests"),
    }

    match source.branches(project.id) {
        Ok(branches) => {
            for branch in &branches {
                match source.branch_commits(project.id, &branch.name, options.since) {
                    Ok(commits) => {
                        out.extend(attributor.branch_commits(name, &branch.name, &commits))
                    }
                    Err(e) => {
                        warn!(project = name, branch = %branch.name, error = %e, "skipping branch commits")
                    }
                }
            }
        }
        Err(e) => warn!(project = name, error = %e, "skipping commits"),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::fake::{project, raw_commit, raw_mr, FakeSource, EMAIL};
    use crate::model::CommitActivity;
    use pretty_assertions::assert_eq;

    fn options() -> CollectOptions {
        CollectOptions {
            user_id: 1,
            email: EMAIL.to_string(),
            since: None,
            progress: false,
        }
    }

    fn commits(activities: &[Activity]) -> Vec<&CommitActivity> {
        activities
            .iter()
            .filter_map(|a| match a {
                Activity::Commit(c) => Some(c),
                Activity::MergeRequest(_) => None,
            })
            .collect()
    }

    #[test]
    fn merge_request_commits_take_priority_over_branch_walk() {
        let mut source = FakeSource {
            projects: vec![project(10, "api")],
            ..Default::default()
        };
        let x = raw_commit("X", "Add login form", "2024-06-10T09:00:00Z");
        source
            .merge_requests
            .insert(10, vec![raw_mr(3, "feat", "main", "2024-06-10T10:00:00Z")]);
        source.mr_commits.insert((10, 3), vec![x.clone()]);
        source.branches.insert(10, vec!["feat".to_string()]);
        source.branch_commits.insert((10, "feat".to_string()), vec![x]);

        let mut seen = HashSet::new();
        let activities = collect_activities(&source, &source.projects, &options(), &mut seen);

        assert_eq!(activities.len(), 2);
        let found = commits(&activities);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].branch, "feat");
        assert_eq!(found[0].target_branch.as_deref(), Some("main"));
        assert!(found[0].from_merge_request);
    }

    #[test]
    fn seen_set_spans_projects() {
        let mut source = FakeSource {
            projects: vec![project(1, "fork"), project(2, "upstream")],
            ..Default::default()
        };
        let shared = raw_commit("S", "Shared fix", "2024-06-10T09:00:00Z");
        source.branches.insert(1, vec!["main".to_string()]);
        source.branches.insert(2, vec!["main".to_string()]);
        source.branch_commits.insert((1, "main".to_string()), vec![shared.clone()]);
        source.branch_commits.insert((2, "main".to_string()), vec![shared]);

        let mut seen = HashSet::new();
        let activities = collect_activities(&source, &source.projects, &options(), &mut seen);

        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].project(), "fork");
        assert!(seen.contains("S"));
    }

    #[test]
    fn failed_listing_skips_only_that_kind() {
        let mut source = FakeSource {
            projects: vec![project(1, "broken"), project(2, "healthy")],
            failing_merge_requests: vec![1],
            failing_branches: vec![2],
            ..Default::default()
        };
        source
            .merge_requests
            .insert(2, vec![raw_mr(1, "feat", "main", "2024-06-10T10:00:00Z")]);
        source.branches.insert(1, vec!["main".to_string()]);
        source.branch_commits.insert(
            (1, "main".to_string()),
            vec![raw_commit("A", "Tidy", "2024-06-10T09:00:00Z")],
        );

        let mut seen = HashSet::new();
        let activities = collect_activities(&source, &source.projects, &options(), &mut seen);

        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].project(), "broken");
        assert!(activities[0].is_commit());
        assert_eq!(activities[1].project(), "healthy");
        assert!(!activities[1].is_commit());
    }

    #[test]
    fn sparse_merge_request_is_kept_without_commit_lookup() {
        let mut source = FakeSource {
            projects: vec![project(1, "api")],
            ..Default::default()
        };
        let mut open = raw_mr(9, "wip", "main", "2024-06-10T10:00:00Z");
        open.iid = None;
        source.merge_requests.insert(1, vec![open]);

        let mut seen = HashSet::new();
        let activities = collect_activities(&source, &source.projects, &options(), &mut seen);

        assert_eq!(activities.len(), 1);
        match &activities[0] {
            Activity::MergeRequest(mr) => {
                assert_eq!(mr.sha, None);
                assert_eq!(mr.source, "wip");
            }
            other => panic!("expected merge request, got {other:?}"),
        }
    }
}
