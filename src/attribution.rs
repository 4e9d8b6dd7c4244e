use crate::gitlab::{RawCommit, RawMergeRequest};
use crate::model::Activity;
use crate::normalize;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static MERGE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge branch '[^']*'.* into '?([^'\s]*)'?").expect("merge title pattern")
});

/// Target branch named by a `Merge branch '<name>' ... into <target>` title.
///
/// Returns `Some("")` when the title is a merge title without a target.
pub fn merge_target(title: &str) -> Option<&str> {
    MERGE_TITLE
        .captures(title)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
}

/// Attributes commits for one user, first match wins per sha.
///
/// `seen` spans the whole run, so a sha attributed in one project or pass is
/// never emitted again.
pub struct Attributor<'a> {
    email: &'a str,
    seen: &'a mut HashSet<String>,
}

impl<'a> Attributor<'a> {
    pub fn new(email: &'a str, seen: &'a mut HashSet<String>) -> Self {
        Self { email, seen }
    }

    fn claim(&mut self, project: &str, raw: &RawCommit) -> bool {
        if !normalize::is_authored_by(raw, self.email) {
            return false;
        }
        match raw.id.as_deref() {
            Some(sha) => self.seen.insert(sha.to_string()),
            None => {
                // No sha means no identity to deduplicate on across runs.
                debug!(project, title = ?raw.title, "skipping commit without id");
                false
            }
        }
    }

    /// Attributes the user's commits listed under merge request `mr`. They
    /// take the request's branches even if the source branch is gone.
    pub fn merge_request_commits(
        &mut self,
        project: &str,
        mr: &RawMergeRequest,
        commits: &[RawCommit],
    ) -> Vec<Activity> {
        let source = mr.source_branch.clone().unwrap_or_default();
        let target = mr.target_branch.clone().unwrap_or_default();

        let mut out = Vec::new();
        for raw in commits {
            if !self.claim(project, raw) {
                continue;
            }
            let mut commit = normalize::commit(project, raw);
            commit.branch = source.clone();
            commit.target_branch = Some(target.clone());
            commit.from_merge_request = true;
            commit.mr_source = Some(source.clone());
            commit.mr_target = Some(target.clone());
            out.push(Activity::Commit(commit));
        }
        out
    }

    /// Attributes the user's commits found on `branch` that no earlier pass
    /// has claimed. A merge-commit title moves the commit to its merge target.
    pub fn branch_commits(
        &mut self,
        project: &str,
        branch: &str,
        commits: &[RawCommit],
    ) -> Vec<Activity> {
        let mut out = Vec::new();
        for raw in commits {
            if !self.claim(project, raw) {
                continue;
            }
            let mut commit = normalize::commit(project, raw);
            match merge_target(&commit.title) {
                Some(target) => {
                    let target = if target.is_empty() { branch } else { target };
                    commit.branch = target.to_string();
                    commit.target_branch = Some(target.to_string());
                }
                None => {
                    commit.branch = branch.to_string();
                    commit.target_branch = None;
                }
            }
            out.push(Activity::Commit(commit));
        }
        out
    }
}
