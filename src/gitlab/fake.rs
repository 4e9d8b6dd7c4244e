use super::types::{Branch, Project, RawCommit, RawMergeRequest, User};
use super::ActivitySource;
use crate::error::{ActivityError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const EMAIL: &str = "dev@example.com";

/// Project ids listed in `failing_*` answer with a server error.
#[derive(Default)]
pub struct FakeSource {
    pub projects: Vec<Project>,
    pub merge_requests: HashMap<u64, Vec<RawMergeRequest>>,
    pub mr_commits: HashMap<(u64, u64), Vec<RawCommit>>,
    pub branches: HashMap<u64, Vec<String>>,
    pub branch_commits: HashMap<(u64, String), Vec<RawCommit>>,
    pub failing_merge_requests: Vec<u64>,
    pub failing_branches: Vec<u64>,
}

fn unavailable(path: &str) -> ActivityError {
    ActivityError::Api {
        status: 500,
        path: path.to_string(),
        message: "Internal Server Error".to_string(),
    }
}

impl ActivitySource for FakeSource {
    fn current_user(&self) -> Result<User> {
        Ok(User {
            id: 1,
            username: "dev".to_string(),
            email: Some(EMAIL.to_string()),
            public_email: None,
            commit_email: None,
        })
    }

    fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    fn merge_requests(&self, project_id: u64, _author_id: u64) -> Result<Vec<RawMergeRequest>> {
        if self.failing_merge_requests.contains(&project_id) {
            return Err(unavailable("merge_requests"));
        }
        Ok(self.merge_requests.get(&project_id).cloned().unwrap_or_default())
    }

    fn merge_request_commits(&self, project_id: u64, mr_iid: u64) -> Result<Vec<RawCommit>> {
        Ok(self
            .mr_commits
            .get(&(project_id, mr_iid))
            .cloned()
            .unwrap_or_default())
    }

    fn branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        if self.failing_branches.contains(&project_id) {
            return Err(unavailable("branches"));
        }
        Ok(self
            .branches
            .get(&project_id)
            .map(|names| names.iter().map(|n| Branch { name: n.clone() }).collect())
            .unwrap_or_default())
    }

    fn branch_commits(
        &self,
        project_id: u64,
        branch: &str,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RawCommit>> {
        Ok(self
            .branch_commits
            .get(&(project_id, branch.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

pub fn project(id: u64, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
    }
}

pub fn raw_commit(sha: &str, title: &str, date: &str) -> RawCommit {
    RawCommit {
        id: Some(sha.to_string()),
        title: Some(title.to_string()),
        created_at: Some(date.to_string()),
        author_email: Some(EMAIL.to_string()),
    }
}

pub fn raw_mr(iid: u64, source: &str, target: &str, date: &str) -> RawMergeRequest {
    RawMergeRequest {
        iid: Some(iid),
        merge_commit_sha: None,
        source_branch: Some(source.to_string()),
        target_branch: Some(target.to_string()),
        title: Some(format!("{source} into {target}")),
        created_at: Some(date.to_string()),
    }
}
