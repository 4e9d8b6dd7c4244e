mod client;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::GitLabClient;
pub use types::{Branch, Project, RawCommit, RawMergeRequest, User};

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Read-only view of a GitLab-compatible API.
///
/// Every listing is fully paginated by the implementor.
pub trait ActivitySource {
    fn current_user(&self) -> Result<User>;

    fn projects(&self) -> Result<Vec<Project>>;

    /// Merge requests in `project_id` authored by `author_id`, in every state.
    fn merge_requests(&self, project_id: u64, author_id: u64) -> Result<Vec<RawMergeRequest>>;

    fn merge_request_commits(&self, project_id: u64, mr_iid: u64) -> Result<Vec<RawCommit>>;

    fn branches(&self, project_id: u64) -> Result<Vec<Branch>>;

    fn branch_commits(
        &self,
        project_id: u64,
        branch: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RawCommit>>;
}
