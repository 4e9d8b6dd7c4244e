use crate::gitlab::{RawCommit, RawMergeRequest};
use crate::model::{Activity, CommitActivity, MergeRequestActivity};

pub fn merge_request(project: &str, raw: &RawMergeRequest) -> Activity {
    Activity::MergeRequest(MergeRequestActivity {
        project: project.to_string(),
        date: raw.created_at.clone().unwrap_or_default(),
        iid: raw.iid.unwrap_or_default(),
        sha: raw.merge_commit_sha.clone().filter(|s| !s.is_empty()),
        source: raw.source_branch.clone().unwrap_or_default(),
        target: raw.target_branch.clone().unwrap_or_default(),
        title: raw.title.clone().unwrap_or_default(),
    })
}

/// Whether `raw` was authored by the configured user.
pub fn is_authored_by(raw: &RawCommit, email: &str) -> bool {
    raw.author_email.as_deref() == Some(email)
}

/// A commit with no branch attribution yet; see [`crate::attribution`].
pub fn commit(project: &str, raw: &RawCommit) -> CommitActivity {
    CommitActivity {
        project: project.to_string(),
        date: raw.created_at.clone().unwrap_or_default(),
        sha: raw.id.clone().unwrap_or_default(),
        title: raw
            .title
            .as_deref()
            .and_then(|t| t.lines().next())
            .unwrap_or_default()
            .to_string(),
        ..Default::default()
    }
}
