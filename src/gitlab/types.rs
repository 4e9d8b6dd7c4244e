use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub public_email: Option<String>,
    #[serde(default)]
    pub commit_email: Option<String>,
}

impl User {
    /// The address commits are matched against: commit email first, then the
    /// account's primary and public addresses.
    pub fn commit_address(&self) -> Option<&str> {
        [&self.commit_email, &self.email, &self.public_email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
}

/// Merge request as listed by the API. Every field is optional so a sparse
/// payload still normalizes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMergeRequest {
    pub iid: Option<u64>,
    pub merge_commit_sha: Option<String>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCommit {
    pub id: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub author_email: Option<String>,
}
