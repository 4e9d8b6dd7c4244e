use super::types::{Branch, Project, RawCommit, RawMergeRequest, User};
use super::ActivitySource;
use crate::error::{ActivityError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

const PER_PAGE: usize = 100;

pub struct GitLabClient {
    client: Client,
    api_url: String,
    token: String,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(ActivityError::Config(
                "an access token is required (--token or GITLAB_TOKEN)".to_string(),
            ));
        }
        let client = Client::builder()
            .user_agent(concat!("glactivity/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url(base_url),
            token: token.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .header("PRIVATE-TOKEN", &self.token)
            .query(query)
            .send()?;
        if !resp.status().is_success() {
            return Err(ActivityError::api(resp.status(), path));
        }
        Ok(resp.json()?)
    }

    fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        collect_pages(|page| {
            let mut paged: Vec<(&str, String)> = query.to_vec();
            paged.push(("per_page", PER_PAGE.to_string()));
            paged.push(("page", page.to_string()));

            let batch: Vec<T> = self.get(path, &paged)?;
            debug!(path, page, count = batch.len(), "fetched page");
            Ok(batch)
        })
    }
}

/// Requests successive pages, starting at 1, until one comes back empty.
fn collect_pages<T>(mut fetch_page: impl FnMut(usize) -> Result<Vec<T>>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut page = 1usize;
    loop {
        let batch = fetch_page(page)?;
        if batch.is_empty() {
            break;
        }
        items.extend(batch);
        page += 1;
    }
    Ok(items)
}

impl ActivitySource for GitLabClient {
    fn current_user(&self) -> Result<User> {
        self.get("/user", &[])
    }

    fn projects(&self) -> Result<Vec<Project>> {
        self.get_all("/projects", &[("membership", "true".to_string())])
    }

    fn merge_requests(&self, project_id: u64, author_id: u64) -> Result<Vec<RawMergeRequest>> {
        self.get_all(
            &format!("/projects/{project_id}/merge_requests"),
            &[
                ("author_id", author_id.to_string()),
                ("state", "all".to_string()),
            ],
        )
    }

    fn merge_request_commits(&self, project_id: u64, mr_iid: u64) -> Result<Vec<RawCommit>> {
        self.get_all(
            &format!("/projects/{project_id}/merge_requests/{mr_iid}/commits"),
            &[],
        )
    }

    fn branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        self.get_all(&format!("/projects/{project_id}/repository/branches"), &[])
    }

    fn branch_commits(
        &self,
        project_id: u64,
        branch: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RawCommit>> {
        let mut query = vec![("ref_name", branch.to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        self.get_all(&format!("/projects/{project_id}/repository/commits"), &query)
    }
}

/// Normalizes a user-supplied base URL to the v4 API root.
fn api_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/api/v4") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api/v4")
    }
}
