use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A unit of user-authored work, tagged by `type` in the persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Activity {
    Commit(CommitActivity),
    MergeRequest(MergeRequestActivity),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitActivity {
    #[serde(deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sha: String,
    #[serde(deserialize_with = "null_as_default")]
    pub branch: String,
    pub target_branch: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub from_merge_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequestActivity {
    #[serde(deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub iid: u64,
    pub sha: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
}

/// How merge requests are recognised across runs.
///
/// `Branches` keys on `source → target`, which is what earlier records were
/// deduplicated by. Two unrelated merge requests reusing the same branch pair
/// collapse into one under it. `Iid` keys on `project!iid` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MrKeyScheme {
    #[default]
    Branches,
    Iid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Commit(String),
    MergeRequest(String),
}

impl Activity {
    pub fn project(&self) -> &str {
        match self {
            Activity::Commit(c) => &c.project,
            Activity::MergeRequest(mr) => &mr.project,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Activity::Commit(c) => &c.date,
            Activity::MergeRequest(mr) => &mr.date,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Activity::Commit(c) => &c.title,
            Activity::MergeRequest(mr) => &mr.title,
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, Activity::Commit(_))
    }

    /// Parsed `date`, keeping the offset it was recorded with.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.date()).ok()
    }

    pub fn identity_key(&self, scheme: MrKeyScheme) -> IdentityKey {
        match self {
            Activity::Commit(c) => IdentityKey::Commit(c.sha.clone()),
            Activity::MergeRequest(mr) => IdentityKey::MergeRequest(match scheme {
                MrKeyScheme::Branches => format!("{} → {}", mr.source, mr.target),
                MrKeyScheme::Iid => format!("{}!{}", mr.project, mr.iid),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySummary {
    #[serde(deserialize_with = "null_as_default")]
    pub commits: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub merge_requests: usize,
}

impl ActivitySummary {
    pub fn of(activities: &[Activity]) -> Self {
        let commits = activities.iter().filter(|a| a.is_commit()).count();
        Self {
            commits,
            merge_requests: activities.len() - commits,
        }
    }
}

/// The structured record persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub generated_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub total_activities: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: ActivitySummary,
    #[serde(deserialize_with = "null_as_default")]
    pub activities: Vec<Activity>,
}

impl ActivityRecord {
    /// Builds a record with counters recomputed from `activities`.
    pub fn from_activities(activities: Vec<Activity>, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            total_activities: activities.len(),
            summary: ActivitySummary::of(&activities),
            activities,
        }
    }
}
