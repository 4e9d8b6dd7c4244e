use crate::model::{Activity, CommitActivity, MergeRequestActivity};
use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeMap;

pub const REPORT_TITLE: &str = "# GitLab Activity";

/// Activities that fell on one calendar day. `day` is `None` for entries whose
/// date could not be parsed.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub day: Option<NaiveDate>,
    pub activities: Vec<&'a Activity>,
}

impl DayGroup<'_> {
    pub fn label(&self) -> String {
        match self.day {
            Some(day) => day_label(day),
            None => "Unknown date".to_string(),
        }
    }
}

/// "Monday, 10 June 2024"
pub fn day_label(day: NaiveDate) -> String {
    day.format("%A, %-d %B %Y").to_string()
}

/// Groups by calendar day in `tz`, newest day first. Order within a day is
/// the input order.
pub fn group_by_day<'a, Tz: TimeZone>(activities: &'a [Activity], tz: &Tz) -> Vec<DayGroup<'a>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a Activity>> = BTreeMap::new();
    let mut undated = Vec::new();

    for activity in activities {
        match activity.timestamp() {
            Some(ts) => days
                .entry(ts.with_timezone(tz).date_naive())
                .or_default()
                .push(activity),
            None => undated.push(activity),
        }
    }

    let mut groups: Vec<DayGroup<'a>> = days
        .into_iter()
        .rev()
        .map(|(day, activities)| DayGroup {
            day: Some(day),
            activities,
        })
        .collect();
    if !undated.is_empty() {
        groups.push(DayGroup {
            day: None,
            activities: undated,
        });
    }
    groups
}

pub fn render_markdown<Tz: TimeZone>(activities: &[Activity], tz: &Tz) -> String {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push('\n');

    for group in group_by_day(activities, tz) {
        let (commits, merge_requests): (Vec<&Activity>, Vec<&Activity>) =
            group.activities.iter().copied().partition(|a| a.is_commit());

        out.push_str(&format!("\n## {}\n", group.label()));

        if !commits.is_empty() {
            out.push_str("\n### Commits\n\n");
            for activity in commits {
                if let Activity::Commit(c) = activity {
                    out.push_str(&commit_line(c));
                    out.push('\n');
                }
            }
        }

        if !merge_requests.is_empty() {
            out.push_str("\n### Merge Requests\n\n");
            for activity in merge_requests {
                if let Activity::MergeRequest(mr) = activity {
                    out.push_str(&merge_request_line(mr));
                    out.push('\n');
                }
            }
        }
    }
    out
}

fn commit_line(c: &CommitActivity) -> String {
    let target = c
        .target_branch
        .as_ref()
        .map(|t| format!(" → `{t}`"))
        .unwrap_or_default();
    let origin = if c.from_merge_request {
        format!(
            " _(MR `{}` → `{}`)_",
            c.mr_source.as_deref().unwrap_or_default(),
            c.mr_target.as_deref().unwrap_or_default()
        )
    } else {
        String::new()
    };
    format!(
        "- **{}** `{}`{target}: {}{origin}",
        c.project, c.branch, c.title
    )
}

fn merge_request_line(mr: &MergeRequestActivity) -> String {
    format!(
        "- **{}** !{} `{}` → `{}`: {}",
        mr.project, mr.iid, mr.source, mr.target, mr.title
    )
}
