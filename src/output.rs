use crate::cli::CommonArgs;
use crate::model::{Activity, ActivityRecord, ActivitySummary};
use crate::report::render_markdown;
use crate::store::RecordStore;
use crate::sync::SyncOutcome;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, Utc};
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project: String,
    pub commits: usize,
    pub merge_requests: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordOverview {
    pub generated_at: DateTime<Utc>,
    pub total_activities: usize,
    pub summary: ActivitySummary,
    pub earliest: Option<String>,
    pub latest: Option<String>,
    pub projects: Vec<ProjectSummary>,
}

impl RecordOverview {
    pub fn of(record: &ActivityRecord) -> Self {
        let mut projects: BTreeMap<&str, ProjectSummary> = BTreeMap::new();
        let mut dated: Vec<(DateTime<FixedOffset>, &str)> = Vec::new();

        for activity in &record.activities {
            let entry = projects
                .entry(activity.project())
                .or_insert_with(|| ProjectSummary {
                    project: activity.project().to_string(),
                    commits: 0,
                    merge_requests: 0,
                });
            if activity.is_commit() {
                entry.commits += 1;
            } else {
                entry.merge_requests += 1;
            }
            if let Some(ts) = activity.timestamp() {
                dated.push((ts, activity.date()));
            }
        }

        let earliest = dated.iter().min_by_key(|(ts, _)| *ts).map(|(_, d)| d.to_string());
        let latest = dated.iter().max_by_key(|(ts, _)| *ts).map(|(_, d)| d.to_string());

        let mut projects: Vec<ProjectSummary> = projects.into_values().collect();
        projects.sort_by(|a, b| {
            (b.commits + b.merge_requests).cmp(&(a.commits + a.merge_requests))
        });

        Self {
            generated_at: record.generated_at,
            total_activities: record.activities.len(),
            summary: ActivitySummary::of(&record.activities),
            earliest,
            latest,
            projects,
        }
    }
}

pub fn exec_report(common: CommonArgs, stdout: bool) -> Result<()> {
    let store = RecordStore::new(&common.record, &common.report);
    let record = store.load_record().context("Failed to read the activity record")?;
    let report = render_markdown(&record.activities, &Local);

    if stdout {
        print!("{report}");
    } else {
        store
            .save_report(&report)
            .context("Failed to write the report")?;
        println!(
            "Wrote {} activities to {}",
            style(record.activities.len()).cyan(),
            store.report_path().display()
        );
    }
    Ok(())
}

pub fn exec_summary(common: CommonArgs, json: bool) -> Result<()> {
    let store = RecordStore::new(&common.record, &common.report);
    let record = store.load_record().context("Failed to read the activity record")?;
    let overview = RecordOverview::of(&record);

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
    } else {
        output_overview(&overview);
    }
    Ok(())
}

pub fn output_delta_json(delta: &[Activity]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(delta)?);
    Ok(())
}

pub fn output_delta_summary(outcome: &SyncOutcome, store: &RecordStore) {
    let new = ActivitySummary::of(&outcome.delta);

    println!("{}", style("Sync Summary").bold());
    println!("{}", "─".repeat(50));
    println!("New commits: {}", style(new.commits).green());
    println!("New merge requests: {}", style(new.merge_requests).green());
    println!(
        "Total activities: {}",
        style(outcome.record.total_activities).cyan()
    );

    if outcome.written {
        println!(
            "Updated {} and {}",
            style(store.record_path().display()).dim(),
            style(store.report_path().display()).dim()
        );
    } else {
        println!("{}", style("Nothing new; outputs left unchanged").dim());
    }
}

fn output_overview(overview: &RecordOverview) {
    println!("{}", style("Activity Summary").bold());
    println!("{}", "─".repeat(50));
    println!("Total activities: {}", style(overview.total_activities).cyan());
    println!("Commits: {}", style(overview.summary.commits).green());
    println!(
        "Merge requests: {}",
        style(overview.summary.merge_requests).yellow()
    );
    if let (Some(earliest), Some(latest)) = (&overview.earliest, &overview.latest) {
        println!("Date range: {} to {}", style(earliest).dim(), style(latest).dim());
    }
    println!(
        "Generated at: {}",
        style(overview.generated_at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );

    if overview.projects.is_empty() {
        return;
    }
    println!();
    println!(
        "{:<40} {:>8} {:>8}",
        style("Project").bold(),
        style("Commits").bold(),
        style("MRs").bold()
    );
    for p in overview.projects.iter().take(50) {
        println!("{:<40} {:>8} {:>8}", p.project, p.commits, p.merge_requests);
    }
    if overview.projects.len() > 50 {
        println!("\n... and {} more projects", overview.projects.len() - 50);
    }
}
