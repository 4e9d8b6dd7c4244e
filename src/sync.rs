use crate::cli::{CommonArgs, SyncArgs};
use crate::collect::{collect_activities, CollectOptions};
use crate::gitlab::{ActivitySource, GitLabClient};
use crate::model::{Activity, ActivityRecord, MrKeyScheme};
use crate::reconcile::{extract_existing_identities, reconcile};
use crate::report::render_markdown;
use crate::store::RecordStore;
use crate::util::parse_since;
use anyhow::{anyhow, Context};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::collections::HashSet;
use tracing::info;

pub struct SyncSettings {
    pub email: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub mr_key: MrKeyScheme,
    pub progress: bool,
}

pub struct SyncOutcome {
    pub delta: Vec<Activity>,
    pub record: ActivityRecord,
    /// `false` when nothing was new and the files were left alone.
    pub written: bool,
}

pub fn exec(common: CommonArgs, args: SyncArgs) -> anyhow::Result<()> {
    let token = common
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("an access token is required (--token or GITLAB_TOKEN)"))?;
    let client = GitLabClient::new(&common.url, token).context("Failed to create GitLab client")?;

    let now = Utc::now();
    let since = args
        .since
        .as_deref()
        .map(|s| parse_since(s, now))
        .transpose()
        .context("Failed to parse --since")?;

    let store = RecordStore::new(&common.record, &common.report);
    let settings = SyncSettings {
        email: args.email,
        since,
        mr_key: args.mr_key,
        progress: !args.quiet && !args.json,
    };

    let outcome = sync(&client, &store, &settings, now, &Local)?;

    if args.json {
        crate::output::output_delta_json(&outcome.delta)?;
    } else {
        crate::output::output_delta_summary(&outcome, &store);
    }
    Ok(())
}

/// Fetches, reconciles and, when anything changed, writes both outputs.
pub fn sync<S: ActivitySource, Tz: TimeZone>(
    source: &S,
    store: &RecordStore,
    settings: &SyncSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> anyhow::Result<SyncOutcome> {
    let user = source
        .current_user()
        .context("Failed to resolve the current user")?;
    let email = settings
        .email
        .clone()
        .or_else(|| user.commit_address().map(str::to_string))
        .ok_or_else(|| {
            anyhow!("account {} exposes no email; pass --email", user.username)
        })?;
    info!(user = %user.username, %email, "resolved user");

    let projects = source.projects().context("Failed to list projects")?;
    info!(count = projects.len(), "listed projects");

    let prior = store.load().context("Failed to read the activity record")?;
    let identities = extract_existing_identities(&prior, settings.mr_key);

    let options = CollectOptions {
        user_id: user.id,
        email,
        since: settings.since,
        progress: settings.progress,
    };
    let mut seen = HashSet::new();
    let batch = collect_activities(source, &projects, &options, &mut seen);

    let reconciled = reconcile(batch, &identities, prior.activities(), settings.mr_key);
    let written = reconciled.changed() || prior.record.is_none();

    let record = match prior.record {
        Some(record) if !written => record,
        _ => ActivityRecord::from_activities(reconciled.activities, now),
    };

    if written {
        let report = render_markdown(&record.activities, tz);
        store
            .save(&record, &report)
            .context("Failed to write the activity record")?;
        info!(new = reconciled.delta.len(), total = record.total_activities, "wrote outputs");
    } else {
        info!("no new activity");
    }

    Ok(SyncOutcome {
        delta: reconciled.delta,
        record,
        written,
    })
}
