use crate::model::MrKeyScheme;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glactivity")]
#[command(about = "Changelog of your own GitLab merge requests and commits, grouped by day")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, env = "GITLAB_URL", default_value = "https://gitlab.com", help = "GitLab base URL")]
    pub url: String,

    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true, help = "Personal access token with read_api scope")]
    pub token: Option<String>,

    #[arg(long, default_value = "gitlab-activity.json", help = "Path to the structured activity record")]
    pub record: PathBuf,

    #[arg(long, default_value = "gitlab-activity.md", help = "Path to the Markdown report")]
    pub report: PathBuf,
}

#[derive(Args, Clone)]
pub struct SyncArgs {
    #[arg(long, help = "Only walk branch commits after this date (RFC3339, YYYY-MM-DD, or 'N days ago')")]
    pub since: Option<String>,

    #[arg(long, env = "GITLAB_EMAIL", help = "Commit author email to match instead of the account's")]
    pub email: Option<String>,

    #[arg(long, value_enum, default_value_t = MrKeyScheme::Branches, help = "How merge requests are deduplicated across runs")]
    pub mr_key: MrKeyScheme,

    #[arg(long, help = "Print new activities as JSON")]
    pub json: bool,

    #[arg(long, help = "Hide the progress bar")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch activity, merge it into the record and rewrite both outputs
    Sync(SyncArgs),
    /// Regenerate the Markdown report from the stored record
    Report {
        #[arg(long, help = "Print the report instead of writing it")]
        stdout: bool,
    },
    /// Show counts from the stored record
    Summary {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sync(args) => crate::sync::exec(self.common, args),
            Commands::Report { stdout } => crate::output::exec_report(self.common, stdout),
            Commands::Summary { json } => crate::output::exec_summary(self.common, json),
        }
    }
}
