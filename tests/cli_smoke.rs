use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const RECORD: &str = r#"{
  "generated_at": "2024-06-11T08:00:00Z",
  "total_activities": 3,
  "summary": { "commits": 2, "merge_requests": 1 },
  "activities": [
    {"type":"MergeRequest","project":"api","date":"2024-06-10T12:00:00Z","iid":4,"sha":null,"source":"feat","target":"main","title":"Add login"},
    {"type":"Commit","project":"api","date":"2024-06-10T11:00:00Z","sha":"b2","branch":"feat","target_branch":"main","title":"Wire form","from_merge_request":true,"mr_source":"feat","mr_target":"main"},
    {"type":"Commit","project":"web","date":"2024-06-01T11:00:00Z","sha":"a1","branch":"main","target_branch":null,"title":"Bump deps","from_merge_request":false}
  ]
}"#;

fn write_record(dir: &Path) {
    fs::write(dir.join("activity.json"), RECORD).unwrap();
}

fn glactivity(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("glactivity").unwrap();
    cmd.current_dir(dir)
        .env_remove("GITLAB_TOKEN")
        .env("TZ", "UTC")
        .arg("--record")
        .arg(dir.join("activity.json"))
        .arg("--report")
        .arg(dir.join("activity.md"));
    cmd
}

#[test]
fn report_writes_grouped_markdown() {
    let dir = tempdir().unwrap();
    write_record(dir.path());

    glactivity(dir.path()).arg("report").assert().success();

    let report = fs::read_to_string(dir.path().join("activity.md")).unwrap();
    assert!(report.starts_with("# GitLab Activity\n"));
    assert_eq!(report.matches("\n## ").count(), 2);
    let commit = report.find("`feat` → `main`: Wire form").unwrap();
    let mr = report.find("!4 `feat` → `main`: Add login").unwrap();
    let older = report.find("Bump deps").unwrap();
    assert!(commit < mr && mr < older);
}

#[test]
fn report_stdout_does_not_touch_files() {
    let dir = tempdir().unwrap();
    write_record(dir.path());

    let out = glactivity(dir.path())
        .args(["report", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("### Merge Requests"));
    assert!(!dir.path().join("activity.md").exists());
}

#[test]
fn summary_json_outputs_counts() {
    let dir = tempdir().unwrap();
    write_record(dir.path());

    let out = glactivity(dir.path())
        .args(["summary", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["total_activities"], 3);
    assert_eq!(v["summary"]["commits"], 2);
    assert_eq!(v["summary"]["merge_requests"], 1);
    assert_eq!(v["projects"].as_array().map(|p| p.len()), Some(2));
}

#[test]
fn summary_without_record_fails() {
    let dir = tempdir().unwrap();
    glactivity(dir.path()).arg("summary").assert().failure();
}

#[test]
fn sync_without_token_fails() {
    let dir = tempdir().unwrap();
    glactivity(dir.path()).arg("sync").assert().failure();
    assert!(!dir.path().join("activity.json").exists());
}
