use crate::error::{ActivityError, Result};
use crate::model::{Activity, ActivityRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What the previous run left behind.
#[derive(Debug, Clone, Default)]
pub struct PriorState {
    pub record: Option<ActivityRecord>,
}

impl PriorState {
    pub fn activities(&self) -> &[Activity] {
        self.record
            .as_ref()
            .map(|r| r.activities.as_slice())
            .unwrap_or(&[])
    }
}

/// Location of the structured record and the text report.
pub struct RecordStore {
    record_path: PathBuf,
    report_path: PathBuf,
}

impl RecordStore {
    pub fn new<RP: AsRef<Path>, TP: AsRef<Path>>(record_path: RP, report_path: TP) -> Self {
        Self {
            record_path: record_path.as_ref().to_path_buf(),
            report_path: report_path.as_ref().to_path_buf(),
        }
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Loads the prior record. A missing file is an empty state. A file that
    /// does not parse is moved aside to `<record>.bak` and also treated as
    /// empty, so the next save cannot destroy it.
    pub fn load(&self) -> Result<PriorState> {
        let text = match fs::read_to_string(&self.record_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.record_path.display(), "no prior record");
                return Ok(PriorState::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<ActivityRecord>(&text) {
            Ok(record) => Ok(PriorState {
                record: Some(record),
            }),
            Err(e) => {
                let backup = self.backup_path();
                fs::rename(&self.record_path, &backup)?;
                warn!(
                    path = %self.record_path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "prior record is not readable; moved aside, starting from an empty record"
                );
                Ok(PriorState::default())
            }
        }
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.record_path, ".bak")
    }

    /// Loads the record for offline commands, where its absence is an error.
    pub fn load_record(&self) -> Result<ActivityRecord> {
        let text = fs::read_to_string(&self.record_path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ActivityError::Config(format!(
                    "no activity record at {}; run `glactivity sync` first",
                    self.record_path.display()
                ))
            } else {
                e.into()
            }
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, record: &ActivityRecord, report: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        write_replacing(&self.record_path, &json)?;
        self.save_report(report)
    }

    pub fn save_report(&self, report: &str) -> Result<()> {
        write_replacing(&self.report_path, report)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes next to `path` and renames over it, so readers never see a
/// half-written file.
fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
