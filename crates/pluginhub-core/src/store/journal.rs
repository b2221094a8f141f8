//! JSONL append-only journal for the memory store.
//!
//! Every registration and every committed transaction is appended as one
//! newline-delimited JSON record. On open, the journal is replayed to
//! rebuild the store. A transaction is a single line, so a torn write loses
//! the whole transaction rather than half of it. A torn tail is closed off
//! before the next append so later records always start on a fresh line.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pluginhub_types::{PackageStatus, PluginConfig, PluginPackage, PluginPackageEntity, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A state change recorded in the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEvent {
    /// A package was registered or replaced.
    PackageRegistered { package: PluginPackage },
    /// The installer moved a package to a new status.
    PackageStatusChanged { package_id: i64, status: PackageStatus },
    /// A domain entity became available.
    EntityRegistered { entity: PluginPackageEntity },
    /// A transaction committed these configuration records.
    ConfigsCommitted { configs: Vec<PluginConfig> },
}

/// One journal line.
#[derive(Debug, Serialize, Deserialize)]
struct JournalRecord {
    at: DateTime<Utc>,
    #[serde(flatten)]
    event: JournalEvent,
}

/// Append-only JSONL journal file.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Create a journal backed by `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event followed by a newline.
    pub fn append(&self, event: &JournalEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let record = JournalRecord {
            at: Utc::now(),
            event: event.clone(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if ends_mid_line(&mut file)? {
            warn!(
                path = %self.path.display(),
                "journal ends with a torn record, starting a new line"
            );
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Read every valid event in append order.
    ///
    /// A missing file is an empty journal. Invalid lines are skipped with a
    /// warning.
    pub fn load_events(&self) -> Result<Vec<JournalEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut events = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => events.push(record.event),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        error = %e,
                        "skipping invalid journal line"
                    );
                }
            }
        }

        debug!(path = %self.path.display(), events = events.len(), "loaded journal");
        Ok(events)
    }
}

/// Whether a non-empty file lacks its trailing newline.
fn ends_mid_line(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
