//! On-disk record of an in-progress staging.
//!
//! The journal is written before any emulator file is touched and updated
//! before each step, so a later run can put every file back even if this
//! process was killed outright.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fsops::write_atomic;
use crate::error::{Result, SwapError};
use crate::platform::Platform;

/// Journal format version.
pub const JOURNAL_VERSION: u32 = 1;

/// One swapped-out binding or hotkeys file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub live: PathBuf,
    pub backup: PathBuf,
    /// Whether a user file existed at `live` before staging.
    pub had_original: bool,
    /// Digest of the user file, checked after it is moved back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sha256: Option<String>,
}

/// The single `[Interface] ConfirmStop` override in `Dolphin.ini`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub path: PathBuf,
    pub section: String,
    pub key: String,
    /// Value before staging; `None` if the key was absent.
    pub original: Option<String>,
    /// Whether the file existed before staging.
    pub file_existed: bool,
    /// Whether the section existed before staging.
    pub section_existed: bool,
    /// Whether the file's last line had no terminator before staging.
    #[serde(default)]
    pub unterminated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingJournal {
    pub version: u32,
    pub session: Uuid,
    pub started_at: DateTime<Utc>,
    pub pid: u32,
    /// Platform that was launched; `None` for journals rebuilt from stray backups.
    pub platform: Option<Platform>,
    #[serde(default)]
    pub files: Vec<JournalEntry>,
    #[serde(default)]
    pub settings: Option<SettingsRecord>,
}

impl StagingJournal {
    pub fn new(platform: Option<Platform>) -> Self {
        Self {
            version: JOURNAL_VERSION,
            session: Uuid::new_v4(),
            started_at: Utc::now(),
            pid: std::process::id(),
            platform,
            files: Vec::new(),
            settings: None,
        }
    }

    /// Nothing left to restore.
    pub fn is_settled(&self) -> bool {
        self.files.is_empty() && self.settings.is_none()
    }

    /// Load the journal at `path`, if one exists.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let journal: Self = serde_json::from_str(&text).map_err(|e| {
            SwapError::Other(format!("Staging journal {} is unreadable: {e}", path.display()))
        })?;
        if journal.version != JOURNAL_VERSION {
            return Err(SwapError::Other(format!(
                "Staging journal {} has unsupported version {}",
                path.display(),
                journal.version
            )));
        }
        Ok(Some(journal))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        write_atomic(path, &json)
    }
}
