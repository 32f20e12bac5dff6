//! Swapping generated bindings into Dolphin's config directory and back.
//!
//! [`stage`] parks the user's binding files in the backup directory,
//! writes the generated ones in their place and disables the stop
//! confirmation dialog. The returned [`StagingGuard`] puts everything back
//! when [`StagingGuard::restore`] is called or when it is dropped, which
//! covers early returns and panics. A journal next to the backups lets
//! [`recover`] finish the job after the process was killed.

mod fsops;
mod journal;

use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

pub use journal::{JOURNAL_VERSION, JournalEntry, SettingsRecord, StagingJournal};

use self::fsops::{move_file, present, remove_if_exists, sha256_file, write_atomic};
use crate::bindings::{self, HotkeyConfiguration};
use crate::config::{EmulatorLayout, ManagedFile};
use crate::error::{Result, SwapError};
use crate::ini::IniDocument;
use crate::platform::Platform;

/// Section of `Dolphin.ini` holding the stop confirmation flag.
pub const SETTINGS_SECTION: &str = "Interface";

pub const CONFIRM_STOP_KEY: &str = "ConfirmStop";

/// Value written while staged; the dialog cannot be answered with a pad.
pub const CONFIRM_STOP_STAGED: &str = "False";

/// Lifecycle of one staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    /// Nothing staged (or everything already restored).
    Idle,
    /// Generated files are in place.
    Staged,
    /// The emulator is running against the staged files.
    Launching,
    /// Originals are being moved back.
    Restoring,
}

/// What to write for one launch.
#[derive(Debug, Clone)]
pub struct StagePlan {
    pub platform: Platform,
    /// Merged binding file for `platform`.
    pub bindings: IniDocument,
    /// Stop hotkey; `None` leaves `Hotkeys.ini` and `Dolphin.ini` untouched.
    pub hotkeys: Option<HotkeyConfiguration>,
}

impl StagePlan {
    /// Binding file written for `platform`: the merged one for the
    /// launched platform and an all-disabled one for the others.
    pub fn document_for(&self, platform: Platform) -> IniDocument {
        if platform == self.platform {
            self.bindings.clone()
        } else {
            bindings::empty(platform)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of putting the user's files back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Originals moved back into place (and reverted settings).
    pub restored: Vec<PathBuf>,
    /// Generated files deleted because no original existed.
    pub removed: Vec<PathBuf>,
    /// Restored files whose content no longer matches the recorded digest.
    pub modified: Vec<PathBuf>,
    pub failures: Vec<RestoreFailure>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn failures into [`SwapError::RestoreFailed`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        Err(SwapError::RestoreFailed {
            count: self.failures.len(),
            failures: self
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.path.display(), f.reason))
                .collect(),
        })
    }

    fn fail(&mut self, path: PathBuf, err: &SwapError) {
        error!(path = %path.display(), error = %err, "Failed to restore emulator file");
        self.failures.push(RestoreFailure {
            path,
            reason: err.to_string(),
        });
    }
}

/// Log a restore outcome at the appropriate level.
pub fn log_report(report: &RestoreReport) {
    for path in &report.modified {
        warn!(path = %path.display(), "Restored file differs from the backed-up original");
    }
    if report.is_clean() {
        info!(
            restored = report.restored.len(),
            removed = report.removed.len(),
            "Emulator configuration restored"
        );
    } else {
        error!(
            failures = report.failures.len(),
            "Emulator configuration only partially restored"
        );
    }
}

fn failed_at(path: PathBuf) -> impl FnOnce(io::Error) -> SwapError {
    move |source| SwapError::StagingFailed { path, source }
}

/// Staged configuration; restores the user's files when dropped.
#[must_use = "dropping the guard restores the original files immediately"]
#[derive(Debug)]
pub struct StagingGuard {
    layout: EmulatorLayout,
    journal: StagingJournal,
    state: StageState,
}

impl StagingGuard {
    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn journal(&self) -> &StagingJournal {
        &self.journal
    }

    /// Record that the emulator is now running.
    pub fn mark_launching(&mut self) {
        self.state = StageState::Launching;
    }

    /// Put every original back.
    ///
    /// Best effort: each file is attempted even if another fails. Files that
    /// could not be restored stay in the journal for `padswap restore`.
    pub fn restore(mut self) -> RestoreReport {
        self.restore_in_place()
    }

    fn restore_in_place(&mut self) -> RestoreReport {
        if self.state == StageState::Idle {
            return RestoreReport::default();
        }
        self.state = StageState::Restoring;
        let mut report = restore_journal(&mut self.journal);
        settle_journal(&self.layout, &self.journal, &mut report);
        self.state = StageState::Idle;
        report
    }

    fn save_journal(&self) -> Result<()> {
        let path = self.layout.journal_path();
        self.journal.save(&path).map_err(failed_at(path))
    }

    fn apply(&mut self, plan: &StagePlan) -> Result<()> {
        for platform in Platform::ALL {
            let file = self.layout.binding_file(platform);
            self.swap_in(file, &plan.document_for(platform))?;
        }
        if let Some(hotkeys) = &plan.hotkeys {
            self.override_confirm_stop()?;
            let file = self.layout.hotkeys_file();
            self.swap_in(file, &hotkeys.to_document())?;
        }
        Ok(())
    }

    /// Park the file at `file.live` (if any) and write `doc` in its place.
    fn swap_in(&mut self, file: ManagedFile, doc: &IniDocument) -> Result<()> {
        if present(&file.backup) {
            return Err(SwapError::StagingFailed {
                path: file.backup,
                source: io::Error::new(ErrorKind::AlreadyExists, "a backup is already present"),
            });
        }
        let had_original = present(&file.live);
        let original_sha256 = if had_original {
            sha256_file(&file.live).ok()
        } else {
            None
        };

        self.journal.files.push(JournalEntry {
            live: file.live.clone(),
            backup: file.backup.clone(),
            had_original,
            original_sha256,
        });
        self.save_journal()?;

        if had_original {
            move_file(&file.live, &file.backup).map_err(failed_at(file.live.clone()))?;
        }
        write_atomic(&file.live, doc.render().as_bytes()).map_err(failed_at(file.live.clone()))?;
        debug!(path = %file.live.display(), had_original, "Staged file");
        Ok(())
    }

    fn override_confirm_stop(&mut self) -> Result<()> {
        let path = self.layout.settings_path();
        let file_existed = present(&path);
        let mut doc = if file_existed {
            IniDocument::read(&path).map_err(|e| match e {
                SwapError::Io(source) => SwapError::StagingFailed {
                    path: path.clone(),
                    source,
                },
                other => SwapError::StagingFailed {
                    path: path.clone(),
                    source: io::Error::new(ErrorKind::InvalidData, other.to_string()),
                },
            })?
        } else {
            IniDocument::new()
        };
        let original = doc
            .get(SETTINGS_SECTION, CONFIRM_STOP_KEY)
            .map(str::to_string);

        self.journal.settings = Some(SettingsRecord {
            path: path.clone(),
            section: SETTINGS_SECTION.to_string(),
            key: CONFIRM_STOP_KEY.to_string(),
            original: original.clone(),
            file_existed,
            section_existed: doc.has_section(SETTINGS_SECTION),
            unterminated: !doc.ends_with_newline(),
        });
        self.save_journal()?;

        doc.set(SETTINGS_SECTION, CONFIRM_STOP_KEY, CONFIRM_STOP_STAGED);
        write_atomic(&path, doc.render().as_bytes()).map_err(failed_at(path.clone()))?;
        debug!(?original, "Disabled stop confirmation");
        Ok(())
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if self.state == StageState::Idle {
            return;
        }
        warn!(state = ?self.state, "Restoring emulator configuration on early exit");
        let report = self.restore_in_place();
        log_report(&report);
    }
}

/// Stage `plan` into the emulator config directory.
///
/// The journal is written before the first file is touched. On any failure
/// everything staged so far is rolled back and the error is returned.
#[instrument(skip(layout, plan), fields(platform = %plan.platform))]
pub fn stage(layout: &EmulatorLayout, plan: &StagePlan) -> Result<StagingGuard> {
    let journal_path = layout.journal_path();
    if present(&journal_path) {
        return Err(SwapError::StagingFailed {
            path: journal_path,
            source: io::Error::new(
                ErrorKind::AlreadyExists,
                "a previous launch has not been restored",
            ),
        });
    }
    fs::create_dir_all(layout.backup_dir()).map_err(failed_at(layout.backup_dir().to_path_buf()))?;

    let mut guard = StagingGuard {
        layout: layout.clone(),
        journal: StagingJournal::new(Some(plan.platform)),
        state: StageState::Staged,
    };
    guard.save_journal()?;

    if let Err(e) = guard.apply(plan) {
        error!(error = %e, "Staging failed, rolling back");
        let report = guard.restore_in_place();
        log_report(&report);
        return Err(e);
    }

    info!(session = %guard.journal.session, "Emulator configuration staged");
    Ok(guard)
}

/// Finish restoring a launch that never got to clean up.
///
/// Uses the journal when present. Without one, any backup found in the
/// backup directory is moved back. Returns `None` when there was nothing
/// to do.
#[instrument(skip(layout))]
pub fn recover(layout: &EmulatorLayout) -> Result<Option<RestoreReport>> {
    let mut journal = match StagingJournal::load(&layout.journal_path())? {
        Some(journal) => {
            warn!(
                session = %journal.session,
                pid = journal.pid,
                started_at = %journal.started_at,
                "Found an unrestored launch"
            );
            journal
        }
        None => {
            let stray: Vec<_> = layout
                .managed_files()
                .into_iter()
                .filter(|file| present(&file.backup))
                .map(|file| JournalEntry {
                    live: file.live,
                    backup: file.backup,
                    had_original: true,
                    original_sha256: None,
                })
                .collect();
            if stray.is_empty() {
                return Ok(None);
            }
            warn!(count = stray.len(), "Found backups without a journal");
            let mut journal = StagingJournal::new(None);
            journal.files = stray;
            journal
        }
    };

    let mut report = restore_journal(&mut journal);
    settle_journal(layout, &journal, &mut report);
    log_report(&report);
    Ok(Some(report))
}

/// Restore everything `journal` records, dropping entries that succeed.
fn restore_journal(journal: &mut StagingJournal) -> RestoreReport {
    let mut report = RestoreReport::default();

    // Reverse staging order
    let mut pending = Vec::new();
    for entry in journal.files.drain(..).rev() {
        if let Err(e) = restore_entry(&entry, &mut report) {
            report.fail(entry.live.clone(), &e);
            pending.push(entry);
        }
    }
    pending.reverse();
    journal.files = pending;

    if let Some(record) = journal.settings.take() {
        if let Err(e) = restore_settings(&record, &mut report) {
            report.fail(record.path.clone(), &e);
            journal.settings = Some(record);
        }
    }
    report
}

fn restore_entry(entry: &JournalEntry, report: &mut RestoreReport) -> Result<()> {
    if present(&entry.backup) {
        move_file(&entry.backup, &entry.live)?;
        if let Some(expected) = &entry.original_sha256 {
            if sha256_file(&entry.live)? != *expected {
                report.modified.push(entry.live.clone());
            }
        }
        debug!(path = %entry.live.display(), "Restored original");
        report.restored.push(entry.live.clone());
    } else if !entry.had_original {
        if remove_if_exists(&entry.live)? {
            debug!(path = %entry.live.display(), "Removed generated file");
            report.removed.push(entry.live.clone());
        }
    } else {
        // Interrupted before the original was moved: it never left
        let untouched = match &entry.original_sha256 {
            Some(expected) => present(&entry.live) && sha256_file(&entry.live)? == *expected,
            None => present(&entry.live),
        };
        if !untouched {
            return Err(SwapError::Other(format!(
                "backup {} is missing",
                entry.backup.display()
            )));
        }
    }
    Ok(())
}

fn restore_settings(record: &SettingsRecord, report: &mut RestoreReport) -> Result<()> {
    if !present(&record.path) {
        return Ok(());
    }
    let mut doc = IniDocument::read(&record.path)?;
    match &record.original {
        Some(value) => doc.set(&record.section, &record.key, value),
        None => {
            doc.remove(&record.section, &record.key);
        }
    }
    if !record.section_existed && doc.entries(&record.section).is_empty() {
        doc.remove_section(&record.section);
    }
    // Adding the key terminated the last line
    if record.unterminated {
        doc.strip_final_newline();
    }

    if !record.file_existed && doc.sections().next().is_none() {
        remove_if_exists(&record.path)?;
        report.removed.push(record.path.clone());
    } else {
        write_atomic(&record.path, doc.render().as_bytes())?;
        report.restored.push(record.path.clone());
    }
    debug!(path = %record.path.display(), original = ?record.original, "Reverted settings");
    Ok(())
}

/// Drop the journal once settled, otherwise persist what is left.
fn settle_journal(layout: &EmulatorLayout, journal: &StagingJournal, report: &mut RestoreReport) {
    let path = layout.journal_path();
    if journal.is_settled() {
        if let Err(e) = remove_if_exists(&path) {
            warn!(path = %path.display(), error = %e, "Could not remove staging journal");
        }
        // Only succeeds once the directory is empty
        let _ = fs::remove_dir(layout.backup_dir());
    } else if let Err(e) = journal.save(&path) {
        report.fail(path, &SwapError::Io(e));
    }
}
