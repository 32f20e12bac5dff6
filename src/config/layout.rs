//! Resolved locations of every file a launch reads or replaces.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::AppConfig;
use crate::platform::Platform;

/// Hotkey bindings file name.
pub const HOTKEYS_FILE: &str = "Hotkeys.ini";

/// Dolphin's general settings file name.
pub const SETTINGS_FILE: &str = "Dolphin.ini";

/// Journal describing an in-progress staging.
pub const JOURNAL_FILE: &str = "staging.json";

/// A file that is swapped out for the duration of a launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedFile {
    /// Path the emulator reads.
    pub live: PathBuf,
    /// Where the user's original is kept while staged.
    pub backup: PathBuf,
}

impl ManagedFile {
    fn new(config_dir: &Path, backup_dir: &Path, name: &str) -> Self {
        Self {
            live: config_dir.join(name),
            backup: backup_dir.join(name),
        }
    }
}

/// Every emulator path used by one launch, resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmulatorLayout {
    config_dir: PathBuf,
    backup_dir: PathBuf,
}

impl EmulatorLayout {
    pub fn new(config_dir: impl Into<PathBuf>, backup_dir: Option<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let backup_dir = backup_dir.unwrap_or_else(|| config_dir.join(".padswap"));
        Self {
            config_dir,
            backup_dir,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.emulator_config_dir, config.backup_dir.clone())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn binding_file(&self, platform: Platform) -> ManagedFile {
        ManagedFile::new(&self.config_dir, &self.backup_dir, platform.binding_file())
    }

    pub fn hotkeys_file(&self) -> ManagedFile {
        ManagedFile::new(&self.config_dir, &self.backup_dir, HOTKEYS_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    pub fn profile_dir(&self, platform: Platform) -> PathBuf {
        self.config_dir.join(platform.profile_subdir())
    }

    pub fn journal_path(&self) -> PathBuf {
        self.backup_dir.join(JOURNAL_FILE)
    }

    /// Binding files of all platforms followed by the hotkeys file.
    pub fn managed_files(&self) -> Vec<ManagedFile> {
        Platform::ALL
            .iter()
            .map(|&platform| self.binding_file(platform))
            .chain(std::iter::once(self.hotkeys_file()))
            .collect()
    }
}
