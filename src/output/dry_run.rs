//! Dry-run response: what a launch would write, without writing it.

use std::path::Path;

use serde::Serialize;

use crate::config::EmulatorLayout;
use crate::ini::IniDocument;
use crate::platform::Platform;
use crate::session::{LaunchPlan, preview};
use crate::stage::{CONFIRM_STOP_KEY, CONFIRM_STOP_STAGED, SETTINGS_SECTION};

#[derive(Debug, Serialize)]
pub struct DryRunResponse {
    /// Always true in dry-run mode.
    pub dry_run: bool,
    pub platform: Platform,
    pub content: String,
    /// Command line that would be run.
    pub command: String,
    /// Composite identities of the controllers that would be bound.
    pub devices: Vec<String>,
    pub files: Vec<PlannedFile>,
    /// `None` when the settings file would be left alone.
    pub settings: Option<PlannedSetting>,
}

/// A binding or hotkeys file and its generated contents.
#[derive(Debug, Serialize)]
pub struct PlannedFile {
    pub path: String,
    /// Whether a user file would be backed up first.
    pub replaces_existing: bool,
    pub contents: String,
}

#[derive(Debug, Serialize)]
pub struct PlannedSetting {
    pub path: String,
    pub section: &'static str,
    pub key: &'static str,
    pub current: Option<String>,
    pub staged: &'static str,
}

impl DryRunResponse {
    #[must_use]
    pub fn from_plan(
        layout: &EmulatorLayout,
        plan: &LaunchPlan,
        content: &Path,
        command: String,
    ) -> Self {
        let files = preview(layout, plan)
            .into_iter()
            .map(|(path, doc)| PlannedFile {
                replaces_existing: path.exists(),
                path: path.display().to_string(),
                contents: doc.render(),
            })
            .collect();

        let settings = plan.hotkeys().map(|_| {
            let path = layout.settings_path();
            let current = IniDocument::read(&path)
                .ok()
                .and_then(|doc| doc.get(SETTINGS_SECTION, CONFIRM_STOP_KEY).map(str::to_string));
            PlannedSetting {
                path: path.display().to_string(),
                section: SETTINGS_SECTION,
                key: CONFIRM_STOP_KEY,
                current,
                staged: CONFIRM_STOP_STAGED,
            }
        });

        Self {
            dry_run: true,
            platform: plan.platform,
            content: content.display().to_string(),
            command,
            devices: plan.devices.iter().map(|d| d.identity.to_string()).collect(),
            files,
            settings,
        }
    }
}
