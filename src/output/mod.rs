//! Output mode abstraction for robot and human output.

use crate::cli::Cli;
use crate::config::{EmulatorLayout, LoadedConfig};
use crate::device::SurveyEntry;
use crate::error::SwapError;
use crate::platform::Platform;
use crate::session::LaunchReport;
use crate::stage::RestoreReport;

pub mod dry_run;
pub mod human;
pub mod robot;

pub use dry_run::{DryRunResponse, PlannedFile, PlannedSetting};
pub use human::HumanOutput;
pub use robot::RobotOutput;

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// JSON output for frontends and scripting.
    Robot(RobotFormat),
    /// Styled terminal output.
    Human,
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human
        }
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human => Box::new(HumanOutput::new()),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn error(&self, error: &SwapError);
    fn warning(&self, message: &str);

    // Commands
    fn device_survey(&self, platform: Platform, entries: &[SurveyEntry]);
    fn launch_report(&self, report: &LaunchReport);
    fn dry_run(&self, response: &DryRunResponse);
    /// `None` when nothing was left to restore.
    fn restore_report(&self, report: Option<&RestoreReport>);
    fn config_info(&self, loaded: &LoadedConfig, layout: &EmulatorLayout);

    // Metadata
    fn version_info(&self, version: &str, git_sha: Option<&str>, build_time: Option<&str>);
}
