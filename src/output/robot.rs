//! Robot mode JSON output implementation.

use serde::Serialize;
use tracing::{debug, error, instrument, trace};

use crate::config::{EmulatorLayout, LoadedConfig};
use crate::device::SurveyEntry;
use crate::error::SwapError;
use crate::platform::Platform;
use crate::session::LaunchReport;
use crate::stage::RestoreReport;

use super::{DryRunResponse, Output, RobotFormat};

/// JSON output for frontends and scripting.
///
/// Results go to stdout, errors to stderr.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn render<T: Serialize + ?Sized>(&self, data: &T) -> Option<String> {
        let json = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        match json {
            Ok(json) => {
                trace!(json_len = json.len(), "JSON serialized");
                Some(json)
            }
            Err(e) => {
                error!(error = %e, "JSON serialization failed");
                None
            }
        }
    }

    /// Output any serializable data as JSON to stdout.
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        if let Some(json) = self.render(data) {
            println!("{json}");
        }
    }

    fn output_json_stderr<T: Serialize + ?Sized>(&self, data: &T) {
        if let Some(json) = self.render(data) {
            eprintln!("{json}");
        }
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &SwapError) {
        debug!(error = %error, "Robot: error");
        self.output_json_stderr(&serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
            "exit_code": error.exit_code(),
        }));
    }

    fn warning(&self, message: &str) {
        self.output_json_stderr(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    fn device_survey(&self, platform: Platform, entries: &[SurveyEntry]) {
        let devices: Vec<_> = entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "identity": entry.identity.to_string(),
                    "name": entry.device.name,
                    "node": entry.device.path,
                    "profile_path": entry.profile_path,
                    "has_profile": entry.has_profile(),
                })
            })
            .collect();
        self.output_json(&serde_json::json!({
            "platform": platform,
            "devices": devices,
        }));
    }

    fn launch_report(&self, report: &LaunchReport) {
        self.output_json(report);
    }

    fn dry_run(&self, response: &DryRunResponse) {
        self.output_json(response);
    }

    fn restore_report(&self, report: Option<&RestoreReport>) {
        self.output_json(&serde_json::json!({
            "needed": report.is_some(),
            "clean": report.is_none_or(RestoreReport::is_clean),
            "report": report,
        }));
    }

    fn config_info(&self, loaded: &LoadedConfig, layout: &EmulatorLayout) {
        self.output_json(&serde_json::json!({
            "source": loaded.source,
            "config": loaded.config,
            "layout": {
                "config_dir": layout.config_dir(),
                "backup_dir": layout.backup_dir(),
                "journal": layout.journal_path(),
                "settings": layout.settings_path(),
                "managed_files": layout.managed_files(),
            },
        }));
    }

    fn version_info(&self, version: &str, git_sha: Option<&str>, build_time: Option<&str>) {
        self.output_json(&serde_json::json!({
            "version": version,
            "git_sha": git_sha,
            "build_time": build_time,
        }));
    }
}
