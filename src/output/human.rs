//! Human-friendly terminal output.
//!
//! Results go to stdout; errors, warnings and the restore summary of a
//! launch go to stderr so they are not lost when stdout is redirected.

use console::{Term, style};
use tracing::{debug, instrument};

use crate::config::{EmulatorLayout, LoadedConfig};
use crate::device::SurveyEntry;
use crate::error::SwapError;
use crate::launcher::LaunchOutcome;
use crate::platform::Platform;
use crate::session::LaunchReport;
use crate::stage::RestoreReport;

use super::{DryRunResponse, Output};

/// Styled terminal output for human users.
pub struct HumanOutput {
    stdout: Term,
    stderr: Term,
}

impl HumanOutput {
    pub fn new() -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
        }
    }

    fn out(&self, line: &str) {
        let _ = self.stdout.write_line(line);
    }

    fn err(&self, line: &str) {
        let _ = self.stderr.write_line(line);
    }

    fn success(&self, message: &str) {
        self.out(&format!("{} {message}", style("[OK]").green().bold()));
    }

    fn label(name: &str) -> String {
        style(format!("  {name:<12}")).dim().to_string()
    }

    /// Content warnings only; failures are reported through [`Output::error`].
    fn restore_lines(&self, report: &RestoreReport) {
        for path in &report.modified {
            self.err(&format!(
                "{} {} changed while it was backed up",
                style("[WARN]").yellow().bold(),
                path.display()
            ));
        }
        debug!(
            restored = report.restored.len(),
            removed = report.removed.len(),
            failures = report.failures.len(),
            "Restore summary"
        );
    }
}

impl Default for HumanOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &SwapError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        self.err(&format!(
            "{} {}",
            style("Error:").red().bold(),
            style(error).bold()
        ));
        if let SwapError::RestoreFailed { failures, .. } = error {
            for failure in failures {
                self.err(&format!("    - {failure}"));
            }
        }
        if let Some(suggestion) = error.suggestion() {
            self.err(&format!("  {} {}", style("Suggestion:").dim(), suggestion));
        }
    }

    fn warning(&self, message: &str) {
        self.err(&format!("{} {message}", style("[WARN]").yellow().bold()));
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    fn device_survey(&self, platform: Platform, entries: &[SurveyEntry]) {
        if entries.is_empty() {
            self.out("No game controllers found.");
            return;
        }
        self.out(&format!(
            "{} controller(s), {} profiles:",
            entries.len(),
            style(platform).bold()
        ));
        for entry in entries {
            let status = if entry.has_profile() {
                style("profile").green().to_string()
            } else {
                style("no profile").yellow().to_string()
            };
            self.out(&format!("  {}  [{status}]", style(&entry.identity).bold()));
            self.out(&format!(
                "      {}",
                style(entry.profile_path.display()).dim()
            ));
        }
    }

    fn launch_report(&self, report: &LaunchReport) {
        if let Some(recovered) = &report.recovered {
            self.err(&format!(
                "{} Restored {} file(s) left over from an earlier launch",
                style("[INFO]").cyan().bold(),
                recovered.restored.len() + recovered.removed.len()
            ));
        }
        match report.outcome {
            LaunchOutcome::Exited { code: 0 } => {}
            LaunchOutcome::Exited { code } => {
                self.err(&format!(
                    "{} Emulator exited with code {code}",
                    style("[WARN]").yellow().bold()
                ));
            }
            LaunchOutcome::Interrupted => {
                self.err(&format!(
                    "{} Interrupted, emulator stopped",
                    style("[WARN]").yellow().bold()
                ));
            }
        }
        self.restore_lines(&report.restore);
    }

    fn dry_run(&self, response: &DryRunResponse) {
        self.out(&format!(
            "{} nothing will be written",
            style("Dry run:").cyan().bold()
        ));
        self.out(&format!("{}{}", Self::label("Command"), response.command));
        if response.devices.is_empty() {
            self.out(&format!("{}{}", Self::label("Controllers"), style("none").yellow()));
        }
        for (i, device) in response.devices.iter().enumerate() {
            let name = if i == 0 { "Controllers" } else { "" };
            self.out(&format!("{}{device}", Self::label(name)));
        }
        if let Some(setting) = &response.settings {
            self.out(&format!(
                "{}[{}] {}: {} -> {}",
                Self::label("Settings"),
                setting.section,
                setting.key,
                setting.current.as_deref().unwrap_or("(unset)"),
                setting.staged
            ));
        }
        for file in &response.files {
            let action = if file.replaces_existing { "replace" } else { "create" };
            self.out("");
            self.out(&format!(
                "{} {}",
                style(format!("# {action}")).dim(),
                style(&file.path).bold()
            ));
            for line in file.contents.lines() {
                self.out(&format!("  {line}"));
            }
        }
    }

    fn restore_report(&self, report: Option<&RestoreReport>) {
        let Some(report) = report else {
            self.success("Nothing to restore");
            return;
        };
        for path in &report.restored {
            self.out(&format!("  restored  {}", path.display()));
        }
        for path in &report.removed {
            self.out(&format!("  removed   {}", path.display()));
        }
        self.restore_lines(report);
        if report.is_clean() {
            self.success("Emulator configuration restored");
        }
    }

    fn config_info(&self, loaded: &LoadedConfig, layout: &EmulatorLayout) {
        let config = &loaded.config;
        let source = loaded
            .source
            .as_ref()
            .map_or_else(|| "(built-in defaults)".to_string(), |p| p.display().to_string());

        self.out(&format!("{}{source}", Self::label("Source")));
        self.out(&format!(
            "{}{}",
            Self::label("Config dir"),
            layout.config_dir().display()
        ));
        self.out(&format!(
            "{}{}",
            Self::label("Backups"),
            layout.backup_dir().display()
        ));
        self.out(&format!(
            "{}{} {}",
            Self::label("Emulator"),
            config.emulator.display(),
            config.emulator_args.join(" ")
        ));
        self.out(&format!("{}{}", Self::label("Device bus"), config.device_bus));
        self.out(&format!(
            "{}{}",
            Self::label("No devices"),
            if config.allow_no_devices { "launch anyway" } else { "refuse" }
        ));
    }

    fn version_info(&self, version: &str, git_sha: Option<&str>, build_time: Option<&str>) {
        self.out(&format!("padswap {}", style(version).bold()));
        if let Some(sha) = git_sha {
            self.out(&format!("{}{sha}", Self::label("Git SHA")));
        }
        if let Some(time) = build_time {
            self.out(&format!("{}{}", Self::label("Built"), style(time).dim()));
        }
        if let Some(rustc) = option_env!("VERGEN_RUSTC_SEMVER") {
            self.out(&format!("{}{}", Self::label("Rust"), style(rustc).dim()));
        }
        if let Some(target) = option_env!("VERGEN_CARGO_TARGET_TRIPLE") {
            self.out(&format!("{}{}", Self::label("Target"), style(target).dim()));
        }
    }
}
