//! Running the emulator as a blocking child process.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;
use crate::error::{Result, SwapError};
use crate::signal::SignalState;

/// How often the child is polled for exit and the signal flag checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How the emulator run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// The emulator exited on its own. Death by signal `n` is `128 + n`.
    Exited { code: i32 },
    /// A signal arrived; the emulator was killed (or never started).
    Interrupted,
}

impl LaunchOutcome {
    /// Exit code padswap should terminate with.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Exited { code } => code,
            Self::Interrupted => crate::signal::EXIT_CODE_INTERRUPTED,
        }
    }
}

/// Something that runs content to completion.
pub trait Launch {
    /// Run `content`, blocking until it exits or `signals` requests a stop.
    fn launch(&self, content: &Path, signals: &SignalState) -> Result<LaunchOutcome>;

    /// Human-readable command line, for logs and dry runs.
    fn describe(&self, content: &Path) -> String;
}

/// Launches the configured Dolphin executable.
#[derive(Debug, Clone)]
pub struct EmulatorLauncher {
    executable: PathBuf,
    args: Vec<String>,
    poll_interval: Duration,
}

impl EmulatorLauncher {
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.emulator, config.emulator_args.clone())
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Configured arguments followed by the content path.
    pub fn command(&self, content: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command.args(&self.args).arg(content);
        command
    }

    fn launch_failed(&self, reason: impl ToString) -> SwapError {
        SwapError::LaunchFailed {
            executable: self.executable.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Exit code of a finished child, mapping signal deaths to `128 + n`.
pub fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

impl Launch for EmulatorLauncher {
    #[instrument(skip(self, signals), fields(executable = %self.executable.display()))]
    fn launch(&self, content: &Path, signals: &SignalState) -> Result<LaunchOutcome> {
        if signals.is_cancel_requested() {
            info!("Interrupted before the emulator started");
            return Ok(LaunchOutcome::Interrupted);
        }

        info!(command = %self.describe(content), "Starting emulator");
        let mut child = self
            .command(content)
            .spawn()
            .map_err(|e| self.launch_failed(e))?;
        debug!(pid = child.id(), "Emulator started");

        loop {
            if signals.is_cancel_requested() {
                warn!(pid = child.id(), "Stopping emulator after signal");
                let _ = child.kill();
                let _ = child.wait();
                return Ok(LaunchOutcome::Interrupted);
            }

            match child.try_wait() {
                Ok(Some(status)) => {
                    let code = status_code(status);
                    info!(code, "Emulator exited");
                    return Ok(LaunchOutcome::Exited { code });
                }
                Ok(None) => std::thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.launch_failed(format!("lost track of the process: {e}")));
                }
            }
        }
    }

    fn describe(&self, content: &Path) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.args.iter().cloned())
            .chain(std::iter::once(content.display().to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
