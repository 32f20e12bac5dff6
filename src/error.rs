//! Error types for padswap operations.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for padswap operations.
#[derive(Error, Debug)]
pub enum SwapError {
    // Device errors
    #[error("No attached controller has a saved {platform} profile")]
    NoDevicesFound { platform: String },

    #[error("Controller enumeration failed: {0}")]
    DeviceEnumeration(String),

    // Profile errors
    #[error("Profile {path} is corrupt: {reason}")]
    ProfileCorrupt { path: PathBuf, reason: String },

    #[error("Profile for '{device}' has no '{key}' binding, cannot build a stop hotkey")]
    MissingHotkeySource { device: String, key: String },

    // Staging errors
    #[error("Staging {path} failed: {source}")]
    StagingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {executable}: {reason}")]
    LaunchFailed { executable: String, reason: String },

    #[error("Failed to restore {count} emulator file(s): {}", .failures.join("; "))]
    RestoreFailed { count: usize, failures: Vec<String> },

    #[error("Interrupted by signal")]
    Interrupted,

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("{path}:{line}: {reason}")]
    IniParse {
        path: String,
        line: usize,
        reason: String,
    },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SwapError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoDevicesFound { .. }
                | Self::ProfileCorrupt { .. }
                | Self::MissingHotkeySource { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse(_)
                | Self::ConfigInvalid(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoDevicesFound { .. } => {
                Some("Save a controller profile in Dolphin, or pass --allow-no-devices")
            }
            Self::ProfileCorrupt { .. } => Some("Re-save the profile from Dolphin's controller settings"),
            Self::MissingHotkeySource { .. } => {
                Some("Bind Buttons/A, Buttons/B and the hotkey/home button in the first controller's profile")
            }
            Self::StagingFailed { .. } | Self::RestoreFailed { .. } => {
                Some("Run: padswap restore")
            }
            Self::LaunchFailed { .. } => Some("Check the 'emulator' path in the configuration"),
            Self::ConfigNotFound { .. } => Some("Check --config or PADSWAP_CONFIG"),
            _ => None,
        }
    }

    /// Process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NoDevicesFound { .. } | Self::DeviceEnumeration(_) => 2,
            Self::ProfileCorrupt { .. } | Self::MissingHotkeySource { .. } => 3,
            Self::StagingFailed { .. } | Self::RestoreFailed { .. } => 4,
            Self::LaunchFailed { .. } => 5,
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Convenience type alias for Results using SwapError.
pub type Result<T> = std::result::Result<T, SwapError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| SwapError::Other(format!("{}: {e}", f().into())))
    }
}
