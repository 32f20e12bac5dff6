//! Launcher configuration.
//!
//! Settings come from an optional TOML or YAML file. Every field has a
//! default matching a RetroPie Dolphin install, so running without a config
//! file works out of the box.

mod layout;
mod path;

pub use layout::{EmulatorLayout, ManagedFile};
pub use path::{default_config_path, home_dir, resolve_path};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::error::{Result, SwapError};

/// Bus name of Dolphin's evdev input backend.
pub const EVDEV_BUS: &str = "evdev";

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml).
    Yaml,
    /// TOML format (.toml).
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        trace!(extension = %ext, "Detecting config format from extension");
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Launcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Dolphin's user config directory (holds `GCPadNew.ini`, `Dolphin.ini`, ...).
    pub emulator_config_dir: PathBuf,

    /// Emulator executable.
    pub emulator: PathBuf,

    /// Arguments placed before the content path.
    pub emulator_args: Vec<String>,

    /// Where originals are parked while a launch runs.
    ///
    /// Defaults to `.padswap` inside the emulator config directory so that
    /// backups stay on the same filesystem and moves are atomic renames.
    pub backup_dir: Option<PathBuf>,

    /// Input backend written as the `{bus}` part of `Device` values.
    ///
    /// Only `evdev` is accepted: controller names are read through evdev,
    /// and Dolphin's other backends (SDL) name the same pads differently.
    pub device_bus: String,

    /// Launch even when no attached controller has a saved profile.
    pub allow_no_devices: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            emulator_config_dir: PathBuf::from("/opt/retropie/configs/gc/Config"),
            emulator: PathBuf::from("/opt/retropie/emulators/dolphin/bin/dolphin-emu"),
            emulator_args: vec!["-b".to_string(), "-e".to_string()],
            backup_dir: None,
            device_bus: EVDEV_BUS.to_string(),
            allow_no_devices: false,
        }
    }
}

impl AppConfig {
    /// Parse configuration text in the given format.
    pub fn from_str_with_format(text: &str, format: ConfigFormat) -> Result<Self> {
        let config: Self = match format {
            ConfigFormat::Toml => {
                toml::from_str(text).map_err(|e| SwapError::ConfigParse(e.to_string()))?
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| SwapError::ConfigParse(e.to_string()))?
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.device_bus != EVDEV_BUS {
            return Err(SwapError::ConfigInvalid(format!(
                "device_bus '{}' is not supported; controller names come from evdev, so only '{EVDEV_BUS}' matches Dolphin",
                self.device_bus
            )));
        }
        if self.emulator.as_os_str().is_empty() {
            return Err(SwapError::ConfigInvalid("emulator must not be empty".to_string()));
        }
        Ok(())
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_paths(mut self, base_dir: &Path) -> Result<Self> {
        self.emulator_config_dir = resolve_path(&self.emulator_config_dir, base_dir)?;
        if self.emulator.components().count() > 1 || self.emulator.starts_with("~") {
            self.emulator = resolve_path(&self.emulator, base_dir)?;
        }
        if let Some(dir) = self.backup_dir.take() {
            self.backup_dir = Some(resolve_path(&dir, base_dir)?);
        }
        Ok(self)
    }
}

/// Configuration together with the file it came from.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// `None` when built-in defaults are in use.
    pub source: Option<PathBuf>,
}

/// Load configuration.
///
/// An explicit path (from `--config` or `PADSWAP_CONFIG`) must exist. Without
/// one, the default location is used when present and built-in defaults
/// otherwise.
#[instrument]
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(SwapError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let Some(path) = path else {
        debug!("No config file, using defaults");
        let cwd = std::env::current_dir()?;
        return Ok(LoadedConfig {
            config: AppConfig::default().resolve_paths(&cwd)?,
            source: None,
        });
    };

    load_file(&path)
}

/// Load a specific configuration file.
pub fn load_file(path: &Path) -> Result<LoadedConfig> {
    let format = ConfigFormat::from_extension(path).ok_or_else(|| {
        SwapError::ConfigParse(format!(
            "Unsupported config format for {}: expected .toml, .yaml or .yml",
            path.display()
        ))
    })?;
    let text = std::fs::read_to_string(path)?;
    let base_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let config = AppConfig::from_str_with_format(&text, format)?.resolve_paths(&base_dir)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(LoadedConfig {
        config,
        source: Some(path.to_path_buf()),
    })
}
