//! Device information types.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::profile::BindingProfile;

/// A controller reported by the input subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDevice {
    /// Name reported by the device.
    pub name: String,
    /// Device node, when the backend has one (e.g. `/dev/input/event5`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl InputDevice {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }
}

/// Disambiguated device name as Dolphin expects it in a `Device` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceIdentity {
    pub bus: String,
    /// Index among devices sharing `bus` and `name`, starting at 0.
    pub slot: u32,
    pub name: String,
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bus, self.slot, self.name)
    }
}

/// A controller that has a saved profile for the active platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDevice {
    pub identity: DeviceIdentity,
    pub device: InputDevice,
    pub profile: BindingProfile,
}

/// One enumerated controller and the outcome of its profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyEntry {
    pub identity: DeviceIdentity,
    pub device: InputDevice,
    /// File the profile was (or would have been) read from.
    pub profile_path: PathBuf,
    #[serde(skip)]
    pub profile: Option<BindingProfile>,
}

impl SurveyEntry {
    pub const fn has_profile(&self) -> bool {
        self.profile.is_some()
    }
}
