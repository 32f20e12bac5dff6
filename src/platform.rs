//! Emulated input families and their fixed configuration namespaces.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// Token Dolphin uses to AND input expressions together.
pub const AND_COMBINATOR: &str = "&";

/// Number of player slots written by [`crate::bindings::empty`].
pub const PLAYER_SLOTS: usize = 4;

/// The console whose controller namespace is active for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GameCube controllers (`GCPadNew.ini`)
    #[value(alias = "gamecube")]
    Gc,
    /// Wii remotes (`WiimoteNew.ini`)
    Wii,
}

impl Platform {
    /// Every platform whose binding file is managed during a launch.
    pub const ALL: [Self; 2] = [Self::Gc, Self::Wii];

    /// Section name prefix in the binding file (`GCPad1`, `Wiimote1`, ...).
    pub const fn section_prefix(self) -> &'static str {
        match self {
            Self::Gc => "GCPad",
            Self::Wii => "Wiimote",
        }
    }

    /// Binding file name inside the emulator config directory.
    pub const fn binding_file(self) -> &'static str {
        match self {
            Self::Gc => "GCPadNew.ini",
            Self::Wii => "WiimoteNew.ini",
        }
    }

    /// Profile directory relative to the emulator config directory.
    pub const fn profile_subdir(self) -> &'static str {
        match self {
            Self::Gc => "Profiles/GCPad",
            Self::Wii => "Profiles/Wiimote",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gc => "gc",
            Self::Wii => "wii",
        }
    }

    /// Section name for a 1-based player slot.
    pub fn section_name(self, slot: usize) -> String {
        format!("{}{slot}", self.section_prefix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gc" | "gamecube" => Ok(Self::Gc),
            "wii" => Ok(Self::Wii),
            other => Err(SwapError::ConfigInvalid(format!(
                "Unknown platform '{other}': expected gc or wii"
            ))),
        }
    }
}
