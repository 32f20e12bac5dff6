//! Per-controller binding profiles.
//!
//! A profile is the `[Profile]` section of a file Dolphin saves under
//! `Profiles/GCPad` or `Profiles/Wiimote`. Keys the launcher relies on are
//! typed through [`BindingKey`]; every other key is carried verbatim and in
//! file order.

mod store;

pub use store::{ProfileLookup, ProfileStore, profile_file_name, sanitize_device_name};

use std::fmt;

use serde::Serialize;

use crate::platform::Platform;

/// Section holding the bindings inside a profile file.
pub const PROFILE_SECTION: &str = "Profile";

/// `Source` value for a slot bound to a local device.
pub const SOURCE_LOCAL: &str = "1";

/// `Source` value for an unused slot.
pub const SOURCE_DISABLED: &str = "0";

/// A binding key, with the ones the launcher reads or writes spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    Device,
    Source,
    ButtonA,
    ButtonB,
    ButtonHome,
    Hotkey,
    Other(String),
}

impl BindingKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "Device" => Self::Device,
            "Source" => Self::Source,
            "Buttons/A" => Self::ButtonA,
            "Buttons/B" => Self::ButtonB,
            "Buttons/Home" => Self::ButtonHome,
            "Hotkey" => Self::Hotkey,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Device => "Device",
            Self::Source => "Source",
            Self::ButtonA => "Buttons/A",
            Self::ButtonB => "Buttons/B",
            Self::ButtonHome => "Buttons/Home",
            Self::Hotkey => "Hotkey",
            Self::Other(key) => key,
        }
    }

    /// Key whose binding acts as the home/system button on `platform`.
    pub const fn home_for(platform: Platform) -> Self {
        match platform {
            Platform::Gc => Self::Hotkey,
            Platform::Wii => Self::ButtonHome,
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BindingKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered bindings loaded from one profile file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingProfile {
    entries: Vec<(BindingKey, String)>,
}

impl BindingProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from `(key, value)` pairs, keeping their order.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, value)| (BindingKey::parse(key), value.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &BindingKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Set a binding, replacing in place or appending at the end.
    pub fn set(&mut self, key: BindingKey, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, &str)> {
        self.entries.iter().map(|(key, value)| (key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
