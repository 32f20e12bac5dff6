//! Builds the binding and hotkey files written for a launch.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::device::ResolvedDevice;
use crate::error::{Result, SwapError};
use crate::ini::IniDocument;
use crate::platform::{AND_COMBINATOR, PLAYER_SLOTS, Platform};
use crate::profile::{BindingKey, SOURCE_DISABLED, SOURCE_LOCAL};

/// Section of the hotkeys file.
pub const HOTKEYS_SECTION: &str = "Hotkeys";

/// Hotkey that stops emulation.
pub const STOP_KEY: &str = "General/Stop";

/// Stop hotkey bound to the first controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotkeyConfiguration {
    /// Composite identity of the controller the combo is read from.
    pub device: String,
    /// Home, confirm and cancel bindings AND-ed together.
    pub stop_combo: String,
}

impl HotkeyConfiguration {
    /// Derive the stop combo from a controller's profile.
    ///
    /// Reads the confirm (`Buttons/A`), cancel (`Buttons/B`) and the
    /// platform's home binding; any of them missing is fatal.
    pub fn from_device(device: &ResolvedDevice, platform: Platform) -> Result<Self> {
        let read = |key: BindingKey| {
            device
                .profile
                .get(&key)
                .map(str::to_string)
                .ok_or_else(|| SwapError::MissingHotkeySource {
                    device: device.device.name.clone(),
                    key: key.as_str().to_string(),
                })
        };
        let confirm = read(BindingKey::ButtonA)?;
        let cancel = read(BindingKey::ButtonB)?;
        let home = read(BindingKey::home_for(platform))?;

        Ok(Self {
            device: device.identity.to_string(),
            stop_combo: [home, confirm, cancel].join(AND_COMBINATOR),
        })
    }

    /// Render as a `[Hotkeys]` document.
    pub fn to_document(&self) -> IniDocument {
        let mut doc = IniDocument::new();
        doc.add_section(HOTKEYS_SECTION);
        doc.set(HOTKEYS_SECTION, BindingKey::Device.as_str(), &self.device);
        doc.set(HOTKEYS_SECTION, STOP_KEY, &self.stop_combo);
        doc
    }
}

/// Merge resolved controllers into one binding file.
///
/// Controller `n` (1-based, resolution order) becomes section
/// `{prefix}{n}`: its profile with `Device` set to the composite identity
/// and `Source` set to local.
pub fn merge(devices: &[ResolvedDevice], platform: Platform) -> IniDocument {
    let mut doc = IniDocument::new();
    for (index, device) in devices.iter().enumerate() {
        let section = platform.section_name(index + 1);
        let mut profile = device.profile.clone();
        profile.set(BindingKey::Device, device.identity.to_string());
        profile.set(BindingKey::Source, SOURCE_LOCAL);

        doc.add_section(&section);
        for (key, value) in profile.iter() {
            doc.set(&section, key.as_str(), value);
        }
        debug!(section = %section, identity = %device.identity, "Merged controller profile");
    }
    doc
}

/// Placeholder binding file with every player slot disabled.
pub fn empty(platform: Platform) -> IniDocument {
    let mut doc = IniDocument::new();
    for slot in 1..=PLAYER_SLOTS {
        let section = platform.section_name(slot);
        doc.add_section(&section);
        doc.set(&section, BindingKey::Source.as_str(), SOURCE_DISABLED);
    }
    doc
}

/// Build both the merged binding file and the stop hotkey.
///
/// The hotkey comes from the first controller, so at least one is required.
#[instrument(skip(devices), fields(devices = devices.len()))]
pub fn synthesize(
    devices: &[ResolvedDevice],
    platform: Platform,
) -> Result<(IniDocument, HotkeyConfiguration)> {
    let first = devices.first().ok_or_else(|| SwapError::NoDevicesFound {
        platform: platform.to_string(),
    })?;
    let hotkeys = HotkeyConfiguration::from_device(first, platform)?;
    Ok((merge(devices, platform), hotkeys))
}
