//! Controller enumeration through Linux evdev.
//!
//! Dolphin's evdev input backend names devices `evdev/{n}/{name}`, which is
//! what the default `device_bus` produces from the names reported here.

use std::path::Path;

use super::{DeviceEnumerator, InputDevice};
use crate::error::Result;

/// Enumerates gamepads under `/dev/input`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevEnumerator;

impl EvdevEnumerator {
    pub const fn new() -> Self {
        Self
    }
}

/// Numeric suffix of an `eventN` node, used to order devices.
fn event_index(path: Option<&Path>) -> u32 {
    path.and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix("event"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}

/// Sort devices by event node number; directory order is not stable.
fn sort_by_node(devices: &mut [InputDevice]) {
    devices.sort_by_key(|device| event_index(device.path.as_deref()));
}

#[cfg(target_os = "linux")]
impl DeviceEnumerator for EvdevEnumerator {
    fn enumerate(&self) -> Result<Vec<InputDevice>> {
        use evdev::KeyCode;
        use tracing::{debug, trace, warn};

        let mut pads = Vec::new();
        for (path, dev) in evdev::enumerate() {
            // Keyboards and mice lack BTN_SOUTH
            let is_gamepad = dev
                .supported_keys()
                .is_some_and(|keys| keys.contains(KeyCode::BTN_SOUTH));
            if !is_gamepad {
                trace!(path = %path.display(), "Skipping non-gamepad input device");
                continue;
            }
            let Some(name) = dev.name().filter(|n| !n.is_empty()) else {
                debug!(path = %path.display(), "Skipping unnamed gamepad");
                continue;
            };
            pads.push(InputDevice {
                name: name.to_string(),
                path: Some(path),
            });
        }

        sort_by_node(&mut pads);
        if pads.is_empty() {
            warn!("No readable gamepads under /dev/input (check group 'input' membership)");
        }
        Ok(pads)
    }
}

#[cfg(not(target_os = "linux"))]
impl DeviceEnumerator for EvdevEnumerator {
    fn enumerate(&self) -> Result<Vec<InputDevice>> {
        Err(crate::error::SwapError::DeviceEnumeration(
            "evdev enumeration is only available on Linux".to_string(),
        ))
    }
}
