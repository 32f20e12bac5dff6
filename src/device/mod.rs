//! Controller discovery and profile matching.
//!
//! Enumeration goes through the [`DeviceEnumerator`] trait so that the
//! resolver can run against real hardware or a [`mock::MockEnumerator`].

mod info;
pub mod mock;
mod real;

pub use info::{DeviceIdentity, InputDevice, ResolvedDevice, SurveyEntry};
pub use real::EvdevEnumerator;

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::platform::Platform;
use crate::profile::{ProfileLookup, ProfileStore};

/// Source of attached controllers.
pub trait DeviceEnumerator {
    /// List attached controllers in a stable order.
    ///
    /// The order decides player slots, so identical hardware must produce
    /// identical output.
    fn enumerate(&self) -> Result<Vec<InputDevice>>;
}

/// Type alias for boxed trait object.
pub type BoxedEnumerator = Box<dyn DeviceEnumerator>;

/// Enumerator for the host's input subsystem.
pub fn system_enumerator() -> BoxedEnumerator {
    Box::new(EvdevEnumerator::new())
}

/// Assign composite identities in encounter order.
///
/// Each device gets the smallest slot that makes `{bus}/{slot}/{name}`
/// unique among the devices seen so far.
pub fn assign_identities(bus: &str, devices: &[InputDevice]) -> Vec<DeviceIdentity> {
    let mut taken = HashSet::new();
    devices
        .iter()
        .map(|device| {
            let mut slot = 0;
            loop {
                let identity = DeviceIdentity {
                    bus: bus.to_string(),
                    slot,
                    name: device.name.clone(),
                };
                if taken.insert(identity.clone()) {
                    return identity;
                }
                slot += 1;
            }
        })
        .collect()
}

/// Enumerate controllers and look up each one's profile.
///
/// Profiles are keyed by the device's reported name, not its composite
/// identity. A corrupt profile aborts the survey.
#[instrument(skip(enumerator, store))]
pub fn survey_devices(
    enumerator: &dyn DeviceEnumerator,
    store: &ProfileStore,
    platform: Platform,
    bus: &str,
) -> Result<Vec<SurveyEntry>> {
    info!("Scanning for game controllers");
    let devices = enumerator.enumerate()?;
    let identities = assign_identities(bus, &devices);

    devices
        .into_iter()
        .zip(identities)
        .map(|(device, identity)| {
            let (profile, profile_path) = match store.lookup(&device.name, platform)? {
                ProfileLookup::Found(profile) => {
                    (Some(profile), store.path_for(&device.name, platform))
                }
                ProfileLookup::NotFound { path } => (None, path),
            };
            debug!(
                identity = %identity,
                matched = profile.is_some(),
                "Surveyed controller"
            );
            Ok(SurveyEntry {
                identity,
                device,
                profile_path,
                profile,
            })
        })
        .collect()
}

/// Resolve the controllers that take part in this launch.
///
/// Devices without a saved profile are left out; order is preserved. An
/// empty result is returned as-is and left to the caller's policy.
pub fn resolve_devices(
    enumerator: &dyn DeviceEnumerator,
    store: &ProfileStore,
    platform: Platform,
    bus: &str,
) -> Result<Vec<ResolvedDevice>> {
    let resolved: Vec<_> = survey_devices(enumerator, store, platform, bus)?
        .into_iter()
        .filter_map(|entry| {
            let SurveyEntry {
                identity,
                device,
                profile,
                ..
            } = entry;
            profile.map(|profile| ResolvedDevice {
                identity,
                device,
                profile,
            })
        })
        .collect();

    info!(count = resolved.len(), %platform, "Resolved controllers");
    Ok(resolved)
}
