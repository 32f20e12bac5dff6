//! One launch from start to finish.
//!
//! ```text
//! recover ─► resolve ─► synthesize ─► stage ─► launch ─► restore
//! ```
//!
//! Everything up to and including synthesis runs before any emulator file
//! is touched, so errors there leave the config directory as it was.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::bindings::{self, HotkeyConfiguration};
use crate::config::{AppConfig, EmulatorLayout};
use crate::device::{DeviceEnumerator, ResolvedDevice, resolve_devices};
use crate::error::{Result, SwapError};
use crate::ini::IniDocument;
use crate::launcher::{Launch, LaunchOutcome};
use crate::platform::Platform;
use crate::profile::ProfileStore;
use crate::signal::SignalState;
use crate::stage::{self, RestoreReport, StagePlan, log_report};

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub platform: Platform,
    pub content: PathBuf,
    /// Overrides the configured `allow_no_devices` when set.
    pub allow_no_devices: bool,
}

/// Everything that would be written for a launch.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub platform: Platform,
    pub devices: Vec<ResolvedDevice>,
    pub stage: StagePlan,
}

impl LaunchPlan {
    pub fn hotkeys(&self) -> Option<&HotkeyConfiguration> {
        self.stage.hotkeys.as_ref()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub platform: Platform,
    pub content: PathBuf,
    /// Composite identities of the controllers that were bound.
    pub devices: Vec<String>,
    pub hotkeys: Option<HotkeyConfiguration>,
    pub outcome: LaunchOutcome,
    pub exit_code: i32,
    /// Leftovers of an earlier run restored before this launch.
    pub recovered: Option<RestoreReport>,
    pub restore: RestoreReport,
}

pub struct Session<'a> {
    config: &'a AppConfig,
    layout: EmulatorLayout,
    enumerator: &'a dyn DeviceEnumerator,
    launcher: &'a dyn Launch,
    signals: &'a SignalState,
}

impl<'a> Session<'a> {
    pub fn new(
        config: &'a AppConfig,
        enumerator: &'a dyn DeviceEnumerator,
        launcher: &'a dyn Launch,
        signals: &'a SignalState,
    ) -> Self {
        Self {
            config,
            layout: EmulatorLayout::from_config(config),
            enumerator,
            launcher,
            signals,
        }
    }

    pub fn layout(&self) -> &EmulatorLayout {
        &self.layout
    }

    /// Resolve controllers and build the files to stage, touching nothing.
    #[instrument(skip(self), fields(platform = %request.platform))]
    pub fn plan(&self, request: &LaunchRequest) -> Result<LaunchPlan> {
        let platform = request.platform;
        let store = ProfileStore::new(&self.layout);
        let devices = resolve_devices(self.enumerator, &store, platform, &self.config.device_bus)?;

        let (bindings, hotkeys) = if devices.is_empty() {
            if !(request.allow_no_devices || self.config.allow_no_devices) {
                return Err(SwapError::NoDevicesFound {
                    platform: platform.to_string(),
                });
            }
            warn!("No controller has a profile, launching with every slot disabled");
            (bindings::empty(platform), None)
        } else {
            let (doc, hotkeys) = bindings::synthesize(&devices, platform)?;
            (doc, Some(hotkeys))
        };

        Ok(LaunchPlan {
            platform,
            devices,
            stage: StagePlan {
                platform,
                bindings,
                hotkeys,
            },
        })
    }

    /// Run a full launch and restore the user's files afterwards.
    ///
    /// The restore report is part of the returned value; a failed restore
    /// does not turn into an error here so the emulator's exit code is not
    /// lost. Callers decide how loudly to report it.
    #[instrument(skip(self), fields(platform = %request.platform))]
    pub fn run(&self, request: &LaunchRequest) -> Result<LaunchReport> {
        let recovered = stage::recover(&self.layout)?;
        if let Some(report) = &recovered {
            report.clone().into_result()?;
        }

        let plan = self.plan(request)?;
        if self.signals.is_cancel_requested() {
            return Err(SwapError::Interrupted);
        }

        let mut guard = stage::stage(&self.layout, &plan.stage)?;
        guard.mark_launching();
        let launched = self.launcher.launch(&request.content, self.signals);
        let restore = guard.restore();
        log_report(&restore);

        let outcome = launched?;
        info!(?outcome, "Launch finished");
        Ok(LaunchReport {
            platform: plan.platform,
            content: request.content.clone(),
            devices: plan.devices.iter().map(|d| d.identity.to_string()).collect(),
            hotkeys: plan.stage.hotkeys,
            outcome,
            exit_code: outcome.exit_code(),
            recovered,
            restore,
        })
    }
}

/// Contents a dry run would write, keyed by file.
pub fn preview(layout: &EmulatorLayout, plan: &LaunchPlan) -> Vec<(PathBuf, IniDocument)> {
    let mut files: Vec<_> = Platform::ALL
        .iter()
        .map(|&platform| {
            (
                layout.binding_file(platform).live,
                plan.stage.document_for(platform),
            )
        })
        .collect();
    if let Some(hotkeys) = plan.hotkeys() {
        files.push((layout.hotkeys_file().live, hotkeys.to_document()));
    }
    files
}
