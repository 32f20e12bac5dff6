//! Read-only lookup of saved controller profiles.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace};

use super::{BindingProfile, PROFILE_SECTION};
use crate::config::EmulatorLayout;
use crate::error::{Result, SwapError};
use crate::ini::IniDocument;
use crate::platform::Platform;

/// Characters that cannot appear in a profile filename.
const ILLEGAL_FILENAME_CHARS: &[char] = &[':', '>', '<', '?', '"', '/', '\\', '|', '*'];

/// Strip characters that are illegal in filenames from a device name.
///
/// Path separators are among the stripped characters, so the result can
/// never escape the profile directory.
pub fn sanitize_device_name(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}

/// Profile filename for a device name.
pub fn profile_file_name(device_name: &str) -> String {
    format!("{}.ini", sanitize_device_name(device_name))
}

/// Outcome of a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(BindingProfile),
    NotFound { path: PathBuf },
}

impl ProfileLookup {
    pub fn into_profile(self) -> Option<BindingProfile> {
        match self {
            Self::Found(profile) => Some(profile),
            Self::NotFound { .. } => None,
        }
    }
}

/// Looks up profiles in the per-platform profile directories.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    gc_dir: PathBuf,
    wii_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(layout: &EmulatorLayout) -> Self {
        Self {
            gc_dir: layout.profile_dir(Platform::Gc),
            wii_dir: layout.profile_dir(Platform::Wii),
        }
    }

    pub fn dir(&self, platform: Platform) -> &Path {
        match platform {
            Platform::Gc => &self.gc_dir,
            Platform::Wii => &self.wii_dir,
        }
    }

    /// Path the profile for `device_name` would be read from.
    pub fn path_for(&self, device_name: &str, platform: Platform) -> PathBuf {
        self.dir(platform).join(profile_file_name(device_name))
    }

    /// Load the profile saved for `device_name`.
    ///
    /// A missing file is [`ProfileLookup::NotFound`]. An unreadable file, a
    /// syntax error or a missing `[Profile]` section is
    /// [`SwapError::ProfileCorrupt`].
    #[instrument(skip(self))]
    pub fn lookup(&self, device_name: &str, platform: Platform) -> Result<ProfileLookup> {
        let path = self.path_for(device_name, platform);
        trace!(path = %path.display(), "Looking up profile");

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No profile saved for device");
                return Ok(ProfileLookup::NotFound { path });
            }
            Err(e) => {
                return Err(SwapError::ProfileCorrupt {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        let doc = IniDocument::parse(&text).map_err(|e| SwapError::ProfileCorrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if !doc.has_section(PROFILE_SECTION) {
            return Err(SwapError::ProfileCorrupt {
                path,
                reason: format!("missing [{PROFILE_SECTION}] section"),
            });
        }

        let profile = BindingProfile::from_pairs(doc.entries(PROFILE_SECTION));
        debug!(path = %path.display(), bindings = profile.len(), "Loaded profile");
        Ok(ProfileLookup::Found(profile))
    }
}
