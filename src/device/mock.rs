//! Mock enumerator for testing without attached controllers.
//!
//! # Example
//!
//! ```rust
//! use padswap::device::DeviceEnumerator;
//! use padswap::device::mock::MockEnumerator;
//!
//! let mock = MockEnumerator::with_names(&["Pro Controller", "Pro Controller"]);
//! assert_eq!(mock.enumerate().unwrap().len(), 2);
//! assert_eq!(mock.call_count(), 1);
//! ```

use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use super::{DeviceEnumerator, InputDevice};
use crate::error::{Result, SwapError};

/// Enumerator returning a fixed device list.
#[derive(Debug, Default)]
pub struct MockEnumerator {
    devices: Vec<InputDevice>,
    error_injection: Mutex<Option<SwapError>>,
    calls: AtomicUsize,
}

impl MockEnumerator {
    #[must_use]
    pub fn new(devices: Vec<InputDevice>) -> Self {
        debug!(count = devices.len(), "Creating mock enumerator");
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Devices with the given names, in order.
    #[must_use]
    pub fn with_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|name| InputDevice::named(*name)).collect())
    }

    /// No controllers attached.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Fail the next enumeration with `error`.
    pub fn inject_error(&self, error: SwapError) {
        *self.error_injection.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Number of times `enumerate` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DeviceEnumerator for MockEnumerator {
    fn enumerate(&self) -> Result<Vec<InputDevice>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self
            .error_injection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }
        Ok(self.devices.clone())
    }
}
