//! Signal handling for interruptible launches (SIGINT/SIGTERM).
//!
//! On the first signal the running emulator is killed and the staged files
//! are restored before the process exits with [`EXIT_CODE_INTERRUPTED`]. A
//! second signal is only reported: restoring the user's files always runs
//! to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Exit code for interrupted launches (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Signal handler state shared with the launcher.
#[derive(Debug, Default)]
pub struct SignalState {
    /// First signal received
    cancel_requested: AtomicBool,
    /// Signal count (for reporting repeated signals)
    signal_count: AtomicU8,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Get the number of signals received
    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Handle a signal (SIGINT/SIGTERM)
    ///
    /// Returns the appropriate action to take
    pub fn handle_signal(&self) -> SignalAction {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);
        self.cancel_requested.store(true, Ordering::SeqCst);

        if count == 0 {
            SignalAction::StopEmulator
        } else {
            SignalAction::AlreadyStopping
        }
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: stop the emulator, then restore
    StopEmulator,
    /// Later signals: restore is already under way
    AlreadyStopping,
}

/// Signal handler that manages the signal state
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(SignalState::new()),
        }
    }

    /// Get a reference to the signal state
    pub fn state(&self) -> Arc<SignalState> {
        Arc::clone(&self.state)
    }

    /// Install the signal handlers
    ///
    /// Covers SIGINT and SIGTERM. Must be called once at program startup.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || match state.handle_signal() {
            SignalAction::StopEmulator => {
                eprintln!("\nReceived interrupt, stopping emulator and restoring configuration...");
            }
            SignalAction::AlreadyStopping => {
                eprintln!("\nStill restoring configuration, please wait...");
            }
        })
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
