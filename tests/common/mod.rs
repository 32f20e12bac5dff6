//! Common test utilities for padswap.
//!
//! - `cli`: CLI runner with output verification and fluent assertions
//! - `env`: Serialized environment variable overrides
//! - `fixtures`: Temporary Dolphin config trees, profiles and fake emulators
#![allow(dead_code)]

pub mod cli;
pub mod env;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
