//! padswap library - per-launch Dolphin controller configuration.
//!
//! This library exposes the core of the `padswap` CLI for use in tests
//! and by frontends that want to drive a launch themselves.
//!
//! # Modules
//!
//! - `device`: Controller enumeration and profile matching
//! - `bindings`: Merged binding file and stop hotkey synthesis
//! - `stage`: Swapping files into the emulator config directory and back
//! - `session`: One launch from start to finish
//! - `config`: Configuration file handling
//! - `output`: Output mode abstraction (robot/human)
#![forbid(unsafe_code)]

pub mod bindings;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod ini;
pub mod launcher;
pub mod logging;
pub mod output;
pub mod platform;
pub mod profile;
pub mod session;
pub mod signal;
pub mod stage;
