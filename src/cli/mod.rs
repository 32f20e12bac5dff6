//! CLI argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::platform::Platform;

/// padswap - Launch Dolphin with bindings for the controllers attached right now.
///
/// Stages a binding file built from each attached controller's saved
/// profile, runs the emulator, then restores the original configuration.
///
/// Robot Mode: Use --robot or --format json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "padswap", version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(subcommand_negates_reqs = true)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Output format (text for humans, json for frontends/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "PADSWAP_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (TOML or YAML)
    #[arg(long, short = 'c', global = true, env = "PADSWAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub launch: LaunchArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and frontends
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Arguments of the default (launch) command.
#[derive(Args, Debug, Default)]
pub struct LaunchArgs {
    /// Console whose controller bindings to stage (gc, wii)
    #[arg(required = true)]
    pub platform: Option<Platform>,

    /// Game image to boot
    #[arg(required = true)]
    pub content: Option<PathBuf>,

    /// Print what would be staged and the emulator command, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Launch even if no attached controller has a saved profile
    #[arg(long)]
    pub allow_no_devices: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List attached controllers and whether each has a saved profile
    Devices(DevicesArgs),

    /// Restore configuration left staged by an interrupted launch
    Restore,

    /// Show the effective configuration and emulator paths
    Config,

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Platform whose profiles to look up
    pub platform: Platform,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
