//! padswap - Launch Dolphin with bindings for the controllers attached right now.
//!
//! Provides both human-friendly and frontend-friendly (robot mode) output.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};

use clap::{CommandFactory, Parser};
use tracing::debug;

use padswap::cli::{self, Cli, Commands};
use padswap::config::{self, EmulatorLayout};
use padswap::device::{self, survey_devices};
use padswap::error::{Result, ResultExt, SwapError};
use padswap::launcher::{EmulatorLauncher, Launch};
use padswap::logging::init_logging;
use padswap::output::{DryRunResponse, Output, OutputMode};
use padswap::profile::ProfileStore;
use padswap::session::{LaunchRequest, Session};
use padswap::signal::{SignalHandler, SignalState};
use padswap::stage;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> Option<&'static str> {
        option_env!("VERGEN_GIT_SHA")
    }

    pub fn build_timestamp() -> Option<&'static str> {
        option_env!("VERGEN_BUILD_TIMESTAMP")
    }
}

const NO_DEVICES_WARNING: &str =
    "No attached controller has a saved profile; all player slots are disabled";

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }
    if cli.no_color || !io::stderr().is_terminal() {
        console::set_colors_enabled_stderr(false);
    }

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let output = OutputMode::from_cli(&cli).into_output();
    let code = match run(&cli, output.as_ref()) {
        Ok(code) => code,
        Err(e) => {
            output.error(&e);
            e.exit_code()
        }
    };
    debug!(code, "Exiting");
    std::process::exit(code);
}

/// Dispatch the command; returns the process exit code.
fn run(cli: &Cli, output: &dyn Output) -> Result<i32> {
    match &cli.command {
        None => cmd_launch(cli, output),
        Some(Commands::Devices(args)) => cmd_devices(cli, output, args),
        Some(Commands::Restore) => cmd_restore(cli, output),
        Some(Commands::Config) => cmd_config(cli, output),
        Some(Commands::Version) => {
            output.version_info(
                build_info::VERSION,
                build_info::git_sha(),
                build_info::build_timestamp(),
            );
            Ok(0)
        }
        Some(Commands::Completions(args)) => cmd_completions(args),
    }
}

fn cmd_launch(cli: &Cli, output: &dyn Output) -> Result<i32> {
    let (Some(platform), Some(content)) = (cli.launch.platform, cli.launch.content.as_ref())
    else {
        return Err(SwapError::Other(
            "A platform and a content path are required".to_string(),
        ));
    };
    let loaded = config::load(cli.config.as_deref())?;
    let config = &loaded.config;
    let enumerator = device::system_enumerator();
    let launcher = EmulatorLauncher::from_config(config);
    let request = LaunchRequest {
        platform,
        content: content.clone(),
        allow_no_devices: cli.launch.allow_no_devices,
    };

    if cli.launch.dry_run {
        let signals = SignalState::new();
        let session = Session::new(config, enumerator.as_ref(), &launcher, &signals);
        let plan = session.plan(&request)?;
        if plan.devices.is_empty() {
            output.warning(NO_DEVICES_WARNING);
        }
        let response =
            DryRunResponse::from_plan(session.layout(), &plan, content, launcher.describe(content));
        output.dry_run(&response);
        return Ok(0);
    }

    let handler = SignalHandler::new();
    handler
        .install()
        .with_context(|| "Failed to install signal handler")?;
    let signals = handler.state();

    let session = Session::new(config, enumerator.as_ref(), &launcher, &signals);
    let report = session.run(&request)?;
    if report.devices.is_empty() {
        output.warning(NO_DEVICES_WARNING);
    }
    output.launch_report(&report);

    // A failed restore is surfaced but the emulator's exit code stands
    if let Err(e) = report.restore.clone().into_result() {
        output.error(&e);
    }
    Ok(report.exit_code)
}

fn cmd_devices(cli: &Cli, output: &dyn Output, args: &cli::DevicesArgs) -> Result<i32> {
    let loaded = config::load(cli.config.as_deref())?;
    let layout = EmulatorLayout::from_config(&loaded.config);
    let store = ProfileStore::new(&layout);
    let enumerator = device::system_enumerator();

    let entries = survey_devices(
        enumerator.as_ref(),
        &store,
        args.platform,
        &loaded.config.device_bus,
    )?;
    output.device_survey(args.platform, &entries);
    Ok(0)
}

fn cmd_restore(cli: &Cli, output: &dyn Output) -> Result<i32> {
    let loaded = config::load(cli.config.as_deref())?;
    let layout = EmulatorLayout::from_config(&loaded.config);

    let report = stage::recover(&layout)?;
    output.restore_report(report.as_ref());
    if let Some(report) = report {
        report.into_result()?;
    }
    Ok(0)
}

fn cmd_config(cli: &Cli, output: &dyn Output) -> Result<i32> {
    let loaded = config::load(cli.config.as_deref())?;
    let layout = EmulatorLayout::from_config(&loaded.config);
    output.config_info(&loaded, &layout);
    Ok(0)
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(args: &cli::CompletionsArgs) -> Result<i32> {
    clap_complete::generate(args.shell, &mut Cli::command(), "padswap", &mut io::stdout());
    Ok(0)
}
