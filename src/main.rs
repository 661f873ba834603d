// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use cvfx::app::{App, AppSettings, ViewLayout};
use cvfx::backends::camera::{CameraBackendType, create_backend};
use cvfx::config::{CONFIG_DIR_NAME, Config};
use cvfx::errors::AppResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod cli;

#[derive(Parser)]
#[command(name = "cvfx")]
#[command(about = "Camera-driven vision application skeleton")]
#[command(version = env!("GIT_VERSION"))]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Application to run (see 'cvfx apps')
    app: Option<String>,

    #[command(flatten)]
    device: DeviceArgs,
}

#[derive(clap::Args, Clone)]
struct DeviceArgs {
    /// Camera index to open (overrides the config file)
    #[arg(short, long)]
    camera: Option<u32>,

    /// Use the synthetic test pattern instead of a V4L2 device
    #[arg(long)]
    synthetic: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an application in the terminal UI
    Run {
        app: String,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// List available applications
    Apps,

    /// List available cameras
    Cameras {
        /// List the synthetic device instead of V4L2 devices
        #[arg(long)]
        synthetic: bool,
    },

    /// Process one frame and save the buffers as PNG
    Snapshot {
        app: String,

        #[command(flatten)]
        device: DeviceArgs,

        /// Output directory (default: ~/Pictures/cvfx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.is_terminal_mode());

    let mut config = Config::load_or_default();
    exit_code(run(cli, &mut config))
}

impl Cli {
    /// Whether the command takes over the terminal with the UI
    fn is_terminal_mode(&self) -> bool {
        matches!(self.command, Some(Commands::Run { .. }))
            || (self.command.is_none() && self.run.app.is_some())
    }
}

fn run(cli: Cli, config: &mut Config) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Run { app, device }) => run_terminal(&app, &device, config),
        Some(Commands::Apps) => {
            cli::list_apps(&cvfx::demos::registry());
            Ok(())
        }
        Some(Commands::Cameras { synthetic }) => {
            cli::list_cameras(backend_for(synthetic, config));
            Ok(())
        }
        Some(Commands::Snapshot { app, device, output }) => snapshot(&app, &device, output, config),
        None => match cli.run.app {
            Some(app) => run_terminal(&app, &cli.run.device, config),
            None => {
                cli::list_apps(&cvfx::demos::registry());
                Ok(())
            }
        },
    }
}

/// Fatal errors are reported on stderr and end the process with a failure status
fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Fatal error");
            eprintln!("cvfx: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Set RUST_LOG to control the level, e.g. RUST_LOG=debug or RUST_LOG=app=info.
///
/// In terminal mode the log goes to a file so it does not corrupt the screen.
fn init_logging(terminal_mode: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    if terminal_mode {
        // Without a log file the terminal UI runs silently
        if let Some(file) = open_log_file() {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join(CONFIG_DIR_NAME);
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::File::create(dir.join("cvfx.log")).ok()
}

fn backend_for(synthetic: bool, config: &Config) -> CameraBackendType {
    if synthetic {
        CameraBackendType::Synthetic
    } else {
        config.backend
    }
}

/// Resolve the application, wire it to a device and run its init hook
fn build_app(name: &str, device: &DeviceArgs, config: &mut Config) -> AppResult<App> {
    if let Some(camera) = device.camera {
        config.camera_id = camera;
    }
    let backend = backend_for(device.synthetic, config);

    let resolved = cvfx::demos::registry().resolve(name)?;
    let mut app = App::new(
        resolved,
        &ViewLayout::standard(),
        create_backend(backend),
        AppSettings::from_config(config),
    )?;
    app.initialize()?;
    Ok(app)
}

fn run_terminal(name: &str, device: &DeviceArgs, config: &mut Config) -> anyhow::Result<()> {
    let mut app = build_app(name, device, config)?;
    cvfx::terminal::run(&mut app)?;

    config.camera_id = app.camera_id();
    if let Err(e) = config.save() {
        error!(error = %e, "Failed to save config");
    }
    Ok(())
}

fn snapshot(
    name: &str,
    device: &DeviceArgs,
    output: Option<PathBuf>,
    config: &mut Config,
) -> anyhow::Result<()> {
    let mut app = build_app(name, device, config)?;
    let dir = output.unwrap_or_else(|| config.snapshot_dir());
    cli::snapshot(&mut app, &dir)?;
    app.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cvfx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_terminal_mode_detection() {
        assert!(parse(&["run", "dev"]).is_terminal_mode());
        assert!(parse(&["dev", "--synthetic"]).is_terminal_mode());
        assert!(!parse(&["apps"]).is_terminal_mode());
        assert!(!parse(&["snapshot", "dev"]).is_terminal_mode());
    }

    #[test]
    fn test_unknown_app_is_fatal() {
        let mut config = Config::default();
        let result = run(parse(&["snapshot", "nosuchapp", "--synthetic"]), &mut config);
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("no application named 'nosuchapp'"));
        assert_eq!(exit_code(Err(err)), ExitCode::FAILURE);
    }

    #[test]
    fn test_listing_exits_cleanly() {
        let mut config = Config::default();
        assert_eq!(exit_code(run(parse(&["apps"]), &mut config)), ExitCode::SUCCESS);
    }
}
