//! Command-line interface for the audio HAL devices factory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use audiohal_core::prelude::*;
use clap::{Parser, Subcommand};
use serde::Serialize;

/// audiohal - open primary and legacy audio HAL devices.
#[derive(Parser, Debug)]
#[command(name = "audiohal")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the `hw/` module directory.
    #[arg(long, global = true)]
    lib_dir: Option<PathBuf>,

    /// Interface revision (6.0, 7.0 or 7.1).
    #[arg(long, global = true)]
    hal_version: Option<InterfaceVersion>,

    /// Legacy module variant.
    #[arg(long, global = true)]
    variant: Option<String>,

    /// Report factory construction failures instead of aborting.
    #[arg(long, global = true)]
    no_abort: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the legacy module path for the current configuration.
    ModulePath,
    /// Open a device by name.
    Open {
        /// Device name; `primary` selects the built-in device.
        name: String,
        /// Use the 7.1 entry point.
        #[arg(long)]
        extended: bool,
    },
    /// Open the primary device.
    OpenPrimary {
        /// Use the 7.1 entry point.
        #[arg(long)]
        extended: bool,
    },
}

/// JSON shape of a device reply.
#[derive(Serialize)]
struct ReplyOutput<'a> {
    request: &'a str,
    status: Status,
    code: i32,
    device: Option<DeviceInfo>,
}

impl<'a> ReplyOutput<'a> {
    fn new(request: &'a str, reply: DeviceReply) -> Self {
        Self {
            request,
            status: reply.status,
            code: reply.status.code(),
            device: reply.device.map(|d| d.info().clone()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;

    match args.command {
        Command::ModulePath => {
            println!("{}", config.module_path().display());
            Ok(())
        }
        Command::Open { ref name, extended } => {
            let factory = build_factory(&config, args.no_abort)?;
            let reply = if extended {
                extended_view(&factory)?.open_device_7_1(name)
            } else {
                factory.open_device(name)
            };
            print_reply(name, reply)
        }
        Command::OpenPrimary { extended } => {
            let factory = build_factory(&config, args.no_abort)?;
            let reply = if extended {
                extended_view(&factory)?.open_primary_device_7_1()
            } else {
                factory.open_primary_device()
            };
            print_reply(AUDIO_HARDWARE_MODULE_ID_PRIMARY, reply)
        }
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    // Check if JSON logging is requested (for production/container environments)
    let json_logging = std::env::var("AUDIOHAL_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("audiohal={level},audiohal_core={level}"))
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Defaults, then the config file, then environment, then flags.
fn load_config(args: &Args) -> Result<FactoryConfig> {
    let mut config = match &args.config {
        Some(path) => FactoryConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FactoryConfig::default(),
    };
    config.apply_env().context("Invalid AUDIOHAL_* environment")?;

    if let Some(dir) = &args.lib_dir {
        config.lib_dir = dir.clone();
    }
    if let Some(version) = args.hal_version {
        config.hal_version = version;
    }
    if let Some(variant) = &args.variant {
        config.variant = variant.clone();
    }
    config.validate()?;

    tracing::debug!("Factory config: {:?}", config);
    Ok(config)
}

/// A factory that cannot reach its legacy module is fatal unless the caller
/// asked for a reported error.
fn build_factory(config: &FactoryConfig, no_abort: bool) -> Result<HalDevicesFactory> {
    if no_abort {
        HalDevicesFactory::new(config).context("Cannot construct devices factory")
    } else {
        Ok(HalDevicesFactory::load_or_abort(config))
    }
}

fn extended_view(factory: &HalDevicesFactory) -> Result<Extended<'_>> {
    factory.extended().ok_or_else(|| {
        anyhow::anyhow!(
            "Interface version {} has no 7.1 entry points",
            factory.version()
        )
    })
}

fn print_reply(request: &str, reply: DeviceReply) -> Result<()> {
    let output = ReplyOutput::new(request, reply);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
