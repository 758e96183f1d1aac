// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use skiff_config::{SkiffConfig, load_config, merge_configs, validate_config};
use skiff_console::Verbosity;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skiff", version, about = "Scaffold and package apps from templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More output; repeat for deep debug.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Tool settings file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Developer log level (error, warn, info, debug or trace).
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a command through the skiff process runner.
    Exec {
        /// How to run the command.
        #[arg(long, value_enum, default_value_t = ExecMode::Run)]
        mode: ExecMode,

        /// Working directory for the command.
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Extra environment as KEY=VALUE. Can be repeated.
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env_vars: Vec<String>,

        /// Treat output as raw bytes instead of text.
        #[arg(long)]
        bytes: bool,

        /// Fail when the command exits unsuccessfully.
        #[arg(long)]
        check: bool,

        /// Kill the command after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// The command and its arguments.
        #[arg(last = true, required = true)]
        argv: Vec<OsString>,
    },

    /// Create app bundles from their templates.
    Create {
        #[command(flatten)]
        project: ProjectArgs,

        /// Only create this app.
        app: Option<String>,
    },

    /// Print where each app's bundle and binary live.
    Paths {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Print the effective tool settings.
    Config {
        /// Print the JSON schema of the settings file instead.
        #[arg(long)]
        schema: bool,
    },
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project file.
    #[arg(long, default_value = "skiff.toml")]
    project: PathBuf,

    /// Target platform.
    #[arg(long, default_value = std::env::consts::OS)]
    platform: String,

    /// Output format; defaults per platform.
    #[arg(long)]
    format: Option<String>,

    /// Root for all generated output.
    #[arg(long, default_value = ".")]
    base: PathBuf,
}

impl ProjectArgs {
    fn output_format(&self) -> String {
        self.format
            .clone()
            .unwrap_or_else(|| default_output_format(&self.platform).to_string())
    }
}

fn default_output_format(platform: &str) -> &'static str {
    match platform {
        "linux" => "appimage",
        "windows" => "msi",
        _ => "app",
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExecMode {
    /// Start the command, print its pid and wait for it.
    Spawn,
    /// Run to completion with inherited stdio.
    Run,
    /// Capture and print stdout; non-zero exit is an error.
    Output,
}

/// Settings given on the command line; these win over the settings file.
fn cli_overrides(cli: &Cli) -> SkiffConfig {
    let verbosity = if cli.quiet {
        Some(Verbosity::Silent)
    } else if cli.verbose > 0 {
        Some(Verbosity::from_level(
            Verbosity::Normal.level().saturating_add(cli.verbose),
        ))
    } else {
        None
    };
    SkiffConfig {
        verbosity: verbosity.map(Verbosity::level),
        log_level: cli.log_level.clone(),
        ..Default::default()
    }
}

fn verbosity(settings: &SkiffConfig) -> Verbosity {
    settings
        .verbosity
        .map_or(Verbosity::Normal, Verbosity::from_level)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = merge_configs(
        load_config(cli.config.as_deref()).context("load settings")?,
        cli_overrides(&cli),
    );
    validate_config(&settings).context("invalid settings")?;
    let verbosity = verbosity(&settings);

    let default_filter = if verbosity >= Verbosity::DeepDebug {
        "skiff=debug".to_string()
    } else {
        format!("skiff={}", settings.log_level.as_deref().unwrap_or("warn"))
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(target: "skiff.cli", %verbosity, config = ?cli.config, "settings loaded");

    match cli.command {
        Commands::Exec {
            mode,
            cwd,
            env_vars,
            bytes,
            check,
            timeout,
            argv,
        } => commands::cmd_exec(
            verbosity,
            commands::ExecArgs {
                mode,
                cwd,
                env_vars,
                bytes,
                check,
                timeout,
                argv,
            },
        ),
        Commands::Create { project, app } => {
            commands::cmd_create(verbosity, settings, &project, app.as_deref())
        }
        Commands::Paths { project } => commands::cmd_paths(verbosity, settings, &project),
        Commands::Config { schema } => commands::cmd_config(&settings, schema),
    }
}
