// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.

use crate::{ExecMode, ProjectArgs};
use anyhow::{Context, Result};
use skiff_command::{AppDir, BaseCommand, PlatformCommand, create_all, create_app};
use skiff_config::SkiffConfig;
use skiff_console::{Log, Verbosity};
use skiff_process::{LaunchOptions, Subprocess};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

pub(crate) struct ExecArgs {
    pub(crate) mode: ExecMode,
    pub(crate) cwd: Option<PathBuf>,
    pub(crate) env_vars: Vec<String>,
    pub(crate) bytes: bool,
    pub(crate) check: bool,
    pub(crate) timeout: Option<u64>,
    pub(crate) argv: Vec<OsString>,
}

pub(crate) fn cmd_exec(verbosity: Verbosity, args: ExecArgs) -> Result<ExitCode> {
    let log = Log::new(verbosity);
    let sub = Subprocess::new(log.clone());

    let mut options = LaunchOptions::new();
    if let Some(cwd) = args.cwd {
        options = options.cwd(cwd);
    }
    for raw in &args.env_vars {
        let (key, value) = parse_key_value_flag(raw, "--env")?;
        options = options.env(key, value);
    }
    if args.bytes {
        options = options.text(false);
    }
    if args.check {
        options = options.check();
    }
    if let Some(secs) = args.timeout {
        options = options.timeout(Duration::from_secs(secs));
    }

    let display = args
        .argv
        .iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");

    match args.mode {
        ExecMode::Run => {
            let completed = sub
                .run(args.argv, options)
                .with_context(|| format!("run `{display}`"))?;
            Ok(ExitCode::from(exit_status(completed.code)))
        }
        ExecMode::Output => {
            let output = sub
                .check_output(args.argv, options)
                .with_context(|| format!("run `{display}`"))?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes()).context("write output")?;
            stdout.flush().context("write output")?;
            Ok(ExitCode::SUCCESS)
        }
        ExecMode::Spawn => {
            let mut process = sub
                .popen(args.argv, options)
                .with_context(|| format!("start `{display}`"))?;
            log.info(&format!("Started process {}", process.id()));
            let code = process
                .wait()
                .with_context(|| format!("wait for `{display}`"))?;
            Ok(ExitCode::from(exit_status(code)))
        }
    }
}

pub(crate) fn cmd_create(
    verbosity: Verbosity,
    settings: SkiffConfig,
    project: &ProjectArgs,
    app: Option<&str>,
) -> Result<ExitCode> {
    let cmd = load_command(verbosity, settings, project)?;
    cmd.verify_tools()?;
    let layout = AppDir::new(cmd.platform(), cmd.output_format());

    let bundles = match app {
        Some(name) => vec![
            create_app(&cmd, &layout, name, &project.base)
                .with_context(|| format!("create {name}"))?,
        ],
        None => create_all(&cmd, &layout, &project.base).context("create apps")?,
    };
    for bundle in bundles {
        cmd.log()
            .info(&format!("Created bundle at {}", bundle.display()));
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn cmd_paths(
    verbosity: Verbosity,
    settings: SkiffConfig,
    project: &ProjectArgs,
) -> Result<ExitCode> {
    let cmd = load_command(verbosity, settings, project)?;
    let layout = AppDir::new(cmd.platform(), cmd.output_format());
    for (name, app) in cmd.apps() {
        println!("{name}");
        println!(
            "  bundle: {}",
            layout.bundle_path(app, &project.base).display()
        );
        println!(
            "  binary: {}",
            layout.binary_path(app, &project.base).display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn cmd_config(settings: &SkiffConfig, schema: bool) -> Result<ExitCode> {
    if schema {
        let schema = schemars::schema_for!(SkiffConfig);
        let json = serde_json::to_string_pretty(&schema).context("serialize schema")?;
        println!("{json}");
    } else {
        let text = toml::to_string_pretty(settings).context("serialize settings")?;
        print!("{text}");
    }
    Ok(ExitCode::SUCCESS)
}

fn load_command(
    verbosity: Verbosity,
    settings: SkiffConfig,
    project: &ProjectArgs,
) -> Result<BaseCommand> {
    let sub = Subprocess::new(Log::new(verbosity));
    let mut cmd = BaseCommand::new(&project.platform, project.output_format(), sub, settings);
    cmd.parse_config(&project.project)
        .with_context(|| format!("read {}", project.project.display()))?;
    Ok(cmd)
}

/// The child's exit status as a process exit code; signals and out-of-range
/// codes become 1.
fn exit_status(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok()).unwrap_or(1)
}

fn parse_key_value_flag(raw: &str, flag_name: &str) -> Result<(String, String)> {
    let (raw_key, raw_value) = raw
        .split_once('=')
        .with_context(|| format!("{flag_name} expects KEY=VALUE, got '{raw}'"))?;

    let key = raw_key.trim();
    if key.is_empty() {
        anyhow::bail!("{flag_name} key cannot be empty (got '{raw}')");
    }

    Ok((key.to_string(), raw_value.to_string()))
}
