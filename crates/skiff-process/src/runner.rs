// SPDX-License-Identifier: MIT OR Apache-2.0
//! The subprocess runner shared by every skiff command.

use crate::arg::{Arg, normalize_args};
use crate::env::Environment;
use crate::error::LaunchError;
use crate::launcher::{Completed, Launcher, Output};
use crate::options::{Invocation, LaunchMode, LaunchOptions};
use crate::os::OsLauncher;
use skiff_console::{Log, Verbosity};
use std::path::PathBuf;

const PREFACE: &str = ">>> ";

/// Runs external commands through a [`Launcher`].
///
/// Every entry point normalizes argv, applies the text-mode default, merges
/// the environment overlay with the ambient environment and, at debug
/// verbosity, traces the command to the [`Log`] before delegating. Results
/// and errors from the launcher are returned as-is.
#[derive(Debug)]
pub struct Subprocess<L = OsLauncher> {
    launcher: L,
    log: Log,
    ambient: Option<Environment>,
}

impl Subprocess<OsLauncher> {
    /// A runner that starts real processes.
    pub fn new(log: Log) -> Self {
        Self::with_launcher(log, OsLauncher::new())
    }
}

impl<L: Launcher> Subprocess<L> {
    /// A runner backed by `launcher`.
    pub fn with_launcher(log: Log, launcher: L) -> Self {
        Self {
            launcher,
            log,
            ambient: None,
        }
    }

    /// Use a fixed ambient environment instead of reading the process
    /// environment at call time.
    #[must_use]
    pub fn with_ambient_env(mut self, env: Environment) -> Self {
        self.ambient = Some(env);
        self
    }

    /// The launcher in use.
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// The log diagnostics are written to.
    pub fn log(&self) -> &Log {
        &self.log
    }

    /// The ambient environment as of now.
    pub fn ambient_env(&self) -> Environment {
        self.ambient.clone().unwrap_or_else(Environment::capture)
    }

    /// Start a command and return a handle to the running child.
    pub fn popen<I, A>(&self, args: I, options: LaunchOptions) -> Result<L::Handle, LaunchError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.invoke(LaunchMode::Spawn, args, options, |l, call| l.spawn(call))
    }

    /// Run a command to completion.
    pub fn run<I, A>(&self, args: I, options: LaunchOptions) -> Result<Completed, LaunchError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.invoke(LaunchMode::Run, args, options, |l, call| l.run(call))
    }

    /// Run a command to completion and return its stdout.
    pub fn check_output<I, A>(&self, args: I, options: LaunchOptions) -> Result<Output, LaunchError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.invoke(LaunchMode::CheckOutput, args, options, |l, call| {
            l.check_output(call)
        })
    }

    /// Build the effective invocation for `args` and `options` without
    /// running anything.
    pub fn prepare<I, A>(&self, args: I, options: LaunchOptions) -> Invocation
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let LaunchOptions {
            cwd,
            env,
            text,
            universal_newlines,
            capture_output,
            check,
            timeout,
            stdin,
            stdout,
            stderr,
            extra,
        } = options;

        // `text` and `universal_newlines` are the same flag; only default it
        // when the caller named neither.
        let text = match (text, universal_newlines) {
            (None, None) => Some(true),
            _ => text,
        };

        Invocation {
            argv: normalize_args(args),
            cwd: cwd.map(PathBuf::into_os_string),
            env: env.map(|overlay| self.ambient_env().merged_with(&overlay)),
            text,
            universal_newlines,
            capture_output,
            check,
            timeout,
            stdin,
            stdout,
            stderr,
            extra,
        }
    }

    fn invoke<I, A, T>(
        &self,
        mode: LaunchMode,
        args: I,
        options: LaunchOptions,
        delegate: impl FnOnce(&L, &Invocation) -> Result<T, LaunchError>,
    ) -> Result<T, LaunchError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let overlay = options.env.clone();
        let call = self.prepare(args, options);
        self.trace(&call, overlay.as_ref());
        tracing::trace!(
            target: "skiff.process",
            %mode,
            argc = call.argv.len(),
            "delegating to launcher"
        );
        delegate(&self.launcher, &call)
    }

    fn trace(&self, call: &Invocation, overlay: Option<&Environment>) {
        let verbosity = self.log.verbosity();
        if verbosity < Verbosity::Debug {
            return;
        }

        self.log.debug("");
        self.log.debug_with_preface("Running Command:", PREFACE);
        self.log
            .debug_with_preface(&format!("    {}", call.display_command()), PREFACE);

        if verbosity >= Verbosity::DeepDebug {
            let effective = call.env.clone().unwrap_or_else(|| self.ambient_env());
            self.log.debug_with_preface("Full Environment:", PREFACE);
            self.trace_env(&effective);
        } else if let Some(overlay) = overlay {
            self.log.debug_with_preface("Environment:", PREFACE);
            self.trace_env(overlay);
        }
    }

    fn trace_env(&self, env: &Environment) {
        for (key, value) in env.iter() {
            self.log.debug_with_preface(
                &format!("    {}={}", key.to_string_lossy(), value.to_string_lossy()),
                PREFACE,
            );
        }
    }
}
