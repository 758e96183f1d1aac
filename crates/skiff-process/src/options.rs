// SPDX-License-Identifier: MIT OR Apache-2.0
//! Invocation options and the effective call handed to a launcher.

use crate::env::Environment;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where a child's standard stream is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdioMode {
    /// Share the parent's stream.
    Inherit,
    /// Capture through a pipe.
    Piped,
    /// Connect to the null device.
    Null,
}

/// Caller-facing options for one subprocess call.
///
/// Every field is optional. `text` and `universal_newlines` are synonyms; when
/// neither is given the runner asks for text mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Working directory for the child.
    pub cwd: Option<PathBuf>,
    /// Variables to lay over the ambient environment.
    pub env: Option<Environment>,
    /// Treat the child's streams as text.
    pub text: Option<bool>,
    /// Alias of `text`.
    pub universal_newlines: Option<bool>,
    /// Capture stdout and stderr (run mode).
    pub capture_output: bool,
    /// Fail on a non-zero exit status (run mode).
    pub check: bool,
    /// Kill the child if it runs longer than this.
    pub timeout: Option<Duration>,
    /// Standard input.
    pub stdin: Option<StdioMode>,
    /// Standard output.
    pub stdout: Option<StdioMode>,
    /// Standard error.
    pub stderr: Option<StdioMode>,
    /// Launcher-specific options, passed through untouched.
    pub extra: BTreeMap<String, String>,
}

impl LaunchOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add one variable to the environment overlay.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.get_or_insert_with(Environment::new).insert(key, value);
        self
    }

    /// Add several variables to the environment overlay.
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let env = self.env.get_or_insert_with(Environment::new);
        for (k, v) in vars {
            env.insert(k, v);
        }
        self
    }

    /// Explicitly choose text (`true`) or bytes (`false`) mode.
    #[must_use]
    pub fn text(mut self, text: bool) -> Self {
        self.text = Some(text);
        self
    }

    /// Alias of [`LaunchOptions::text`].
    #[must_use]
    pub fn universal_newlines(mut self, value: bool) -> Self {
        self.universal_newlines = Some(value);
        self
    }

    /// Capture stdout and stderr.
    #[must_use]
    pub fn capture_output(mut self) -> Self {
        self.capture_output = true;
        self
    }

    /// Fail on a non-zero exit status.
    #[must_use]
    pub fn check(mut self) -> Self {
        self.check = true;
        self
    }

    /// Limit how long the child may run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connect standard input.
    #[must_use]
    pub fn stdin(mut self, mode: StdioMode) -> Self {
        self.stdin = Some(mode);
        self
    }

    /// Connect standard output.
    #[must_use]
    pub fn stdout(mut self, mode: StdioMode) -> Self {
        self.stdout = Some(mode);
        self
    }

    /// Connect standard error.
    #[must_use]
    pub fn stderr(mut self, mode: StdioMode) -> Self {
        self.stderr = Some(mode);
        self
    }

    /// Pass a launcher-specific option through.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Which launcher entry point a call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchMode {
    /// Start the child and return a handle to it.
    Spawn,
    /// Wait for the child to finish.
    Run,
    /// Wait for the child and return its stdout.
    CheckOutput,
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Spawn => "spawn",
            Self::Run => "run",
            Self::CheckOutput => "check_output",
        };
        f.write_str(s)
    }
}

/// The effective call a launcher receives, after normalization and
/// environment merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program followed by its arguments.
    pub argv: Vec<OsString>,
    /// Working directory.
    pub cwd: Option<OsString>,
    /// Full child environment; `None` inherits the parent's.
    pub env: Option<Environment>,
    /// Text mode flag.
    pub text: Option<bool>,
    /// Alias of `text`.
    pub universal_newlines: Option<bool>,
    /// Capture stdout and stderr.
    pub capture_output: bool,
    /// Fail on a non-zero exit status.
    pub check: bool,
    /// Kill the child after this long.
    pub timeout: Option<Duration>,
    /// Standard input.
    pub stdin: Option<StdioMode>,
    /// Standard output.
    pub stdout: Option<StdioMode>,
    /// Standard error.
    pub stderr: Option<StdioMode>,
    /// Launcher-specific options.
    pub extra: BTreeMap<String, String>,
}

impl Invocation {
    /// An invocation with the given argv and nothing else set.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Whether captured streams should be decoded as text.
    ///
    /// Either alias may carry the flag; an invocation with neither set is
    /// treated as bytes.
    pub fn text_mode(&self) -> bool {
        self.text.or(self.universal_newlines).unwrap_or(false)
    }

    /// The argv joined by single spaces, for messages.
    pub fn display_command(&self) -> String {
        self.argv
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_env_overlay() {
        let opts = LaunchOptions::new().env("A", "1").envs([("B", "2"), ("A", "3")]);
        let env = opts.env.unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("A").unwrap(), "3");
    }

    #[test]
    fn defaults_leave_aliases_unset() {
        let opts = LaunchOptions::default();
        assert!(opts.text.is_none());
        assert!(opts.universal_newlines.is_none());
        assert!(opts.env.is_none());
        assert!(!opts.check);
    }

    #[test]
    fn text_mode_reads_either_alias() {
        let mut call = Invocation::new(["x"]);
        assert!(!call.text_mode());
        call.universal_newlines = Some(true);
        assert!(call.text_mode());
        call.text = Some(false);
        assert!(!call.text_mode());
    }

    #[test]
    fn display_command_joins_with_spaces() {
        let call = Invocation::new(["git", "clone", "some url"]);
        assert_eq!(call.display_command(), "git clone some url");
    }
}
