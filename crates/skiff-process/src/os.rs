// SPDX-License-Identifier: MIT OR Apache-2.0
//! The real launcher, built on `std::process::Command`.

use crate::error::LaunchError;
use crate::launcher::{Completed, Launcher, Output};
use crate::options::{Invocation, StdioMode};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Starts real OS processes.
///
/// Arguments are always passed argv-style; no shell is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLauncher;

impl OsLauncher {
    /// Create a launcher.
    pub const fn new() -> Self {
        Self
    }

    fn validate(call: &Invocation) -> Result<(), LaunchError> {
        if let (Some(text), Some(newlines)) = (call.text, call.universal_newlines)
            && text != newlines
        {
            return Err(LaunchError::InvalidOptions(
                "cannot disambiguate when both text and universal_newlines are supplied but different"
                    .into(),
            ));
        }
        if let Some(key) = call.extra.keys().next() {
            return Err(LaunchError::InvalidOptions(format!(
                "unsupported option `{key}`"
            )));
        }
        Ok(())
    }

    fn command(call: &Invocation) -> Result<Command, LaunchError> {
        Self::validate(call)?;
        let (program, args) = call.argv.split_first().ok_or(LaunchError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args);

        if let Some(cwd) = &call.cwd {
            cmd.current_dir(cwd);
        }
        if let Some(env) = &call.env {
            cmd.env_clear();
            cmd.envs(env.iter());
        }
        if let Some(mode) = call.stdin {
            cmd.stdin(stdio(mode));
        }
        if let Some(mode) = call.stdout {
            cmd.stdout(stdio(mode));
        }
        if let Some(mode) = call.stderr {
            cmd.stderr(stdio(mode));
        }
        Ok(cmd)
    }

    fn start(cmd: &mut Command, call: &Invocation) -> Result<Child, LaunchError> {
        cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: call
                .argv
                .first()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source,
        })
    }
}

fn stdio(mode: StdioMode) -> Stdio {
    match mode {
        StdioMode::Inherit => Stdio::inherit(),
        StdioMode::Piped => Stdio::piped(),
        StdioMode::Null => Stdio::null(),
    }
}

fn lossy_args(call: &Invocation) -> Vec<String> {
    call.argv
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

impl Launcher for OsLauncher {
    type Handle = Process;

    fn spawn(&self, call: &Invocation) -> Result<Process, LaunchError> {
        if call.timeout.is_some() || call.check || call.capture_output {
            return Err(LaunchError::InvalidOptions(
                "timeout, check and capture_output only apply to run and check_output".into(),
            ));
        }
        let mut cmd = Self::command(call)?;
        let child = Self::start(&mut cmd, call)?;
        Ok(Process {
            child,
            command: call.display_command(),
            args: lossy_args(call),
            text: call.text_mode(),
        })
    }

    fn run(&self, call: &Invocation) -> Result<Completed, LaunchError> {
        let mut cmd = Self::command(call)?;
        if call.capture_output {
            if call.stdout.is_some() || call.stderr.is_some() {
                return Err(LaunchError::InvalidOptions(
                    "stdout and stderr may not be set together with capture_output".into(),
                ));
            }
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        let child = Self::start(&mut cmd, call)?;
        let finished = wait_for(child, &call.display_command(), call.timeout)?;
        let text = call.text_mode();
        let done = Completed {
            args: lossy_args(call),
            code: finished.code,
            stdout: finished.stdout.map(|b| Output::from_bytes(b, text)),
            stderr: finished.stderr.map(|b| Output::from_bytes(b, text)),
        };
        if call.check && !done.success() {
            return Err(LaunchError::NonZeroExit {
                command: call.display_command(),
                code: done.code,
                stdout: done.stdout.map(|o| o.as_bytes().to_vec()),
                stderr: done.stderr.map(|o| o.as_bytes().to_vec()),
            });
        }
        Ok(done)
    }

    fn check_output(&self, call: &Invocation) -> Result<Output, LaunchError> {
        if call.stdout.is_some() {
            return Err(LaunchError::InvalidOptions(
                "stdout is captured by check_output and may not be set".into(),
            ));
        }
        let mut cmd = Self::command(call)?;
        cmd.stdout(Stdio::piped());
        let child = Self::start(&mut cmd, call)?;
        let finished = wait_for(child, &call.display_command(), call.timeout)?;
        let stdout = finished.stdout.unwrap_or_default();
        if finished.code != Some(0) {
            return Err(LaunchError::NonZeroExit {
                command: call.display_command(),
                code: finished.code,
                stdout: Some(stdout),
                stderr: finished.stderr,
            });
        }
        Ok(Output::from_bytes(stdout, call.text_mode()))
    }
}

struct Finished {
    code: Option<i32>,
    stdout: Option<Vec<u8>>,
    stderr: Option<Vec<u8>>,
}

type Drain = Receiver<std::io::Result<Vec<u8>>>;

fn read_in_background<R: Read + Send + 'static>(mut reader: R) -> Drain {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = reader.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });
    rx
}

// A grandchild can keep a pipe open after the child exits, so the drain is
// bounded by the same deadline as the wait.
fn collect(
    drain: Drain,
    command: &str,
    limit: Option<(Instant, Duration)>,
) -> Result<Vec<u8>, LaunchError> {
    let received = match limit {
        None => drain.recv().map_err(|_| RecvTimeoutError::Disconnected),
        Some((deadline, _)) => {
            drain.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        }
    };
    let result = match received {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            return Err(LaunchError::TimedOut {
                command: command.to_string(),
                timeout: limit.map(|(_, timeout)| timeout).unwrap_or_default(),
            });
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(std::io::Error::other("pipe reader panicked"))
        }
    };
    result.map_err(|source| LaunchError::Wait {
        command: command.to_string(),
        source,
    })
}

// Pipes are drained on helper threads so a chatty child cannot block on a
// full pipe while we wait for it.
fn wait_for(
    mut child: Child,
    command: &str,
    timeout: Option<Duration>,
) -> Result<Finished, LaunchError> {
    let stdout = child.stdout.take().map(read_in_background);
    let stderr = child.stderr.take().map(read_in_background);
    let wait_err = |source| LaunchError::Wait {
        command: command.to_string(),
        source,
    };

    // A timeout too large to represent as an instant never expires.
    let limit =
        timeout.and_then(|t| Instant::now().checked_add(t).map(|deadline| (deadline, t)));

    let status = match limit {
        None => child.wait().map_err(wait_err)?,
        Some((deadline, timeout)) => loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LaunchError::TimedOut {
                    command: command.to_string(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        },
    };

    Ok(Finished {
        code: status.code(),
        stdout: stdout.map(|d| collect(d, command, limit)).transpose()?,
        stderr: stderr.map(|d| collect(d, command, limit)).transpose()?,
    })
}

/// A child started by [`OsLauncher::spawn`].
///
/// Dropping the handle does not kill the child; call [`Process::wait`] or
/// [`Process::kill`].
#[derive(Debug)]
pub struct Process {
    child: Child,
    command: String,
    args: Vec<String>,
    text: bool,
}

impl Process {
    /// OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// The underlying child, for access to its stdio pipes.
    pub fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    /// Block until the child exits and return its exit code.
    pub fn wait(&mut self) -> Result<Option<i32>, LaunchError> {
        let status = self.child.wait().map_err(|source| LaunchError::Wait {
            command: self.command.clone(),
            source,
        })?;
        Ok(status.code())
    }

    /// The exit code if the child has finished, without blocking.
    pub fn try_wait(&mut self) -> Result<Option<Option<i32>>, LaunchError> {
        let status = self.child.try_wait().map_err(|source| LaunchError::Wait {
            command: self.command.clone(),
            source,
        })?;
        Ok(status.map(|s| s.code()))
    }

    /// Kill the child and reap it.
    pub fn kill(&mut self) -> Result<(), LaunchError> {
        let wait_err = |source| LaunchError::Wait {
            command: self.command.clone(),
            source,
        };
        self.child.kill().map_err(wait_err)?;
        self.child.wait().map_err(wait_err)?;
        Ok(())
    }

    /// Wait for the child and collect whatever was piped.
    pub fn wait_with_output(self) -> Result<Completed, LaunchError> {
        let Process {
            child,
            command,
            args,
            text,
        } = self;
        let finished = wait_for(child, &command, None)?;
        Ok(Completed {
            args,
            code: finished.code,
            stdout: finished.stdout.map(|b| Output::from_bytes(b, text)),
            stderr: finished.stderr.map(|b| Output::from_bytes(b, text)),
        })
    }
}
