// SPDX-License-Identifier: MIT OR Apache-2.0
//! The process-spawning primitive behind [`Subprocess`](crate::Subprocess).

use crate::error::LaunchError;
use crate::options::Invocation;

/// Captured stream contents, decoded or raw depending on text mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Decoded text with `\r\n` translated to `\n`.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Output {
    /// Build from raw bytes, decoding when `text` is set.
    pub fn from_bytes(bytes: Vec<u8>, text: bool) -> Self {
        if text {
            let decoded = String::from_utf8_lossy(&bytes);
            Output::Text(decoded.replace("\r\n", "\n"))
        } else {
            Output::Bytes(bytes)
        }
    }

    /// View as text, decoding raw bytes lossily.
    pub fn to_text(&self) -> String {
        match self {
            Output::Text(s) => s.clone(),
            Output::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// View as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Output::Text(s) => s.as_bytes(),
            Output::Bytes(b) => b,
        }
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Result of a run-to-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    /// The argv that was run.
    pub args: Vec<String>,
    /// Exit code; `None` when killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout when output was captured.
    pub stdout: Option<Output>,
    /// Captured stderr when output was captured.
    pub stderr: Option<Output>,
}

impl Completed {
    /// True when the child exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A way of starting processes.
///
/// Implementations receive a fully normalized [`Invocation`] and own every
/// failure mode; callers see their errors unchanged.
pub trait Launcher {
    /// Handle to a running child returned by [`Launcher::spawn`].
    type Handle;

    /// Start the child and return immediately.
    fn spawn(&self, call: &Invocation) -> Result<Self::Handle, LaunchError>;

    /// Start the child and wait for it to finish.
    fn run(&self, call: &Invocation) -> Result<Completed, LaunchError>;

    /// Start the child, wait, and return its stdout. Fails on a non-zero
    /// exit status.
    fn check_output(&self, call: &Invocation) -> Result<Output, LaunchError>;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    type Handle = L::Handle;

    fn spawn(&self, call: &Invocation) -> Result<Self::Handle, LaunchError> {
        (**self).spawn(call)
    }

    fn run(&self, call: &Invocation) -> Result<Completed, LaunchError> {
        (**self).run(call)
    }

    fn check_output(&self, call: &Invocation) -> Result<Output, LaunchError> {
        (**self).check_output(call)
    }
}
