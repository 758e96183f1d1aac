// SPDX-License-Identifier: MIT OR Apache-2.0
//! skiff-console
//!
//! The user-facing log sink. Every line of human-readable output that skiff
//! produces goes through a [`Log`], which decides what to print based on the
//! process-wide [`Verbosity`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// How much output the tool produces.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Errors only.
    Silent = 0,
    /// Regular progress output.
    #[default]
    Normal = 1,
    /// Command traces.
    Debug = 2,
    /// Command traces plus the full environment of every subprocess.
    DeepDebug = 3,
}

impl Verbosity {
    /// Build a verbosity from a numeric level, clamping anything above 3.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Silent,
            1 => Self::Normal,
            2 => Self::Debug,
            _ => Self::DeepDebug,
        }
    }

    /// Numeric level (0–3).
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        Self::from_level(level)
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Silent => "silent",
            Self::Normal => "normal",
            Self::Debug => "debug",
            Self::DeepDebug => "deep-debug",
        };
        f.write_str(s)
    }
}

#[derive(Clone)]
enum Sink {
    Stdout,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stdout => f.write_str("Stdout"),
            Sink::Buffer(_) => f.write_str("Buffer"),
        }
    }
}

/// Line-oriented console output gated by [`Verbosity`].
///
/// Clones share the same sink, so a log handed to a subprocess runner writes
/// to the same place as the command that owns it.
#[derive(Debug, Clone)]
pub struct Log {
    verbosity: Verbosity,
    sink: Sink,
}

/// Read side of a [`Log::capture`] buffer.
#[derive(Debug, Clone)]
pub struct Captured {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    /// Everything written to the log so far.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Return the contents and clear the buffer.
    pub fn take(&self) -> String {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        let out = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        out
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new(Verbosity::default())
    }
}

impl Log {
    /// A log that writes to stdout.
    pub fn new(verbosity: impl Into<Verbosity>) -> Self {
        Self {
            verbosity: verbosity.into(),
            sink: Sink::Stdout,
        }
    }

    /// A log that writes into memory; read it back through the returned
    /// [`Captured`] handle.
    pub fn capture(verbosity: impl Into<Verbosity>) -> (Self, Captured) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let log = Self {
            verbosity: verbosity.into(),
            sink: Sink::Buffer(Arc::clone(&buf)),
        };
        (log, Captured { buf })
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Same sink, different verbosity.
    pub fn with_verbosity(&self, verbosity: impl Into<Verbosity>) -> Self {
        Self {
            verbosity: verbosity.into(),
            sink: self.sink.clone(),
        }
    }

    /// True when output at `level` would be written.
    pub fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    /// Write `msg` at [`Verbosity::Debug`].
    pub fn debug(&self, msg: &str) {
        if self.enabled(Verbosity::Debug) {
            self.emit(msg, "");
        }
    }

    /// Write `msg` at [`Verbosity::Debug`], prefixing every physical line
    /// with `preface`.
    pub fn debug_with_preface(&self, msg: &str, preface: &str) {
        if self.enabled(Verbosity::Debug) {
            self.emit(msg, preface);
        }
    }

    /// Write `msg` at [`Verbosity::DeepDebug`].
    pub fn deep_debug(&self, msg: &str) {
        if self.enabled(Verbosity::DeepDebug) {
            self.emit(msg, "");
        }
    }

    /// Write `msg` at [`Verbosity::Normal`].
    pub fn info(&self, msg: &str) {
        if self.enabled(Verbosity::Normal) {
            self.emit(msg, "");
        }
    }

    /// Write a warning at [`Verbosity::Normal`].
    pub fn warning(&self, msg: &str) {
        if self.enabled(Verbosity::Normal) {
            self.emit(msg, "WARNING: ");
        }
    }

    /// Write an error. Errors are printed even when silent.
    pub fn error(&self, msg: &str) {
        self.emit(msg, "ERROR: ");
    }

    fn emit(&self, msg: &str, preface: &str) {
        let mut text = String::with_capacity(msg.len() + preface.len() + 1);
        for line in msg.split('\n') {
            text.push_str(preface);
            text.push_str(line);
            text.push('\n');
        }
        match &self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                // Write errors on stdout are ignored.
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Sink::Buffer(buf) => {
                let mut buf = buf.lock().unwrap_or_else(|e| e.into_inner());
                buf.extend_from_slice(text.as_bytes());
            }
        }
    }
}
