// SPDX-License-Identifier: MIT OR Apache-2.0
//! skiff-process
//!
//! Runs the external tools skiff depends on (template generators, version
//! control, compilers, packagers). [`Subprocess`] normalizes arguments,
//! overlays environment variables on the ambient environment and traces
//! commands to the console log, then hands the call to a [`Launcher`]:
//! [`OsLauncher`] for real processes, [`RecordingLauncher`] in tests.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod arg;
pub mod env;
pub mod error;
pub mod launcher;
pub mod options;
pub mod os;
pub mod recording;
pub mod runner;

pub use arg::{Arg, normalize_args};
pub use env::Environment;
pub use error::LaunchError;
pub use launcher::{Completed, Launcher, Output};
pub use options::{Invocation, LaunchMode, LaunchOptions, StdioMode};
pub use os::{OsLauncher, Process};
pub use recording::{RecordedHandle, RecordingLauncher};
pub use runner::Subprocess;
