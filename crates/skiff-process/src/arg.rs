// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments that may be plain text or filesystem paths.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// One element of a command's argv.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    /// A plain string, passed through untouched.
    Text(String),
    /// A filesystem path, converted to its platform string encoding.
    Path(PathBuf),
    /// An OS string taken verbatim, e.g. from the command line.
    Os(OsString),
}

impl Arg {
    /// The value handed to the OS. Lossless on every platform.
    pub fn into_os_string(self) -> OsString {
        match self {
            Arg::Text(s) => s.into(),
            Arg::Path(p) => p.into_os_string(),
            Arg::Os(s) => s,
        }
    }

    /// Borrowed view of the value handed to the OS.
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            Arg::Text(s) => s.as_ref(),
            Arg::Path(p) => p.as_os_str(),
            Arg::Os(s) => s.as_os_str(),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_owned())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Text(s.clone())
    }
}

impl From<&Path> for Arg {
    fn from(p: &Path) -> Self {
        Arg::Path(p.to_path_buf())
    }
}

impl From<PathBuf> for Arg {
    fn from(p: PathBuf) -> Self {
        Arg::Path(p)
    }
}

impl From<&PathBuf> for Arg {
    fn from(p: &PathBuf) -> Self {
        Arg::Path(p.clone())
    }
}

impl From<OsString> for Arg {
    fn from(s: OsString) -> Self {
        Arg::Os(s)
    }
}

impl From<&OsStr> for Arg {
    fn from(s: &OsStr) -> Self {
        Arg::Os(s.to_owned())
    }
}

/// Normalize an argv sequence: order and count are preserved, paths become
/// their platform string encoding.
pub fn normalize_args<I, A>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    args.into_iter()
        .map(|a| a.into().into_os_string())
        .collect()
}
