// SPDX-License-Identifier: MIT OR Apache-2.0
//! Find the external tools skiff shells out to.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const EXTENSIONS: &[&str] = &["", ".exe", ".cmd", ".bat", ".com"];
#[cfg(not(windows))]
const EXTENSIONS: &[&str] = &[""];

/// Locate `tool` on the current `PATH`, like the shell's `which`.
///
/// A name with more than one path component is checked as given.
pub fn which(tool: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    which_in(tool, &path)
}

/// Locate `tool` using an explicit `PATH`-style search list.
pub fn which_in(tool: &str, search_path: &OsStr) -> Option<PathBuf> {
    let candidate = Path::new(tool);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    std::env::split_paths(search_path).find_map(|dir| {
        EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{tool}{ext}")))
            .find(|p| is_executable(p))
    })
}

/// True when `tool` can be found.
pub fn command_exists(tool: &str) -> bool {
    which(tool).is_some()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
