// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by commands.

use skiff_config::ConfigError;
use skiff_git::GitError;
use skiff_template::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from skiff commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The project defines no apps.
    #[error("no apps are defined in the project configuration")]
    NoApps,

    /// The requested app is not in the project.
    #[error("unknown app '{0}'")]
    UnknownApp(String),

    /// The bundle directory is already present.
    #[error("a bundle for '{app}' already exists at {}", .path.display())]
    BundleExists {
        /// App name.
        app: String,
        /// Existing bundle directory.
        path: PathBuf,
    },

    /// No template is configured anywhere for the app.
    #[error("no template configured for '{app}'")]
    NoTemplate {
        /// App name.
        app: String,
    },

    /// A filesystem operation failed.
    #[error("unable to create {}", .path.display())]
    Io {
        /// Path being created.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Project or settings file problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Template rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A git operation failed.
    #[error(transparent)]
    Git(#[from] GitError),
}
