// SPDX-License-Identifier: MIT OR Apache-2.0
//! skiff-command
//!
//! The state every skiff command starts from: target platform and output
//! format, the subprocess runner, tool settings and the apps parsed from
//! `skiff.toml`. [`create_app`] turns an app's template into a bundle.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod create;
mod error;
mod layout;

pub use create::{create_all, create_app};
pub use error::CommandError;
pub use layout::{AppDir, PlatformCommand};

use skiff_config::{AppConfig, GlobalConfig, SkiffConfig, load_project};
use skiff_console::Log;
use skiff_git::Git;
use skiff_process::{Launcher, OsLauncher, Subprocess};
use skiff_template::Cookiecutter;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `major.minor` of this build of skiff.
///
/// Template repositories carry a branch per supported skiff release, so this
/// is the default template checkout.
pub fn version_tag() -> String {
    let mut parts = env!("CARGO_PKG_VERSION").split('.');
    let major = parts.next().unwrap_or("0");
    let minor = parts.next().unwrap_or("0");
    format!("{major}.{minor}")
}

/// Shared command state.
#[derive(Debug)]
pub struct BaseCommand<L: Launcher = OsLauncher> {
    platform: String,
    output_format: String,
    sub: Subprocess<L>,
    settings: SkiffConfig,
    global_config: Option<GlobalConfig>,
    apps: BTreeMap<String, AppConfig>,
}

impl<L: Launcher> BaseCommand<L> {
    /// A command for `platform`/`output_format` running tools through `sub`.
    pub fn new(
        platform: impl Into<String>,
        output_format: impl Into<String>,
        sub: Subprocess<L>,
        settings: SkiffConfig,
    ) -> Self {
        Self {
            platform: platform.into(),
            output_format: output_format.into(),
            sub,
            settings,
            global_config: None,
            apps: BTreeMap::new(),
        }
    }

    /// Seed the command with already-resolved apps.
    #[must_use]
    pub fn with_apps(mut self, apps: BTreeMap<String, AppConfig>) -> Self {
        self.apps = apps;
        self
    }

    /// Target platform, e.g. `linux`.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Target output format, e.g. `appimage`.
    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    /// User-facing log.
    pub fn log(&self) -> &Log {
        self.sub.log()
    }

    /// The runner every external tool goes through.
    pub fn subprocess(&self) -> &Subprocess<L> {
        &self.sub
    }

    /// Tool settings.
    pub fn settings(&self) -> &SkiffConfig {
        &self.settings
    }

    /// The `[project]` section, once a project file has been parsed.
    pub fn global_config(&self) -> Option<&GlobalConfig> {
        self.global_config.as_ref()
    }

    /// Apps by name.
    pub fn apps(&self) -> &BTreeMap<String, AppConfig> {
        &self.apps
    }

    /// Look up one app.
    pub fn app(&self, name: &str) -> Result<&AppConfig, CommandError> {
        self.apps
            .get(name)
            .ok_or_else(|| CommandError::UnknownApp(name.to_string()))
    }

    /// See [`version_tag`].
    pub fn version_tag(&self) -> String {
        version_tag()
    }

    /// Read `path` and resolve its apps for this command's platform and
    /// output format.
    pub fn parse_config(&mut self, path: &Path) -> Result<(), CommandError> {
        let project = load_project(path, &self.platform, &self.output_format)?;
        debug!(
            target: "skiff.command",
            path = %path.display(),
            apps = project.apps.len(),
            "parsed project"
        );
        self.global_config = Some(project.global);
        self.apps.extend(project.apps);
        Ok(())
    }

    /// Git bound to this command's runner.
    pub fn git(&self) -> Git<'_, L> {
        Git::new(&self.sub)
    }

    /// The template engine bound to this command's runner.
    pub fn template_engine(&self) -> Cookiecutter<'_, L> {
        Cookiecutter::new(&self.sub)
    }

    /// Check that the external tools commands rely on are installed.
    pub fn verify_tools(&self) -> Result<(), CommandError> {
        self.git().verify()?;
        self.template_engine().verify()?;
        Ok(())
    }

    /// The template for `app`: its own, else the project's, else the
    /// configured default.
    pub fn template_for(&self, app: &AppConfig) -> Result<String, CommandError> {
        app.template
            .clone()
            .or_else(|| self.global_config.as_ref().and_then(|g| g.template.clone()))
            .or_else(|| self.settings.template.clone())
            .ok_or_else(|| CommandError::NoTemplate {
                app: app.name.clone(),
            })
    }

    /// The template branch: the configured one, else [`version_tag`].
    pub fn template_branch(&self) -> String {
        self.settings
            .template_branch
            .clone()
            .unwrap_or_else(version_tag)
    }

    /// Where remote templates are cached, if caching is configured.
    pub fn template_cache(&self) -> Option<PathBuf> {
        self.settings.template_cache.as_ref().map(PathBuf::from)
    }

    /// The app's version, falling back to the project's.
    pub fn app_version(&self, app: &AppConfig) -> Option<String> {
        app.version
            .clone()
            .or_else(|| self.global_config.as_ref().map(|g| g.version.clone()))
    }
}
