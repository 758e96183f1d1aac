// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration for skiff.
//!
//! Two kinds of file are handled here: the tool settings in [`SkiffConfig`]
//! (verbosity, logging and template defaults, with `SKIFF_*` environment
//! overrides) and the per-project `skiff.toml` described in [`project`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod project;

pub use project::{AppConfig, GlobalConfig, Project, load_project, parse_project};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested file does not exist or cannot be read.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file is not valid TOML, or has the wrong shape.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// File that was being parsed.
        path: String,
        /// Parser detail.
        reason: String,
    },

    /// A section parsed but lacks required keys.
    #[error("{section} is incomplete ({reason})")]
    Incomplete {
        /// Human name of the section, e.g. `Configuration for 'helloworld'`.
        section: String,
        /// What is missing.
        reason: String,
    },

    /// Values are present but unusable.
    #[error("config validation failed: {reasons:?}")]
    Validation {
        /// Individual validation failures.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Tool settings
// ---------------------------------------------------------------------------

/// Recognised `log_level` values.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Highest verbosity level (`deep debug`).
pub const MAX_VERBOSITY: u8 = 3;

/// Tool-wide settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SkiffConfig {
    /// Default verbosity: 0 silent, 1 normal, 2 debug, 3 deep debug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<u8>,

    /// `tracing` level for developer logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Template used when neither the app nor the project names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Template branch; defaults to the tool's `major.minor` version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_branch: Option<String>,

    /// Directory where remote templates are cloned and kept up to date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_cache: Option<String>,
}

/// Load [`SkiffConfig`] from an optional TOML file, then apply `SKIFF_*`
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<SkiffConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content).map_err(|reason| ConfigError::Parse {
                path: p.display().to_string(),
                reason,
            })?
        }
        None => SkiffConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn parse_toml(content: &str) -> Result<SkiffConfig, String> {
    toml::from_str::<SkiffConfig>(content).map_err(|e| e.to_string())
}

/// Apply overrides from the process environment.
///
/// Recognised variables:
/// - `SKIFF_VERBOSITY`
/// - `SKIFF_LOG_LEVEL`
/// - `SKIFF_TEMPLATE`
/// - `SKIFF_TEMPLATE_BRANCH`
/// - `SKIFF_TEMPLATE_CACHE`
pub fn apply_env_overrides(config: &mut SkiffConfig) -> Result<(), ConfigError> {
    apply_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides using `lookup` in place of the process environment.
pub fn apply_env_overrides_from<F>(config: &mut SkiffConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("SKIFF_VERBOSITY") {
        let level = val.trim().parse::<u8>().map_err(|_| ConfigError::Validation {
            reasons: vec![format!("SKIFF_VERBOSITY must be a number, got '{val}'")],
        })?;
        config.verbosity = Some(level);
    }
    if let Some(val) = lookup("SKIFF_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Some(val) = lookup("SKIFF_TEMPLATE") {
        config.template = Some(val);
    }
    if let Some(val) = lookup("SKIFF_TEMPLATE_BRANCH") {
        config.template_branch = Some(val);
    }
    if let Some(val) = lookup("SKIFF_TEMPLATE_CACHE") {
        config.template_cache = Some(val);
    }
    Ok(())
}

/// Merge two configurations; values in `overlay` win.
pub fn merge_configs(base: SkiffConfig, overlay: SkiffConfig) -> SkiffConfig {
    SkiffConfig {
        verbosity: overlay.verbosity.or(base.verbosity),
        log_level: overlay.log_level.or(base.log_level),
        template: overlay.template.or(base.template),
        template_branch: overlay.template_branch.or(base.template_branch),
        template_cache: overlay.template_cache.or(base.template_cache),
    }
}

/// Check value ranges.
pub fn validate_config(config: &SkiffConfig) -> Result<(), ConfigError> {
    let mut reasons = Vec::new();

    if let Some(v) = config.verbosity
        && v > MAX_VERBOSITY
    {
        reasons.push(format!("verbosity {v} out of range (0..={MAX_VERBOSITY})"));
    }
    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        reasons.push(format!("invalid log_level '{level}'"));
    }
    if let Some(ref template) = config.template
        && template.trim().is_empty()
    {
        reasons.push("template must not be empty".into());
    }
    if let Some(ref branch) = config.template_branch
        && branch.trim().is_empty()
    {
        reasons.push("template_branch must not be empty".into());
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation { reasons })
    }
}
