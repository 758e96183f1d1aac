// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `skiff.toml` project file.
//!
//! ```toml
//! [project]
//! name = "hello"
//! version = "0.0.1"
//!
//! [app.helloworld]
//! formal_name = "Hello World"
//! bundle = "com.example"
//! description = "A greeting"
//! sources = ["src/helloworld"]
//!
//! [app.helloworld.linux]
//! sources = ["src/linux_extras"]
//!
//! [app.helloworld.linux.appimage]
//! template = "https://example.com/appimage-template.git"
//! ```
//!
//! Each app is resolved for one platform and output format: keys in
//! `[app.<name>.<platform>]` override the app's own keys, and keys in
//! `[app.<name>.<platform>.<format>]` override both. `sources` lists are
//! concatenated instead of replaced.

use crate::ConfigError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const REQUIRED_GLOBAL_KEYS: &[&str] = &["name", "version"];
const REQUIRED_APP_KEYS: &[&str] = &["formal_name", "bundle", "description"];
const ADDITIVE_KEYS: &[&str] = &["sources"];

/// Settings shared by every app in a project.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Project name.
    pub name: String,
    /// Project version.
    pub version: String,
    /// Template used by apps that do not name their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// One app, resolved for a platform and output format.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct AppConfig {
    /// The app's key in the `[app]` table.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Human-readable name.
    pub formal_name: String,
    /// Reverse-DNS bundle prefix.
    pub bundle: String,
    /// One-line description.
    pub description: String,
    /// App version; the project version applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// App-specific template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Source directories packaged with the app.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl AppConfig {
    /// `bundle.name`, the app's unique identifier.
    pub fn app_id(&self) -> String {
        format!("{}.{}", self.bundle, self.name)
    }
}

/// A parsed project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// The `[project]` section.
    pub global: GlobalConfig,
    /// Apps by name.
    pub apps: BTreeMap<String, AppConfig>,
}

/// Read and resolve the project file at `path`.
pub fn load_project(
    path: &Path,
    platform: &str,
    output_format: &str,
) -> Result<Project, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    resolve(&content, &path.display().to_string(), platform, output_format)
}

/// Resolve project file text.
pub fn parse_project(
    content: &str,
    platform: &str,
    output_format: &str,
) -> Result<Project, ConfigError> {
    resolve(content, "skiff.toml", platform, output_format)
}

fn resolve(
    content: &str,
    origin: &str,
    platform: &str,
    output_format: &str,
) -> Result<Project, ConfigError> {
    let parse_err = |reason: String| ConfigError::Parse {
        path: origin.to_string(),
        reason,
    };
    let doc: toml::Table = content.parse().map_err(|e: toml::de::Error| parse_err(e.to_string()))?;

    let global_table = match doc.get("project") {
        Some(toml::Value::Table(t)) => t.clone(),
        Some(_) => return Err(parse_err("[project] must be a table".into())),
        None => {
            return Err(ConfigError::Incomplete {
                section: "Global configuration".into(),
                reason: "missing [project] section".into(),
            });
        }
    };
    require(&global_table, REQUIRED_GLOBAL_KEYS, "Global configuration")?;
    let global: GlobalConfig = toml::Value::Table(global_table)
        .try_into()
        .map_err(|e: toml::de::Error| parse_err(e.to_string()))?;

    let mut apps = BTreeMap::new();
    let app_tables = match doc.get("app") {
        Some(toml::Value::Table(t)) => t.clone(),
        Some(_) => return Err(parse_err("[app] must be a table".into())),
        None => toml::Table::new(),
    };
    for (name, value) in app_tables {
        validate_app_name(&name)?;
        let toml::Value::Table(table) = value else {
            return Err(parse_err(format!("[app.{name}] must be a table")));
        };
        let merged = layer(&table, platform, output_format);
        require(&merged, REQUIRED_APP_KEYS, &format!("Configuration for '{name}'"))?;
        let mut app: AppConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| parse_err(format!("[app.{name}]: {e}")))?;
        app.name = name.clone();
        apps.insert(name, app);
    }

    Ok(Project { global, apps })
}

fn layer(table: &toml::Table, platform: &str, output_format: &str) -> toml::Table {
    let mut merged = toml::Table::new();
    overlay(&mut merged, table);
    if let Some(toml::Value::Table(platform_table)) = table.get(platform) {
        overlay(&mut merged, platform_table);
        if let Some(toml::Value::Table(format_table)) = platform_table.get(output_format) {
            overlay(&mut merged, format_table);
        }
    }
    merged
}

fn overlay(merged: &mut toml::Table, layer: &toml::Table) {
    for (key, value) in layer.iter().filter(|(_, v)| !v.is_table()) {
        match (merged.get_mut(key), value) {
            (Some(toml::Value::Array(existing)), toml::Value::Array(more))
                if ADDITIVE_KEYS.contains(&key.as_str()) =>
            {
                existing.extend(more.iter().cloned());
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
}

fn require(table: &toml::Table, keys: &[&str], section: &str) -> Result<(), ConfigError> {
    let missing: Vec<String> = keys
        .iter()
        .filter(|k| !table.contains_key(**k))
        .map(|k| format!("'{k}'"))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Incomplete {
            section: section.to_string(),
            reason: format!("missing {}", missing.join(", ")),
        })
    }
}

fn validate_app_name(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            reasons: vec![format!(
                "app name '{name}' must start with a lowercase letter and contain only \
                 lowercase letters, digits, '-' or '_'"
            )],
        })
    }
}
