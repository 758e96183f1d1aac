// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading settings and project files from disk.

use skiff_config::{
    ConfigError, SkiffConfig, load_config, load_project, merge_configs, validate_config,
};
use std::fs;

#[test]
fn project_file_resolves_per_platform() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skiff.toml");
    fs::write(
        &path,
        r#"
[project]
name = "demo"
version = "1.4.2"

[app.demo]
formal_name = "Demo App"
bundle = "org.example"
description = "Demonstration"
sources = ["src/demo"]

[app.demo.windows.msi]
template = "https://example.com/msi.git"
"#,
    )
    .unwrap();

    let linux = load_project(&path, "linux", "appimage").unwrap();
    let windows = load_project(&path, "windows", "msi").unwrap();

    assert_eq!(linux.global.version, "1.4.2");
    assert_eq!(linux.apps["demo"].template, None);
    assert_eq!(
        windows.apps["demo"].template.as_deref(),
        Some("https://example.com/msi.git")
    );
}

#[test]
fn project_parse_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skiff.toml");
    fs::write(&path, "[project\n").unwrap();

    let err = load_project(&path, "linux", "appimage").unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("skiff.toml"));
}

#[test]
fn settings_file_then_cli_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "verbosity = 2\ntemplate = \"/srv/templates/app\"\n").unwrap();

    let from_file = load_config(Some(&path)).unwrap();
    let cli = SkiffConfig {
        template_branch: Some("next".into()),
        ..Default::default()
    };
    let merged = merge_configs(from_file, cli);

    validate_config(&merged).unwrap();
    assert_eq!(merged.template_branch.as_deref(), Some("next"));
    assert!(merged.template.is_some());
}

#[test]
fn settings_serialize_without_empty_fields() {
    let cfg = SkiffConfig {
        verbosity: Some(1),
        ..Default::default()
    };
    let text = toml::to_string(&cfg).unwrap();
    assert_eq!(text.trim(), "verbosity = 1");
}
