// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for the shared command state and bundle creation.

use skiff_command::{AppDir, BaseCommand, CommandError, PlatformCommand, create_all, create_app};
use skiff_config::{AppConfig, SkiffConfig};
use skiff_console::{Captured, Log, Verbosity};
use skiff_process::{Environment, LaunchError, LaunchMode, RecordingLauncher, Subprocess};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ── helpers ──────────────────────────────────────────────────────────

const PROJECT: &str = r#"
[project]
name = "greetings"
version = "0.3.1"
template = "https://example.com/project-template.git"

[app.helloworld]
formal_name = "Hello World"
bundle = "com.example"
description = "Says hello"

[app.goodbye]
formal_name = "Goodbye"
bundle = "com.example"
description = "Says goodbye"
version = "1.0"

[app.goodbye.linux.appimage]
template = "/srv/templates/goodbye"
"#;

fn command(settings: SkiffConfig) -> (BaseCommand<RecordingLauncher>, Captured) {
    let (log, out) = Log::capture(Verbosity::Normal);
    let sub = Subprocess::with_launcher(log, RecordingLauncher::new())
        .with_ambient_env(Environment::new());
    (BaseCommand::new("linux", "appimage", sub, settings), out)
}

fn parsed(settings: SkiffConfig) -> (BaseCommand<RecordingLauncher>, Captured, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skiff.toml");
    fs::write(&path, PROJECT).unwrap();
    let (mut cmd, out) = command(settings);
    cmd.parse_config(&path).unwrap();
    (cmd, out, dir)
}

fn argv(call: &skiff_process::Invocation) -> Vec<String> {
    call.argv
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn app(name: &str, template: Option<&str>) -> AppConfig {
    AppConfig {
        name: name.into(),
        formal_name: name.to_uppercase(),
        bundle: "org.example".into(),
        description: "test app".into(),
        version: None,
        template: template.map(Into::into),
        sources: vec![],
    }
}

// ── configuration ────────────────────────────────────────────────────

#[test]
fn parse_config_loads_global_and_apps() {
    let (cmd, _, _dir) = parsed(SkiffConfig::default());

    assert_eq!(cmd.global_config().unwrap().name, "greetings");
    assert_eq!(
        cmd.apps().keys().collect::<Vec<_>>(),
        ["goodbye", "helloworld"]
    );
    assert_eq!(
        cmd.app("goodbye").unwrap().template.as_deref(),
        Some("/srv/templates/goodbye")
    );
}

#[test]
fn parse_config_missing_file() {
    let (mut cmd, _) = command(SkiffConfig::default());
    let err = cmd
        .parse_config(Path::new("/nonexistent/skiff.toml"))
        .unwrap_err();
    assert!(matches!(err, CommandError::Config(_)));
    assert!(err.to_string().contains("configuration file not found"));
}

#[test]
fn unknown_app_is_reported() {
    let (cmd, _, _dir) = parsed(SkiffConfig::default());
    let err = cmd.app("nope").unwrap_err();
    assert!(matches!(err, CommandError::UnknownApp(ref n) if n == "nope"));
}

#[test]
fn version_tag_is_major_minor() {
    let (cmd, _) = command(SkiffConfig::default());
    let tag = cmd.version_tag();
    assert_eq!(tag.split('.').count(), 2);
    assert!(env!("CARGO_PKG_VERSION").starts_with(&tag));
}

#[test]
fn template_precedence() {
    let settings = SkiffConfig {
        template: Some("default-template".into()),
        ..Default::default()
    };
    let (cmd, _, _dir) = parsed(settings.clone());

    assert_eq!(
        cmd.template_for(cmd.app("goodbye").unwrap()).unwrap(),
        "/srv/templates/goodbye"
    );
    assert_eq!(
        cmd.template_for(cmd.app("helloworld").unwrap()).unwrap(),
        "https://example.com/project-template.git"
    );

    let (bare, _) = command(settings);
    assert_eq!(
        bare.template_for(&app("solo", None)).unwrap(),
        "default-template"
    );
}

#[test]
fn missing_template_is_an_error() {
    let (cmd, _) = command(SkiffConfig::default());
    let err = cmd.template_for(&app("solo", None)).unwrap_err();
    assert!(matches!(err, CommandError::NoTemplate { .. }));
}

#[test]
fn template_branch_defaults_to_version_tag() {
    let (cmd, _) = command(SkiffConfig::default());
    assert_eq!(cmd.template_branch(), cmd.version_tag());

    let (cmd, _) = command(SkiffConfig {
        template_branch: Some("main".into()),
        ..Default::default()
    });
    assert_eq!(cmd.template_branch(), "main");
}

// ── create ───────────────────────────────────────────────────────────

#[test]
fn create_app_renders_template_into_bundle_parent() {
    let (cmd, out, _dir) = parsed(SkiffConfig::default());
    let base = tempfile::tempdir().unwrap();
    let layout = AppDir::new(cmd.platform(), cmd.output_format());

    let bundle = create_app(&cmd, &layout, "helloworld", base.path()).unwrap();

    assert_eq!(bundle, base.path().join("linux/appimage/Hello World"));
    assert!(base.path().join("linux/appimage").is_dir());

    let (mode, call) = cmd.subprocess().launcher().last_call().unwrap();
    assert_eq!(mode, LaunchMode::Run);
    let tag = cmd.version_tag();
    let output_dir = base.path().join("linux/appimage");
    assert_eq!(
        argv(&call),
        [
            "cookiecutter",
            "--no-input",
            "--checkout",
            tag.as_str(),
            "--output-dir",
            output_dir.to_str().unwrap(),
            "--",
            "https://example.com/project-template.git",
            "app_name=helloworld",
            "bundle=com.example",
            "description=Says hello",
            "formal_name=Hello World",
            "output_format=appimage",
            "platform=linux",
            "version=0.3.1",
        ]
    );
    assert!(out.contents().contains("Generating a linux appimage bundle for Hello World"));
}

#[test]
fn create_app_uses_app_version_when_set() {
    let (cmd, _, _dir) = parsed(SkiffConfig::default());
    let base = tempfile::tempdir().unwrap();

    create_app(&cmd, &AppDir::new("linux", "appimage"), "goodbye", base.path()).unwrap();

    let (_, call) = cmd.subprocess().launcher().last_call().unwrap();
    assert!(argv(&call).contains(&"version=1.0".to_string()));
}

#[test]
fn create_app_refuses_existing_bundle() {
    let (cmd, _, _dir) = parsed(SkiffConfig::default());
    let base = tempfile::tempdir().unwrap();
    let layout = AppDir::new("linux", "appimage");
    let existing = layout.bundle_path(cmd.app("helloworld").unwrap(), base.path());
    fs::create_dir_all(&existing).unwrap();

    let err = create_app(&cmd, &layout, "helloworld", base.path()).unwrap_err();

    assert!(matches!(err, CommandError::BundleExists { ref path, .. } if *path == existing));
    assert_eq!(cmd.subprocess().launcher().call_count(), 0);
}

#[test]
fn create_app_surfaces_template_failures() {
    let (cmd, _, _dir) = parsed(SkiffConfig::default());
    let base = tempfile::tempdir().unwrap();
    cmd.subprocess().launcher().fail_next(LaunchError::NonZeroExit {
        command: "cookiecutter".into(),
        code: Some(2),
        stdout: None,
        stderr: None,
    });

    let err = create_app(&cmd, &AppDir::new("linux", "appimage"), "helloworld", base.path())
        .unwrap_err();

    assert!(matches!(err, CommandError::Template(_)));
}

#[test]
fn create_all_covers_every_app() {
    let (cmd, _, _dir) = parsed(SkiffConfig::default());
    let base = tempfile::tempdir().unwrap();

    let bundles = create_all(&cmd, &AppDir::new("linux", "appimage"), base.path()).unwrap();

    assert_eq!(bundles.len(), 2);
    assert_eq!(cmd.subprocess().launcher().call_count(), 2);
}

#[test]
fn create_all_without_apps() {
    let (cmd, _) = command(SkiffConfig::default());
    let err = create_all(&cmd, &AppDir::new("linux", "appimage"), Path::new(".")).unwrap_err();
    assert!(matches!(err, CommandError::NoApps));
}

// ── template cache ───────────────────────────────────────────────────

#[test]
fn remote_template_is_cloned_into_cache() {
    let cache = tempfile::tempdir().unwrap();
    let settings = SkiffConfig {
        template_cache: Some(cache.path().display().to_string()),
        template_branch: Some("0.3".into()),
        ..Default::default()
    };
    let (cmd, _, _dir) = parsed(settings);
    let base = tempfile::tempdir().unwrap();

    create_app(&cmd, &AppDir::new("linux", "appimage"), "helloworld", base.path()).unwrap();

    let calls = cmd.subprocess().launcher().calls();
    let cached = cache.path().join("project-template");
    assert_eq!(calls.len(), 3);
    assert_eq!(
        argv(&calls[0].1),
        [
            "git",
            "clone",
            "--",
            "https://example.com/project-template.git",
            cached.to_str().unwrap(),
        ]
    );
    assert_eq!(argv(&calls[1].1), ["git", "checkout", "origin/0.3"]);
    assert_eq!(calls[1].1.cwd.as_deref(), Some(cached.as_os_str()));

    let render = argv(&calls[2].1);
    assert!(!render.contains(&"--checkout".to_string()));
    assert_eq!(render[5], cached.to_str().unwrap());
}

#[test]
fn deep_debug_names_the_template_cache() {
    let cache = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skiff.toml");
    fs::write(&path, PROJECT).unwrap();
    let (log, out) = Log::capture(Verbosity::DeepDebug);
    let sub = Subprocess::with_launcher(log, RecordingLauncher::new())
        .with_ambient_env(Environment::new());
    let settings = SkiffConfig {
        template_cache: Some(cache.path().display().to_string()),
        ..Default::default()
    };
    let mut cmd = BaseCommand::new("linux", "appimage", sub, settings);
    cmd.parse_config(&path).unwrap();
    let base = tempfile::tempdir().unwrap();

    create_app(&cmd, &AppDir::new("linux", "appimage"), "helloworld", base.path()).unwrap();

    let expected = format!(
        "Template cache for https://example.com/project-template.git: {}",
        cache.path().join("project-template").display()
    );
    assert!(out.contents().contains(&expected));
}

#[test]
fn cached_template_is_fetched_not_cloned() {
    let cache = tempfile::tempdir().unwrap();
    fs::create_dir_all(cache.path().join("project-template")).unwrap();
    let settings = SkiffConfig {
        template_cache: Some(cache.path().display().to_string()),
        ..Default::default()
    };
    let (cmd, _, _dir) = parsed(settings);
    let base = tempfile::tempdir().unwrap();

    create_app(&cmd, &AppDir::new("linux", "appimage"), "helloworld", base.path()).unwrap();

    let calls = cmd.subprocess().launcher().calls();
    assert_eq!(argv(&calls[0].1), ["git", "fetch"]);
    assert_eq!(argv(&calls[1].1)[1], "checkout");
}

#[test]
fn failed_fetch_warns_and_uses_cached_copy() {
    let cache = tempfile::tempdir().unwrap();
    fs::create_dir_all(cache.path().join("project-template")).unwrap();
    let settings = SkiffConfig {
        template_cache: Some(cache.path().display().to_string()),
        ..Default::default()
    };
    let (cmd, out, _dir) = parsed(settings);
    let base = tempfile::tempdir().unwrap();
    cmd.subprocess().launcher().fail_next(LaunchError::NonZeroExit {
        command: "git fetch".into(),
        code: Some(128),
        stdout: None,
        stderr: None,
    });

    create_app(&cmd, &AppDir::new("linux", "appimage"), "helloworld", base.path()).unwrap();

    assert!(out.contents().contains("WARNING: Unable to update template"));
    assert_eq!(cmd.subprocess().launcher().call_count(), 3);
}

#[test]
fn local_templates_skip_the_cache() {
    let cache = tempfile::tempdir().unwrap();
    let settings = SkiffConfig {
        template_cache: Some(cache.path().display().to_string()),
        ..Default::default()
    };
    let (cmd, _, _dir) = parsed(settings);
    let base = tempfile::tempdir().unwrap();

    create_app(&cmd, &AppDir::new("linux", "appimage"), "goodbye", base.path()).unwrap();

    let calls = cmd.subprocess().launcher().calls();
    assert_eq!(calls.len(), 1);
    assert!(argv(&calls[0].1).contains(&"/srv/templates/goodbye".to_string()));
}

// ── seeded apps ──────────────────────────────────────────────────────

#[test]
fn with_apps_skips_the_project_file() {
    let (cmd, _) = command(SkiffConfig::default());
    let mut apps = BTreeMap::new();
    apps.insert("solo".to_string(), app("solo", Some("/t")));
    let cmd = cmd.with_apps(apps);
    let base = tempfile::tempdir().unwrap();

    create_app(&cmd, &AppDir::new("linux", "appimage"), "solo", base.path()).unwrap();

    let (_, call) = cmd.subprocess().launcher().last_call().unwrap();
    assert!(!argv(&call).iter().any(|a| a.starts_with("version=")));
}
