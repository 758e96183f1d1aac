// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for the `skiff-git` crate.
//!
//! Most tests use a recording launcher and check the argv git receives; the
//! Unix-only tests at the bottom drive a real `git` when one is installed.

use skiff_console::{Log, Verbosity};
use skiff_git::{Git, GitError};
use skiff_process::{
    Environment, LaunchError, LaunchMode, Output, RecordingLauncher, Subprocess,
};
use std::ffi::OsString;
use std::path::Path;

// ── helpers ──────────────────────────────────────────────────────────

fn recording() -> Subprocess<RecordingLauncher> {
    let (log, _) = Log::capture(Verbosity::Normal);
    Subprocess::with_launcher(log, RecordingLauncher::new()).with_ambient_env(Environment::new())
}

fn argv(sub: &Subprocess<RecordingLauncher>) -> Vec<String> {
    let (_, call) = sub.launcher().last_call().expect("git was called");
    call.argv
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

// ── argv shape ───────────────────────────────────────────────────────

#[test]
fn clone_passes_url_and_destination() {
    let sub = recording();
    let dest = Path::new("/tmp/templates/app");

    Git::new(&sub)
        .clone_repo("https://example.com/template.git", dest)
        .unwrap();

    let (mode, call) = sub.launcher().last_call().unwrap();
    assert_eq!(mode, LaunchMode::Run);
    assert!(call.check);
    assert_eq!(
        call.argv,
        vec![
            OsString::from("git"),
            OsString::from("clone"),
            OsString::from("--"),
            OsString::from("https://example.com/template.git"),
            dest.as_os_str().to_owned(),
        ]
    );
}

#[test]
fn clone_separates_options_from_the_url() {
    let sub = recording();
    Git::new(&sub)
        .clone_repo("--upload-pack=touch", Path::new("dest"))
        .unwrap();
    assert_eq!(argv(&sub), ["git", "clone", "--", "--upload-pack=touch", "dest"]);
}

#[test]
fn checkout_runs_in_the_repository() {
    let sub = recording();
    let repo = Path::new("/work/repo");

    Git::new(&sub).checkout(repo, "v0.3").unwrap();

    let (_, call) = sub.launcher().last_call().unwrap();
    assert_eq!(call.cwd, Some(repo.as_os_str().to_owned()));
    assert_eq!(argv(&sub), ["git", "checkout", "v0.3"]);
}

#[test]
fn fetch_runs_checked() {
    let sub = recording();
    Git::new(&sub).fetch(Path::new("/work/repo")).unwrap();
    let (_, call) = sub.launcher().last_call().unwrap();
    assert!(call.check);
    assert_eq!(argv(&sub), ["git", "fetch"]);
}

#[test]
fn current_branch_trims_output() {
    let sub = recording();
    sub.launcher().push_output(Output::Text("main\n".into()));

    let branch = Git::new(&sub).current_branch(Path::new("/work/repo")).unwrap();

    assert_eq!(branch, "main");
    assert_eq!(argv(&sub), ["git", "rev-parse", "--abbrev-ref", "HEAD"]);
    let (mode, _) = sub.launcher().last_call().unwrap();
    assert_eq!(mode, LaunchMode::CheckOutput);
}

#[test]
fn custom_program_is_used() {
    let sub = recording();
    sub.launcher().push_output(Output::Text("abc123\n".into()));
    let head = Git::with_program(&sub, "/opt/git/bin/git")
        .head_commit(Path::new("."))
        .unwrap();
    assert_eq!(head, "abc123");
    assert_eq!(argv(&sub)[0], "/opt/git/bin/git");
}

// ── errors ───────────────────────────────────────────────────────────

#[test]
fn launcher_failures_surface_as_command_errors() {
    let sub = recording();
    sub.launcher().fail_next(LaunchError::NonZeroExit {
        command: "git clone".into(),
        code: Some(128),
        stdout: None,
        stderr: None,
    });

    let err = Git::new(&sub)
        .clone_repo("https://example.com/missing.git", Path::new("/tmp/x"))
        .unwrap_err();

    match err {
        GitError::Command(inner) => assert_eq!(inner.exit_code(), Some(128)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn verify_reports_missing_git() {
    let sub = recording();
    let err = Git::with_program(&sub, "skiff-no-such-git").verify().unwrap_err();
    assert!(matches!(err, GitError::NotInstalled));
    assert!(err.to_string().contains("not installed"));
}

#[test]
fn debug_verbosity_traces_git_commands() {
    let (log, out) = Log::capture(Verbosity::Debug);
    let sub = Subprocess::with_launcher(log, RecordingLauncher::new());

    Git::new(&sub).fetch(Path::new("/work/repo")).unwrap();

    assert_eq!(out.contents(), "\n>>> Running Command:\n>>>     git fetch\n");
}

// ── real git ─────────────────────────────────────────────────────────

#[cfg(unix)]
#[test]
fn real_git_reports_branch_and_head() {
    if !skiff_which::command_exists("git") {
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let sub = Subprocess::new(Log::capture(Verbosity::Normal).0);
    let repo = tmp.path();

    sub.run(
        ["git", "init", "-q"],
        skiff_process::LaunchOptions::new().cwd(repo).check(),
    )
    .unwrap();
    sub.run(
        ["git", "checkout", "-q", "-b", "trunk"],
        skiff_process::LaunchOptions::new().cwd(repo).check(),
    )
    .unwrap();
    std::fs::write(repo.join("README"), "hi\n").unwrap();
    sub.run(
        ["git", "add", "-A"],
        skiff_process::LaunchOptions::new().cwd(repo).check(),
    )
    .unwrap();
    sub.run(
        [
            "git",
            "-c",
            "user.name=skiff",
            "-c",
            "user.email=skiff@local",
            "commit",
            "-qm",
            "baseline",
        ],
        skiff_process::LaunchOptions::new().cwd(repo).check(),
    )
    .unwrap();

    let git = Git::new(&sub);
    git.verify().unwrap();
    assert_eq!(git.current_branch(repo).unwrap(), "trunk");
    assert_eq!(git.head_commit(repo).unwrap().len(), 40);
}
