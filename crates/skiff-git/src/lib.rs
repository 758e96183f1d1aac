// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! skiff-git
//!
//! Git operations used to fetch and pin project templates. Every call goes
//! through a [`Subprocess`], so tests can swap in a recording launcher and
//! debug verbosity traces each git command.

use skiff_process::{Arg, LaunchError, LaunchOptions, Launcher, Subprocess};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors from version-control operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` is not on `PATH`.
    #[error("git is not installed; install it from https://git-scm.com/downloads")]
    NotInstalled,

    /// A git command failed.
    #[error(transparent)]
    Command(#[from] LaunchError),
}

/// Git commands bound to a runner.
#[derive(Debug)]
pub struct Git<'a, L: Launcher> {
    sub: &'a Subprocess<L>,
    program: String,
}

impl<'a, L: Launcher> Git<'a, L> {
    /// Use the `git` found on `PATH`.
    pub fn new(sub: &'a Subprocess<L>) -> Self {
        Self::with_program(sub, "git")
    }

    /// Use a specific git executable.
    pub fn with_program(sub: &'a Subprocess<L>, program: impl Into<String>) -> Self {
        Self {
            sub,
            program: program.into(),
        }
    }

    /// Fail early when git cannot be found.
    pub fn verify(&self) -> Result<(), GitError> {
        if skiff_which::command_exists(&self.program) {
            Ok(())
        } else {
            Err(GitError::NotInstalled)
        }
    }

    /// Clone `url` into `dest`.
    pub fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        debug!(target: "skiff.git", %url, dest = %dest.display(), "cloning");
        self.sub.run(
            [
                Arg::from(self.program.as_str()),
                Arg::from("clone"),
                Arg::from("--"),
                Arg::from(url),
                Arg::from(dest),
            ],
            LaunchOptions::new().check(),
        )?;
        Ok(())
    }

    /// Fetch from the default remote.
    pub fn fetch(&self, repo: &Path) -> Result<(), GitError> {
        self.git(repo, &["fetch"])
    }

    /// Check out a branch, tag or commit.
    pub fn checkout(&self, repo: &Path, reference: &str) -> Result<(), GitError> {
        debug!(target: "skiff.git", reference, "checking out");
        self.git(repo, &["checkout", reference])
    }

    /// Name of the checked-out branch.
    pub fn current_branch(&self, repo: &Path) -> Result<String, GitError> {
        self.read(repo, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Full hash of `HEAD`.
    pub fn head_commit(&self, repo: &Path) -> Result<String, GitError> {
        self.read(repo, &["rev-parse", "HEAD"])
    }

    fn git(&self, repo: &Path, args: &[&str]) -> Result<(), GitError> {
        let argv = std::iter::once(self.program.as_str()).chain(args.iter().copied());
        self.sub.run(argv, LaunchOptions::new().cwd(repo).check())?;
        Ok(())
    }

    fn read(&self, repo: &Path, args: &[&str]) -> Result<String, GitError> {
        let argv = std::iter::once(self.program.as_str()).chain(args.iter().copied());
        let out = self.sub.check_output(argv, LaunchOptions::new().cwd(repo))?;
        Ok(out.to_text().trim().to_string())
    }
}
