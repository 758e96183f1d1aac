// SPDX-License-Identifier: MIT OR Apache-2.0
//! skiff-template
//!
//! Renders project templates into bundle directories. [`TemplateEngine`] is
//! the seam; [`Cookiecutter`] drives the `cookiecutter` command-line tool
//! through the skiff subprocess runner.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use skiff_process::{Arg, LaunchError, LaunchOptions, Launcher, Subprocess};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors from template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template tool is not on `PATH`.
    #[error("{tool} is not installed")]
    NotInstalled {
        /// Executable that was looked for.
        tool: String,
    },

    /// A context key cannot be passed on the command line.
    #[error("invalid template context key `{0}`")]
    InvalidContextKey(String),

    /// The template tool failed.
    #[error("unable to render template {template}")]
    Render {
        /// Template that was requested.
        template: String,
        /// What the runner reported.
        #[source]
        source: LaunchError,
    },
}

/// Everything needed to render one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRequest {
    /// Template location: a local directory or a repository URL.
    pub template: String,
    /// Branch, tag or commit of the template to use.
    pub checkout: Option<String>,
    /// Directory the rendered project is created in.
    pub output_dir: PathBuf,
    /// Values substituted into the template.
    pub context: BTreeMap<String, String>,
}

impl TemplateRequest {
    /// A request for `template` rendered into `output_dir`.
    pub fn new(template: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Pin the template version.
    #[must_use]
    pub fn checkout(mut self, reference: impl Into<String>) -> Self {
        self.checkout = Some(reference.into());
        self
    }

    /// Add a context value.
    #[must_use]
    pub fn context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Something that can turn a template into files on disk.
pub trait TemplateEngine {
    /// Render `request`.
    fn generate(&self, request: &TemplateRequest) -> Result<(), TemplateError>;
}

/// Renders templates with the `cookiecutter` executable.
#[derive(Debug)]
pub struct Cookiecutter<'a, L: Launcher> {
    sub: &'a Subprocess<L>,
    program: String,
}

impl<'a, L: Launcher> Cookiecutter<'a, L> {
    /// Use the `cookiecutter` found on `PATH`.
    pub fn new(sub: &'a Subprocess<L>) -> Self {
        Self::with_program(sub, "cookiecutter")
    }

    /// Use a specific executable.
    pub fn with_program(sub: &'a Subprocess<L>, program: impl Into<String>) -> Self {
        Self {
            sub,
            program: program.into(),
        }
    }

    /// Fail early when the executable cannot be found.
    pub fn verify(&self) -> Result<(), TemplateError> {
        if skiff_which::command_exists(&self.program) {
            Ok(())
        } else {
            Err(TemplateError::NotInstalled {
                tool: self.program.clone(),
            })
        }
    }

    /// The argv used to render `request`.
    pub fn command_line(&self, request: &TemplateRequest) -> Result<Vec<Arg>, TemplateError> {
        let mut argv: Vec<Arg> = vec![self.program.as_str().into(), "--no-input".into()];
        if let Some(reference) = &request.checkout {
            argv.push("--checkout".into());
            argv.push(reference.into());
        }
        argv.push("--output-dir".into());
        argv.push(request.output_dir.clone().into());
        argv.push("--".into());
        argv.push(request.template.as_str().into());
        for (key, value) in &request.context {
            if key.is_empty() || key.contains('=') {
                return Err(TemplateError::InvalidContextKey(key.clone()));
            }
            argv.push(format!("{key}={value}").into());
        }
        Ok(argv)
    }
}

impl<L: Launcher> TemplateEngine for Cookiecutter<'_, L> {
    fn generate(&self, request: &TemplateRequest) -> Result<(), TemplateError> {
        let argv = self.command_line(request)?;
        debug!(
            target: "skiff.template",
            template = %request.template,
            output_dir = %request.output_dir.display(),
            "rendering template"
        );
        self.sub
            .run(argv, LaunchOptions::new().check())
            .map_err(|source| TemplateError::Render {
                template: request.template.clone(),
                source,
            })?;
        Ok(())
    }
}
