// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bundle creation.

use crate::{BaseCommand, CommandError, PlatformCommand};
use skiff_process::Launcher;
use skiff_template::{TemplateEngine, TemplateRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Render `app_name`'s template into its bundle directory and return the
/// bundle path.
///
/// The template is rendered into the bundle's parent; the template itself
/// names the bundle directory after `formal_name`.
pub fn create_app<L, P>(
    cmd: &BaseCommand<L>,
    platform: &P,
    app_name: &str,
    base: &Path,
) -> Result<PathBuf, CommandError>
where
    L: Launcher,
    P: PlatformCommand + ?Sized,
{
    let app = cmd.app(app_name)?;
    let bundle = platform.bundle_path(app, base);
    if bundle.exists() {
        return Err(CommandError::BundleExists {
            app: app.name.clone(),
            path: bundle,
        });
    }

    let template = cmd.template_for(app)?;
    let output_dir = bundle
        .parent()
        .map_or_else(|| base.to_path_buf(), Path::to_path_buf);
    fs::create_dir_all(&output_dir).map_err(|source| CommandError::Io {
        path: output_dir.clone(),
        source,
    })?;
    let (template, checkout) = locate_template(cmd, &template)?;

    cmd.log().info(&format!(
        "Generating a {} {} bundle for {}...",
        platform.platform(),
        platform.output_format(),
        app.formal_name
    ));

    let mut request = TemplateRequest::new(template, output_dir)
        .context("app_name", &app.name)
        .context("formal_name", &app.formal_name)
        .context("bundle", &app.bundle)
        .context("description", &app.description)
        .context("platform", platform.platform())
        .context("output_format", platform.output_format());
    if let Some(version) = cmd.app_version(app) {
        request = request.context("version", version);
    }
    if let Some(reference) = checkout {
        request = request.checkout(reference);
    }
    cmd.template_engine().generate(&request)?;

    debug!(target: "skiff.command", app = %app.name, bundle = %bundle.display(), "created");
    Ok(bundle)
}

/// [`create_app`] for every app, in name order.
pub fn create_all<L, P>(
    cmd: &BaseCommand<L>,
    platform: &P,
    base: &Path,
) -> Result<Vec<PathBuf>, CommandError>
where
    L: Launcher,
    P: PlatformCommand + ?Sized,
{
    if cmd.apps().is_empty() {
        return Err(CommandError::NoApps);
    }
    cmd.apps()
        .keys()
        .map(|name| create_app(cmd, platform, name, base))
        .collect()
}

/// Decide what to hand the template engine.
///
/// Without a cache, or for a local template, the template goes through as-is
/// with the branch as checkout. A remote template with a cache configured is
/// cloned (or fetched) into the cache and the branch is checked out there.
fn locate_template<L: Launcher>(
    cmd: &BaseCommand<L>,
    template: &str,
) -> Result<(String, Option<String>), CommandError> {
    let branch = cmd.template_branch();
    let cache = match cmd.template_cache() {
        Some(cache) if is_remote(template) => cache,
        _ => return Ok((template.to_string(), Some(branch))),
    };

    let dest = cache.join(repo_name(template));
    let git = cmd.git();
    cmd.log()
        .deep_debug(&format!("Template cache for {template}: {}", dest.display()));
    if dest.is_dir() {
        if let Err(err) = git.fetch(&dest) {
            cmd.log().warning(&format!(
                "Unable to update template {template} ({err}); using the cached copy."
            ));
        }
    } else {
        fs::create_dir_all(&cache).map_err(|source| CommandError::Io {
            path: cache.clone(),
            source,
        })?;
        git.clone_repo(template, &dest)?;
    }
    git.checkout(&dest, &format!("origin/{branch}"))?;

    Ok((dest.display().to_string(), None))
}

fn is_remote(template: &str) -> bool {
    template.contains("://") || template.starts_with("git@")
}

fn repo_name(url: &str) -> &str {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);
    match name {
        "" | "." | ".." => "template",
        name => name,
    }
}
