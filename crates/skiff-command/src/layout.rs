// SPDX-License-Identifier: MIT OR Apache-2.0
//! Where bundles and binaries live on disk.

use skiff_config::AppConfig;
use std::path::{Path, PathBuf};

/// Path conventions for one platform and output format.
pub trait PlatformCommand {
    /// Target platform.
    fn platform(&self) -> &str;

    /// Target output format.
    fn output_format(&self) -> &str;

    /// The template-generated source form of `app`, under `base`.
    fn bundle_path(&self, app: &AppConfig, base: &Path) -> PathBuf;

    /// The executable artefact for `app`. May equal the bundle path.
    fn binary_path(&self, app: &AppConfig, base: &Path) -> PathBuf;
}

/// The generic layout: bundles in
/// `<base>/<platform>/<output_format>/<formal_name>`, binaries named after
/// the app inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDir {
    platform: String,
    output_format: String,
}

impl AppDir {
    /// Layout for `platform`/`output_format`.
    pub fn new(platform: impl Into<String>, output_format: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            output_format: output_format.into(),
        }
    }
}

impl PlatformCommand for AppDir {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn output_format(&self) -> &str {
        &self.output_format
    }

    fn bundle_path(&self, app: &AppConfig, base: &Path) -> PathBuf {
        base.join(&self.platform)
            .join(&self.output_format)
            .join(&app.formal_name)
    }

    fn binary_path(&self, app: &AppConfig, base: &Path) -> PathBuf {
        self.bundle_path(app, base).join(&app.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppConfig {
        AppConfig {
            name: "helloworld".into(),
            formal_name: "Hello World".into(),
            bundle: "com.example".into(),
            description: "A greeting".into(),
            version: None,
            template: None,
            sources: vec![],
        }
    }

    #[test]
    fn bundle_nests_platform_and_format() {
        let layout = AppDir::new("linux", "appimage");
        assert_eq!(
            layout.bundle_path(&app(), Path::new("/proj")),
            Path::new("/proj/linux/appimage/Hello World")
        );
    }

    #[test]
    fn binary_lives_inside_the_bundle() {
        let layout = AppDir::new("windows", "msi");
        assert_eq!(
            layout.binary_path(&app(), Path::new("base")),
            Path::new("base/windows/msi/Hello World/helloworld")
        );
        assert_eq!(layout.platform(), "windows");
        assert_eq!(layout.output_format(), "msi");
    }
}
