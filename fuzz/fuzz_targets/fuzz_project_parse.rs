// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz `skiff.toml` resolution.
//!
//! Arbitrary text is resolved for a fixed platform and output format:
//! resolution never panics, and every resolved app carries its table key as
//! its name.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    match skiff_config::parse_project(s, "linux", "appimage") {
        Ok(project) => {
            for (key, app) in &project.apps {
                assert_eq!(key, &app.name);
                let _ = app.app_id();
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }
});
