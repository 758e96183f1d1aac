// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz environment merging and command preparation.
//!
//! Checks that every overlay value wins, that no ambient key is lost and
//! that tracing an arbitrary command never panics.
#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skiff_console::{Log, Verbosity};
use skiff_process::{Environment, LaunchOptions, RecordingLauncher, Subprocess};

#[derive(Debug, Arbitrary)]
struct Input {
    ambient: Vec<(String, String)>,
    overlay: Vec<(String, String)>,
    argv: Vec<String>,
    deep: bool,
}

fuzz_target!(|input: Input| {
    let ambient: Environment = input.ambient.iter().cloned().collect();
    let overlay: Environment = input.overlay.iter().cloned().collect();
    let verbosity = if input.deep {
        Verbosity::DeepDebug
    } else {
        Verbosity::Debug
    };

    let (log, _out) = Log::capture(verbosity);
    let sub = Subprocess::with_launcher(log, RecordingLauncher::new())
        .with_ambient_env(ambient.clone());
    let options = if input.overlay.is_empty() {
        LaunchOptions::new()
    } else {
        LaunchOptions::new().envs(overlay.iter().map(|(k, v)| (k.to_owned(), v.to_owned())))
    };
    sub.run(input.argv.iter().map(String::as_str), options)
        .expect("recording launcher succeeds");
    let (_, call) = sub.launcher().last_call().expect("call recorded");

    if input.overlay.is_empty() {
        assert!(call.env.is_none());
        return;
    }
    let env = call.env.expect("overlay present");
    for (key, value) in overlay.iter() {
        assert_eq!(env.get(key), Some(value));
    }
    for (key, _) in ambient.iter() {
        assert!(env.get(key).is_some());
    }
});
