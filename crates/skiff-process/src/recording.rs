// SPDX-License-Identifier: MIT OR Apache-2.0
//! A launcher that records calls instead of starting processes.

use crate::error::LaunchError;
use crate::launcher::{Completed, Launcher, Output};
use crate::options::{Invocation, LaunchMode};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Handle returned by [`RecordingLauncher::spawn`]: the index of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordedHandle(pub usize);

/// Records every invocation and answers with scripted results.
///
/// Without scripting, `run` reports exit code 0 and `check_output` returns
/// empty output in the requested mode.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    calls: RefCell<Vec<(LaunchMode, Invocation)>>,
    outputs: RefCell<VecDeque<Output>>,
    exit_codes: RefCell<VecDeque<Option<i32>>>,
    failure: RefCell<Option<LaunchError>>,
}

impl RecordingLauncher {
    /// A launcher with no scripted results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue stdout for the next `check_output` call.
    pub fn push_output(&self, output: Output) {
        self.outputs.borrow_mut().push_back(output);
    }

    /// Queue an exit code for the next `run` call.
    pub fn push_exit_code(&self, code: Option<i32>) {
        self.exit_codes.borrow_mut().push_back(code);
    }

    /// Make the next call of any mode fail with `err`.
    pub fn fail_next(&self, err: LaunchError) {
        *self.failure.borrow_mut() = Some(err);
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<(LaunchMode, Invocation)> {
        self.calls.borrow().clone()
    }

    /// The most recent call.
    pub fn last_call(&self) -> Option<(LaunchMode, Invocation)> {
        self.calls.borrow().last().cloned()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, mode: LaunchMode, call: &Invocation) -> Result<usize, LaunchError> {
        let mut calls = self.calls.borrow_mut();
        calls.push((mode, call.clone()));
        if let Some(err) = self.failure.borrow_mut().take() {
            return Err(err);
        }
        Ok(calls.len() - 1)
    }
}

impl Launcher for RecordingLauncher {
    type Handle = RecordedHandle;

    fn spawn(&self, call: &Invocation) -> Result<RecordedHandle, LaunchError> {
        self.record(LaunchMode::Spawn, call).map(RecordedHandle)
    }

    fn run(&self, call: &Invocation) -> Result<Completed, LaunchError> {
        self.record(LaunchMode::Run, call)?;
        let code = self.exit_codes.borrow_mut().pop_front().unwrap_or(Some(0));
        let captured = || call.capture_output.then(|| Output::from_bytes(Vec::new(), call.text_mode()));
        Ok(Completed {
            args: call
                .argv
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            code,
            stdout: captured(),
            stderr: captured(),
        })
    }

    fn check_output(&self, call: &Invocation) -> Result<Output, LaunchError> {
        self.record(LaunchMode::CheckOutput, call)?;
        Ok(self
            .outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Output::from_bytes(Vec::new(), call.text_mode())))
    }
}
