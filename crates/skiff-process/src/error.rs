// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by process launchers.

use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`Launcher`](crate::Launcher).
///
/// The runner never creates these itself; whatever the launcher returns
/// reaches the caller untouched.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The argv was empty.
    #[error("no command given")]
    EmptyCommand,

    /// The OS refused to start the program.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that was requested.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting for or reading from the child failed.
    #[error("failed to wait for {command}: {source}")]
    Wait {
        /// Command line of the child.
        command: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A checked command exited unsuccessfully.
    #[error("command `{command}` exited with {}", describe_code(.code))]
    NonZeroExit {
        /// Command line of the child.
        command: String,
        /// Exit code; `None` when killed by a signal.
        code: Option<i32>,
        /// Captured stdout, if any.
        stdout: Option<Vec<u8>>,
        /// Captured stderr, if any.
        stderr: Option<Vec<u8>>,
    },

    /// The child outlived its timeout and was killed.
    #[error("command `{command}` timed out after {timeout:?}")]
    TimedOut {
        /// Command line of the child.
        command: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The launcher does not accept this combination of options.
    #[error("invalid launch options: {0}")]
    InvalidOptions(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl LaunchError {
    /// True when the program could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LaunchError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Exit code of a failed checked command.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_display() {
        let err = LaunchError::NonZeroExit {
            command: "false".into(),
            code: Some(1),
            stdout: None,
            stderr: None,
        };
        assert_eq!(err.to_string(), "command `false` exited with status 1");
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn signal_exit_display() {
        let err = LaunchError::NonZeroExit {
            command: "sleep 10".into(),
            code: None,
            stdout: None,
            stderr: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn not_found_detection() {
        let err = LaunchError::Spawn {
            program: "nope".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_not_found());
        assert!(!LaunchError::EmptyCommand.is_not_found());
    }
}
