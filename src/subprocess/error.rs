use std::time::Duration;

/// Failures of the process-execution stage.
///
/// A non-zero exit code is not represented here: it is ordinary data on
/// [`super::ProcessOutput`] for the caller to interpret. These variants
/// cover the cases where no exit code exists at all.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The executable could not be spawned (not found, permission denied).
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process launched but could not be awaited or drained.
    #[error("failed while waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A stdio pipe was unexpectedly unavailable after spawn.
    #[error("failed to capture {stream} of '{command}'")]
    StreamCapture {
        stream: &'static str,
        command: String,
    },

    /// The optional per-command timeout elapsed before termination.
    #[error("process timed out after {0:?}")]
    Timeout(Duration),

    #[error("mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}
