use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::ProcessError;

/// A fully resolved invocation: program, arguments, environment and working
/// directory. The environment is taken as-is; callers merge their base
/// snapshot and manager deltas before building the command.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    /// Extension point; `None` in the core contract. Callers wanting a
    /// bound wrap the invocation in their own cancellable context.
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    /// One-line rendering for logs and error messages.
    pub(crate) fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of a terminated process.
///
/// Both streams are drained to the end before the result is assembled, so
/// the fields hold the complete per-stream output in production order. No
/// ordering relation between the two streams is preserved or implied.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawn the command and block the calling flow until it terminates,
    /// returning the captured output. A non-zero exit code is a normal
    /// result, not an `Err`.
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

/// Production runner backed by `tokio::process`.
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        // The caller supplies the complete environment; inheriting on top
        // of it would leak ambient manager state into the child.
        cmd.env_clear();
        cmd.envs(&command.env);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    async fn drain<R>(mut reader: R) -> std::io::Result<Vec<u8>>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        Ok(buffer)
    }

    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            ExitStatus::Signal(signal)
        } else {
            ExitStatus::Error(1)
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    fn log_command_start(command: &ProcessCommand) {
        tracing::debug!("Spawning subprocess: {}", command.display());
        if !command.env.is_empty() {
            tracing::trace!("Environment variables: {} entries", command.env.len());
        }
        if let Some(dir) = &command.working_dir {
            tracing::trace!("Working directory: {}", dir.display());
        }
    }

    fn log_result(result: &ProcessOutput, command: &ProcessCommand) {
        match &result.status {
            ExitStatus::Success => {
                tracing::debug!(
                    "Subprocess completed successfully in {:?}: {}",
                    result.duration,
                    command.display()
                );
            }
            ExitStatus::Error(code) => {
                tracing::debug!(
                    "Subprocess exited with code {} in {:?}: {}",
                    code,
                    result.duration,
                    command.display()
                );
                if !result.stderr.is_empty() {
                    tracing::trace!("Stderr: {}", result.stderr);
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!(
                    "Subprocess terminated by signal {} in {:?}: {}",
                    signal,
                    result.duration,
                    command.display()
                );
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        Self::log_command_start(&command);

        let mut cmd = Self::configure_command(&command);
        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            command: command.display(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProcessError::StreamCapture {
                stream: "stdout",
                command: command.display(),
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProcessError::StreamCapture {
                stream: "stderr",
                command: command.display(),
            })?;

        // Two independent drains run concurrently with the wait, so a child
        // filling one pipe can never deadlock against the other's drain.
        let collect = async {
            tokio::join!(
                Self::drain(stdout),
                Self::drain(stderr),
                child.wait()
            )
        };

        let drained = match command.timeout {
            Some(limit) => tokio::time::timeout(limit, collect).await.ok(),
            None => Some(collect.await),
        };

        let Some((stdout_result, stderr_result, wait_result)) = drained else {
            let limit = command.timeout.unwrap_or_default();
            tracing::warn!(
                "Subprocess timed out after {:?}: {}",
                limit,
                command.display()
            );
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(ProcessError::Timeout(limit));
        };

        let wrap_wait = |source: std::io::Error| ProcessError::Wait {
            command: command.display(),
            source,
        };
        let stdout_bytes = stdout_result.map_err(wrap_wait)?;
        let stderr_bytes = stderr_result.map_err(wrap_wait)?;
        let status = Self::parse_exit_status(wait_result.map_err(wrap_wait)?);

        let result = ProcessOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            duration: start.elapsed(),
        };
        Self::log_result(&result, &command);
        Ok(result)
    }
}
