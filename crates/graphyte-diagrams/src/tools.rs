//! Bounded execution of external converter processes.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::consts::POLL_INTERVAL;

/// Failure running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The executable could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The process outlived its time budget and was killed.
    #[error("{program} did not finish within {}s and was killed", .timeout.as_secs())]
    Timeout {
        /// Program name.
        program: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },
    /// The process exited unsuccessfully.
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        /// Program name.
        program: String,
        /// Exit status.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// Waiting on the process failed.
    #[error("Failed to wait for {program}: {source}")]
    Wait {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Captured output of a successful run.
#[derive(Debug, Default)]
pub struct ToolOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

/// Run `command` to completion, killing it once `timeout` elapses.
///
/// Output pipes are drained on helper threads so a chatty child can't
/// block on a full pipe while being polled.
///
/// # Errors
///
/// Every failure mode maps to its own [`ToolError`] variant.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<ToolOutput, ToolError> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(program = %program, args = ?command.get_args().collect::<Vec<_>>(), "Running external tool");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!(program = %program, "External tool timed out, killing it");
                if let Err(e) = child.kill() {
                    warn!(program = %program, error = %e, "Failed to kill external tool");
                }
                // Reap the child so it doesn't linger as a zombie.
                child.wait().ok();
                return Err(ToolError::Timeout { program, timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => return Err(ToolError::Wait { program, source }),
        }
    };

    let output = ToolOutput {
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    };

    if status.success() {
        Ok(output)
    } else {
        Err(ToolError::Failed {
            program,
            status,
            stderr: output.stderr.trim().to_owned(),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).ok();
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_successful_run_captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo hello"]);
        let out = run_with_timeout(&mut cmd, Duration::from_secs(10)).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_reports_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);
        let err = run_with_timeout(&mut cmd, Duration::from_secs(10)).unwrap_err();
        match err {
            ToolError::Failed { stderr, status, .. } => {
                assert_eq!(stderr, "broken");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_timeout_kills_process() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);
        let started = Instant::now();
        let err = run_with_timeout(&mut cmd, Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut cmd = Command::new("graphyte-no-such-program");
        let err = run_with_timeout(&mut cmd, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
