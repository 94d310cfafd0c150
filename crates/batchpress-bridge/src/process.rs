// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Timed execution of external helper programs.
//
// The child is polled until it exits or the deadline passes; on expiry it is
// killed and reaped so no helper outlives its unit.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use batchpress_core::error::{UnitError, UnitOutcome};
use tracing::{debug, instrument, warn};

use crate::traits::{HelperCommand, ProcessOutput, ProcessRunner};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// [`ProcessRunner`] backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip(self), fields(program = %command.program_name()))]
    fn run(&self, command: &HelperCommand, timeout: Duration) -> UnitOutcome<ProcessOutput> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(command, &e))?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let deadline = Instant::now() + timeout;

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    warn!(timeout_ms = timeout.as_millis() as u64, "helper exceeded deadline, killing");
                    // The child may exit between try_wait and kill.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(UnitError::TimedOut {
                        seconds: timeout.as_secs(),
                        detail: command.to_string(),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(UnitError::TransientDevice(format!(
                        "{}: wait failed: {e}",
                        command.program_name()
                    )));
                }
            }
        };

        let output = ProcessOutput {
            code: status.code(),
            stdout: stdout.map(collect).unwrap_or_default(),
            stderr: stderr.map(collect).unwrap_or_default(),
        };
        debug!(code = ?output.code, "helper finished");
        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

fn spawn_error(command: &HelperCommand, err: &std::io::Error) -> UnitError {
    match err.kind() {
        std::io::ErrorKind::NotFound => {
            UnitError::FatalDevice(format!("{} is not installed", command.program_name()))
        }
        std::io::ErrorKind::PermissionDenied => UnitError::FatalDevice(format!(
            "{} cannot be executed: {err}",
            command.program_name()
        )),
        _ => UnitError::TransientDevice(format!(
            "{} could not be started: {err}",
            command.program_name()
        )),
    }
}

/// Map a failed helper run onto the error taxonomy using its stderr.
///
/// Unrecognised failures are treated as transient so they get retried.
pub fn classify_exit(command: &HelperCommand, output: &ProcessOutput) -> UnitError {
    let text = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    let lower = text.to_ascii_lowercase();
    let detail = if text.is_empty() {
        format!("{} exited with {:?}", command.program_name(), output.code)
    } else {
        format!("{}: {text}", command.program_name())
    };

    if lower.contains("does not exist")
        || lower.contains("unknown printer")
        || lower.contains("no such printer")
        || lower.contains("no default destination")
        || lower.contains("not accepting jobs")
    {
        UnitError::FatalDevice(detail)
    } else if lower.contains("password") || lower.contains("encrypted") {
        UnitError::Encrypted(detail)
    } else if lower.contains("unsupported document-format") || lower.contains("unsupported format") {
        UnitError::UnsupportedSubformat(detail)
    } else if lower.contains("corrupt") || lower.contains("damaged") {
        UnitError::Corrupt(detail)
    } else {
        UnitError::TransientDevice(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchpress_core::UnitErrorKind;

    fn failed(stderr: &str) -> ProcessOutput {
        ProcessOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn missing_printer_is_fatal() {
        let cmd = HelperCommand::new("lp");
        let err = classify_exit(&cmd, &failed("lp: The printer or class does not exist."));
        assert_eq!(err.kind(), UnitErrorKind::FatalDevice);
    }

    #[test]
    fn busy_spooler_is_transient() {
        let cmd = HelperCommand::new("lp");
        let err = classify_exit(&cmd, &failed("lp: printer is busy"));
        assert_eq!(err.kind(), UnitErrorKind::TransientDevice);
        let silent = classify_exit(&cmd, &failed(""));
        assert!(silent.to_string().contains("exited with"));
    }

    #[test]
    fn missing_program_is_fatal() {
        let cmd = HelperCommand::new("/nonexistent/batchpress-helper");
        let err = SystemProcessRunner
            .run(&cmd, Duration::from_secs(1))
            .expect_err("spawn should fail");
        assert_eq!(err.kind(), UnitErrorKind::FatalDevice);
        assert!(err.to_string().contains("not installed"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_exit_code_and_stderr() {
        let cmd = HelperCommand::new("sh").args(["-c", "echo busy >&2; exit 3"]);
        let out = SystemProcessRunner
            .run(&cmd, Duration::from_secs(5))
            .expect("run");
        assert_eq!(out.code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stderr.trim(), "busy");
    }

    #[cfg(unix)]
    #[test]
    fn kills_on_deadline() {
        let cmd = HelperCommand::new("sleep").arg("10");
        let started = Instant::now();
        let err = SystemProcessRunner
            .run(&cmd, Duration::from_millis(200))
            .expect_err("should time out");
        assert_eq!(err.kind(), UnitErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
