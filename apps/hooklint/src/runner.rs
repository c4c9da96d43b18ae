//! Time-bounded subprocess execution.
//!
//! Stdout and stderr are drained on helper threads while the parent polls
//! `try_wait`, so a chatty child cannot fill a pipe and stall. On deadline
//! the child is killed and reaped before `Timeout` is returned.

use crate::error::{HookError, Result};
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// `10s` for whole seconds, `250ms` otherwise.
pub fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_millis() == 0 && timeout.as_secs() > 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

/// Run `cmd`, optionally feeding `stdin`, and wait at most `timeout`.
///
/// The deadline covers both the exit of the child and the close of its
/// output pipes, so a background process that inherits them cannot stall
/// the caller.
pub fn run_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<ProcessOutput> {
    let program = cmd.get_program().to_string_lossy().to_string();
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|source| HookError::Spawn {
        program: program.clone(),
        source,
    })?;
    tracing::debug!(program = %program, pid = child.id(), "spawned subprocess");

    if let (Some(mut pipe), Some(bytes)) = (child.stdin.take(), stdin) {
        let bytes = bytes.to_vec();
        // A child that never reads stdin closes the pipe early; that is not an error here.
        thread::spawn(move || {
            let _ = pipe.write_all(&bytes);
        });
    }
    let (tx, rx) = mpsc::channel();
    let mut pending = 0;
    if let Some(out) = child.stdout.take() {
        drain(out, Stream::Stdout, tx.clone());
        pending += 1;
    }
    if let Some(err) = child.stderr.take() {
        drain(err, Stream::Stderr, tx.clone());
        pending += 1;
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let timed_out = |child: &mut Child| {
        let _ = child.kill();
        let _ = child.wait();
        tracing::warn!(program = %program, timeout = %format_timeout(&timeout), "subprocess killed on timeout");
        HookError::Timeout {
            program: program.clone(),
            timeout,
        }
    };

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    return Err(timed_out(&mut child));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(HookError::Spawn {
                    program: program.clone(),
                    source,
                });
            }
        }
    };

    let Some((stdout, stderr)) = collect_output(&rx, pending, deadline) else {
        tracing::warn!(program = %program, "output pipes still open at deadline");
        return Err(timed_out(&mut child));
    };
    Ok(ProcessOutput {
        code: status.code(),
        stdout,
        stderr,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: mpsc::Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send((stream, buf));
    });
}

/// Wait for `pending` drained streams, giving up at `deadline`.
fn collect_output(
    rx: &Receiver<(Stream, Vec<u8>)>,
    pending: usize,
    deadline: Instant,
) -> Option<(String, String)> {
    let mut stdout = String::new();
    let mut stderr = String::new();
    for _ in 0..pending {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok((stream, bytes)) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                match stream {
                    Stream::Stdout => stdout = text,
                    Stream::Stderr => stderr = text,
                }
            }
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Some((stdout, stderr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn test_captures_exit_code_and_streams() {
        let out = run_with_timeout(
            sh("read line; echo \"got:$line\"; echo oops >&2; exit 2"),
            Some(b"hello\n"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.code, Some(2));
        assert_eq!(out.stdout.trim(), "got:hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn test_ignores_unread_stdin() {
        let out = run_with_timeout(sh("exit 0"), Some(b"{}"), Duration::from_secs(5)).unwrap();
        assert_eq!(out.code, Some(0));
    }

    #[test]
    fn test_kills_on_timeout() {
        let started = Instant::now();
        let err = run_with_timeout(sh("sleep 5"), None, Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, HookError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_background_child_holding_pipes_times_out() {
        let started = Instant::now();
        let err = run_with_timeout(
            sh("sleep 8 & exit 0"),
            Some(b"{}"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, HookError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_format_timeout_keeps_sub_second_precision() {
        assert_eq!(format_timeout(&Duration::from_secs(10)), "10s");
        assert_eq!(format_timeout(&Duration::from_millis(300)), "300ms");
        assert_eq!(format_timeout(&Duration::from_millis(1500)), "1500ms");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let cmd = Command::new("definitely-not-a-real-binary-hooklint");
        let err = run_with_timeout(cmd, None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HookError::Spawn { .. }));
    }
}
